//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use edge_normalizer::config::EdgeConfig;
use edge_normalizer::http::HttpServer;
use edge_normalizer::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Read the request head and return (method, target, headers).
async fn read_request_head(socket: &mut TcpStream) -> Option<(String, String, Vec<(String, String)>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head_end = buf.windows(4).position(|w| w == b"\r\n\r\n")? + 4;
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect::<Vec<(String, String)>>();

    // Drain the body so closing the socket does not reset the connection.
    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut received = buf.len() - head_end;
    while received < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        received += n;
    }

    Some((method, target, headers))
}

async fn write_response(socket: &mut TcpStream, status_line: &str, extra_headers: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status_line,
        body.len(),
        extra_headers,
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Start a mock origin that answers `200` with body `"<METHOD> <target>"`.
///
/// The origin echoes `x-forwarded-for`, `x-request-id` and `host` back as
/// `x-echo-*` response headers.
pub async fn start_echo_origin(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let Some((method, target, headers)) = read_request_head(&mut socket).await else {
                            return;
                        };
                        let echoed: String = headers
                            .iter()
                            .filter(|(k, _)| matches!(k.as_str(), "x-forwarded-for" | "x-request-id" | "host"))
                            .map(|(k, v)| format!("x-echo-{}: {}\r\n", k, v))
                            .collect();
                        let body = format!("{} {}", method, target);
                        write_response(&mut socket, "200 OK", &echoed, &body).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a programmable mock origin with async support.
#[allow(dead_code)]
pub async fn start_programmable_origin<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        if read_request_head(&mut socket).await.is_none() {
                            return;
                        }
                        let (status, body) = f().await;
                        let status_line = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        write_response(&mut socket, status_line, "", &body).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Config for an edge on `edge_addr` in front of `origin_addr`, retries off.
pub fn edge_config(edge_addr: SocketAddr, origin_addr: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = edge_addr.to_string();
    config.origin.address = origin_addr.to_string();
    config.retries.enabled = false;
    config
}

/// Start an edge server; returns its shutdown handle and config update sender.
pub async fn start_edge(config: EdgeConfig) -> (Shutdown, mpsc::UnboundedSender<EdgeConfig>) {
    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (shutdown, updates_tx)
}

/// HTTP client that never follows redirects or reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
