//! Edge event shapes and the single-request handler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalizer::decision::{REDIRECT_STATUS, REDIRECT_STATUS_TEXT};
use crate::normalizer::{Decision, Normalizer, PathError, RequestPath};

/// Request as handed over by the edge runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EdgeRequest {
    pub path: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl EdgeRequest {
    /// A GET request for `path` with no headers or query.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }
}

/// Response returned to the client without reaching the origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status_code: u16,
    pub status_description: String,
    pub headers: BTreeMap<String, String>,
}

impl EdgeResponse {
    /// 301 Moved Permanently to `location`.
    pub fn moved_permanently(location: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("location".to_string(), location.into());
        Self {
            status_code: REDIRECT_STATUS,
            status_description: REDIRECT_STATUS_TEXT.to_string(),
            headers,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").map(String::as_str)
    }
}

/// Result of one edge invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgeOutput {
    Response(EdgeResponse),
    Request(EdgeRequest),
}

/// Run the normalizer over one edge request.
///
/// The request is moved through and handed back on the forwarding branches,
/// with its path rewritten in place when the rewrite rule applies. Forwarded
/// paths never carry a fragment.
pub fn handle(mut request: EdgeRequest, normalizer: &Normalizer) -> Result<EdgeOutput, PathError> {
    let path = RequestPath::parse(&request.path)?;

    let output = match normalizer.decide(&path) {
        Decision::Redirect { location } => EdgeOutput::Response(EdgeResponse::moved_permanently(location)),
        Decision::Rewrite { path: rewritten } => {
            request.path = path.target_with(&rewritten);
            EdgeOutput::Request(request)
        }
        Decision::PassThrough => {
            request.path = path.to_string();
            EdgeOutput::Request(request)
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(path: &str) -> EdgeOutput {
        handle(EdgeRequest::get(path), &Normalizer::default()).unwrap()
    }

    #[test]
    fn test_redirect_response_shape() {
        let output = run("/docs");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "response",
                "statusCode": 301,
                "statusDescription": "Moved Permanently",
                "headers": { "location": "/docs/" }
            })
        );
    }

    #[test]
    fn test_fragment_dropped_on_both_forwarding_branches() {
        let EdgeOutput::Request(rewritten) = run("/docs/?page=2#intro") else {
            panic!("expected a forwarded request");
        };
        assert_eq!(rewritten.path, "/docs/index.html?page=2");

        let EdgeOutput::Request(passed) = run("/app.js?v=2#L10") else {
            panic!("expected a forwarded request");
        };
        assert_eq!(passed.path, "/app.js?v=2");

        let EdgeOutput::Request(plain) = run("/app.js") else {
            panic!("expected a forwarded request");
        };
        assert_eq!(plain.path, "/app.js");
    }

    #[test]
    fn test_rewrite_mutates_only_path() {
        let mut request = EdgeRequest::get("/docs/");
        request.headers.insert("accept".into(), "text/html".into());
        request.query.insert("page".into(), "2".into());

        let output = handle(request.clone(), &Normalizer::default()).unwrap();

        let mut expected = request;
        expected.path = "/docs/index.html".into();
        assert_eq!(output, EdgeOutput::Request(expected));
    }

    #[test]
    fn test_root_rewrites_to_index() {
        assert_eq!(run("/"), EdgeOutput::Request(EdgeRequest::get("/index.html")));
    }

    #[test]
    fn test_pass_through_returns_request_unchanged() {
        let mut request = EdgeRequest::get("/images/logo.png");
        request.method = "HEAD".into();
        let output = handle(request.clone(), &Normalizer::default()).unwrap();
        assert_eq!(output, EdgeOutput::Request(request));
    }

    #[test]
    fn test_query_inside_path_field() {
        assert_eq!(run("/app.js?v=2"), EdgeOutput::Request(EdgeRequest::get("/app.js?v=2")));
        assert_eq!(
            run("/docs/?page=2"),
            EdgeOutput::Request(EdgeRequest::get("/docs/index.html?page=2"))
        );
        match run("/docs?v=1.2") {
            EdgeOutput::Response(response) => assert_eq!(response.location(), Some("/docs/")),
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_path_is_rejected() {
        let normalizer = Normalizer::default();
        assert_eq!(handle(EdgeRequest::get(""), &normalizer), Err(PathError::Empty));
        assert!(matches!(
            handle(EdgeRequest::get("docs/"), &normalizer),
            Err(PathError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: EdgeRequest = serde_json::from_value(json!({ "path": "/blog/2024" })).unwrap();
        assert_eq!(request, EdgeRequest::get("/blog/2024"));

        let output: EdgeOutput = serde_json::from_value(json!({
            "kind": "request",
            "path": "/app.js",
            "method": "GET",
            "headers": {},
            "query": {}
        }))
        .unwrap();
        assert_eq!(output, EdgeOutput::Request(EdgeRequest::get("/app.js")));
    }
}
