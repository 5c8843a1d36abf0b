use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use edge_normalizer::config::load_config;
use edge_normalizer::edge::{self, EdgeRequest};
use edge_normalizer::normalizer::{DotScope, Normalizer, NormalizerOptions, RequestPath};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Inspect edge normalizer decisions", long_about = None)]
struct Cli {
    /// Read normalizer options from this config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decision for a request path
    Decide {
        /// Request path, optionally with a query string
        path: String,

        #[arg(long, value_enum)]
        dot_scope: Option<DotScopeArg>,

        #[arg(long)]
        index_document: Option<String>,

        #[arg(long)]
        preserve_query: bool,
    },
    /// Run an edge request event (JSON) through the normalizer
    Event {
        /// Event file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Load and validate a config file
    CheckConfig {
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DotScopeArg {
    Anywhere,
    LastSegment,
}

impl From<DotScopeArg> for DotScope {
    fn from(arg: DotScopeArg) -> Self {
        match arg {
            DotScopeArg::Anywhere => DotScope::Anywhere,
            DotScopeArg::LastSegment => DotScope::LastSegment,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => load_config(path)?.normalizer,
        None => NormalizerOptions::default(),
    };

    let output = match cli.command {
        Commands::Decide {
            path,
            dot_scope,
            index_document,
            preserve_query,
        } => {
            if let Some(scope) = dot_scope {
                options.dot_scope = scope.into();
            }
            if let Some(index) = index_document {
                options.index_document = index;
            }
            options.preserve_query_on_redirect |= preserve_query;
            decide(&path, options)?
        }
        Commands::Event { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            event(&raw, options)?
        }
        Commands::CheckConfig { path } => check_config(&path)?,
    };

    println!("{}", output);
    Ok(())
}

/// Decision for one request path, as pretty JSON.
fn decide(path: &str, options: NormalizerOptions) -> CliResult<String> {
    let request_path = RequestPath::parse(path)?;
    let decision = Normalizer::new(options).decide(&request_path);
    Ok(serde_json::to_string_pretty(&decision)?)
}

/// Edge output for one JSON request event, as pretty JSON.
fn event(raw: &str, options: NormalizerOptions) -> CliResult<String> {
    let request: EdgeRequest = serde_json::from_str(raw)?;
    let output = edge::handle(request, &Normalizer::new(options))?;
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Validated config rendered back as TOML.
fn check_config(path: &Path) -> CliResult<String> {
    let config = load_config(path)?;
    Ok(format!("{}: ok\n{}", path.display(), toml::to_string_pretty(&config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_normalizer::normalizer::PathError;
    use serde_json::{json, Value};

    fn parsed(output: &str) -> Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_decide_prints_tagged_decision() {
        let output = decide("/docs?lang=en", NormalizerOptions::default()).unwrap();
        assert_eq!(parsed(&output), json!({ "action": "redirect", "location": "/docs/" }));

        let output = decide("/app.js", NormalizerOptions::default()).unwrap();
        assert_eq!(parsed(&output), json!({ "action": "pass_through" }));
    }

    #[test]
    fn test_decide_honors_options() {
        let options = NormalizerOptions {
            dot_scope: DotScope::LastSegment,
            index_document: "default.htm".into(),
            ..NormalizerOptions::default()
        };
        let output = decide("/v1.2/", options).unwrap();
        assert_eq!(parsed(&output), json!({ "action": "rewrite", "path": "/v1.2/default.htm" }));
    }

    #[test]
    fn test_decide_rejects_relative_path() {
        let err = decide("docs", NormalizerOptions::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PathError>(),
            Some(&PathError::MissingLeadingSlash("docs".into()))
        );
    }

    #[test]
    fn test_event_rewrites_request() {
        let output = event(r#"{"path":"/docs/"}"#, NormalizerOptions::default()).unwrap();
        let value = parsed(&output);
        assert_eq!(value["kind"], "request");
        assert_eq!(value["path"], "/docs/index.html");
    }

    #[test]
    fn test_event_rejects_malformed_path() {
        let err = event(r#"{"path":"docs"}"#, NormalizerOptions::default()).unwrap_err();
        assert!(err.downcast_ref::<PathError>().is_some());

        assert!(event("not json", NormalizerOptions::default()).is_err());
    }

    #[test]
    fn test_check_config_missing_file() {
        assert!(check_config(Path::new("/nonexistent/edge.toml")).is_err());
    }

    #[test]
    fn test_check_config_example() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("edge.example.toml");
        let output = check_config(&path).unwrap();
        assert!(output.contains(": ok"));
        assert!(output.contains("index_document = \"index.html\""));
    }
}
