//! Normalizer decisions.

use serde::Serialize;

/// Status code used for every canonicalizing redirect.
pub const REDIRECT_STATUS: u16 = 301;

/// Status text paired with [`REDIRECT_STATUS`].
pub const REDIRECT_STATUS_TEXT: &str = "Moved Permanently";

/// What the edge should do with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// Answer immediately with a 301 to `location`.
    Redirect { location: String },
    /// Forward the request with its path replaced by `path`.
    Rewrite { path: String },
    /// Forward the request untouched.
    PassThrough,
}

impl Decision {
    /// Stable label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Redirect { .. } => "redirect",
            Decision::Rewrite { .. } => "rewrite",
            Decision::PassThrough => "pass_through",
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Decision::Redirect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        let redirect = Decision::Redirect { location: "/docs/".into() };
        let rewrite = Decision::Rewrite { path: "/docs/index.html".into() };

        assert_eq!(redirect.outcome(), "redirect");
        assert_eq!(rewrite.outcome(), "rewrite");
        assert_eq!(Decision::PassThrough.outcome(), "pass_through");
        assert!(redirect.is_redirect());
        assert!(!rewrite.is_redirect());
    }

    #[test]
    fn test_serializes_with_action_tag() {
        let json = serde_json::to_value(Decision::Redirect { location: "/docs/".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "redirect", "location": "/docs/" }));

        let json = serde_json::to_value(Decision::PassThrough).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "pass_through" }));
    }
}
