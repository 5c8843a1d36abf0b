//! Validated request targets.
//!
//! # Responsibilities
//! - Reject targets that are empty or do not start with `/`
//! - Split the path component from the query string
//! - Drop any fragment
//! - Rebuild a target from a new path while keeping the incoming query

use std::fmt;

/// Errors raised when a request target cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("request path is empty")]
    Empty,
    #[error("request path must start with '/': {0:?}")]
    MissingLeadingSlash(String),
}

/// A request path known to start with `/`, with its optional query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    path: String,
    query: Option<String>,
}

impl RequestPath {
    /// Parse a request target such as `/docs`, `/app.js?v=2` or `/a#top`.
    pub fn parse(target: &str) -> Result<Self, PathError> {
        if target.is_empty() {
            return Err(PathError::Empty);
        }
        if !target.starts_with('/') {
            return Err(PathError::MissingLeadingSlash(target.to_string()));
        }

        let without_fragment = match target.split_once('#') {
            Some((head, _)) => head,
            None => target,
        };

        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (without_fragment, None),
        };

        Ok(Self {
            path: path.to_string(),
            query,
        })
    }

    /// The path component, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string without the leading `?`, if one was present.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn ends_with_slash(&self) -> bool {
        self.path.ends_with('/')
    }

    /// The last `/`-delimited segment. Empty for paths ending in `/`.
    pub fn last_segment(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// `path` followed by this target's query, if any.
    pub fn target_with(&self, path: &str) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        }
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target_with(&self.path))
    }
}
