//! Redirect and rewrite rules.
//!
//! # Responsibilities
//! - Classify a path as file-like or directory-like
//! - Redirect directory-like paths missing their trailing slash
//! - Map directory paths to their index document
//! - Leave everything else alone
//!
//! # Design Decisions
//! - Rules run in a fixed order and the first match returns
//! - The redirect status is always 301; it is not an option
//! - `DotScope::Anywhere` is the default so `/v1.2/about` keeps passing
//!   through unchanged; `DotScope::LastSegment` is the stricter opt-in

use serde::{Deserialize, Serialize};

use crate::normalizer::decision::Decision;
use crate::normalizer::path::RequestPath;

/// Where the file-extension check looks for a `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DotScope {
    /// A dot anywhere in the path makes it file-like.
    #[default]
    Anywhere,
    /// Only a dot in the final segment makes it file-like.
    LastSegment,
}

/// Tunables for [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Scope of the file-extension check.
    pub dot_scope: DotScope,

    /// Document appended to paths ending in `/`.
    pub index_document: String,

    /// Carry the query string over to the redirect location.
    pub preserve_query_on_redirect: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            dot_scope: DotScope::Anywhere,
            index_document: "index.html".to_string(),
            preserve_query_on_redirect: false,
        }
    }
}

/// Maps request paths to edge decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    options: NormalizerOptions,
}

impl Normalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Whether `path` is treated as a file rather than a directory.
    pub fn is_file_like(&self, path: &RequestPath) -> bool {
        match self.options.dot_scope {
            DotScope::Anywhere => path.path().contains('.'),
            DotScope::LastSegment => path.last_segment().contains('.'),
        }
    }

    /// Decide what to do with `path`.
    pub fn decide(&self, path: &RequestPath) -> Decision {
        let file_like = self.is_file_like(path);
        let trailing_slash = path.ends_with_slash();

        if !file_like && !trailing_slash {
            let canonical = format!("{}/", path.path());
            let location = if self.options.preserve_query_on_redirect {
                path.target_with(&canonical)
            } else {
                canonical
            };
            return Decision::Redirect { location };
        }

        if trailing_slash {
            return Decision::Rewrite {
                path: format!("{}{}", path.path(), self.options.index_document),
            };
        }

        Decision::PassThrough
    }
}
