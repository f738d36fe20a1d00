//! Query error types.

use thiserror::Error;

/// Error returned when compiling a path expression fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path {path:?}: {kind}")]
pub struct PathError {
    /// The path expression as given.
    pub path: String,
    /// The kind of error.
    pub kind: PathErrorKind,
}

/// The kind of path compile error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathErrorKind {
    /// The expression is empty.
    #[error("path is empty")]
    Empty,
    /// A `[` without matching `]`, or a stray `]`.
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
    /// A quote that is never closed.
    #[error("unterminated quote")]
    UnterminatedQuote,
    /// Nothing between `[` and `]`.
    #[error("empty filter expression")]
    EmptyFilter,
    /// A filter that is none of the supported forms.
    #[error("invalid filter [{0}]")]
    InvalidFilter(String),
    /// `[0]`; positions start at 1.
    #[error("position filters start at 1")]
    ZeroPosition,
    /// A `name()` filter.
    #[error("unsupported function {0}")]
    UnsupportedFunction(String),
}

impl PathError {
    /// Create a new path error.
    pub fn new(path: impl Into<String>, kind: PathErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Error returned when building a query fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An account path did not compile.
    #[error(transparent)]
    Path(#[from] PathError),
}
