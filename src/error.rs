//! Error types for histfx

use thiserror::Error;

/// Main error type for histfx operations.
#[derive(Error, Debug)]
pub enum HistfxError {
    /// No exchange data is available to satisfy a query. This covers both
    /// unknown currencies and date windows with no usable rates, and is the
    /// only error the conversion search produces.
    #[error("no forex data")]
    NotFound,

    /// A rate source rejected its input.
    #[error("parse error: {0}")]
    Parse(String),

    /// A remote resource could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HistfxError {
    /// True when the error is the not-found sentinel, which callers routinely
    /// want to treat differently from infrastructure failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistfxError::NotFound)
    }
}

/// Result type alias for histfx operations.
pub type Result<T> = std::result::Result<T, HistfxError>;
