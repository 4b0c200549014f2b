//! Error types for the change highlighting engine.
//!
//! Locating a change never fails with an error: a change that cannot be placed
//! safely is reported as skipped. The variants here cover the surrounding
//! plumbing (configuration, change record loading) and rejected draw calls,
//! which the committer catches and logs.

/// Result type alias for change highlighting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring the engine or annotating pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A highlight target refused to draw an annotation
    #[error("Annotation failed on page {page}: {reason}")]
    Annotation {
        /// Page number (1-based) of the rejected annotation
        page: usize,
        /// Reason reported by the target
        reason: String,
    },

    /// Configuration value out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Change record payload could not be interpreted
    #[error("Invalid change record: {0}")]
    InvalidRecord(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
