//! Error types for the outer surfaces (scripts, terminal session).
//!
//! The animation and segmentation core never fails; it clamps and carries
//! on. Only I/O-facing code returns these.

use thiserror::Error;

/// Errors raised while loading scripts or driving the terminal.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the terminal or the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transcript script could not be parsed.
    #[error("invalid transcript script: {0}")]
    Script(#[from] serde_json::Error),

    /// The input actor went away or reported a failure.
    #[error("terminal input failed: {0}")]
    Terminal(String),
}

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
