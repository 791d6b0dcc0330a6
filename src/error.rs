//! Crate error type

use std::path::PathBuf;

/// Errors surfaced by configuration, persistence and the world loop handle.
///
/// The simulation itself never fails; its quirks are configured, not reported.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown ruleset `{0}` (expected `classic` or `corrected`)")]
    UnknownRuleset(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("screen bounds must be non-empty, got {width}x{height}")]
    InvalidBounds { width: i32, height: i32 },

    #[error("world loop has shut down")]
    LoopClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
