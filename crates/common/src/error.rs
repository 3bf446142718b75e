//! Shared error taxonomy for I/O and JSON failures that occur outside the
//! ABI/encode boundary (§7 of the design: `JsonUnmarshalError`,
//! `FileOpenError`, `FileReadError`).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open `{path}`: {source}")]
    Open { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to read `{path}`: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("malformed JSON in `{path}`: {source}")]
    Json { path: PathBuf, #[source] source: serde_json::Error },
}
