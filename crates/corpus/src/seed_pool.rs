//! The seed pool: a typed corpus loaded once at init, read-only thereafter.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedPoolError {
    #[error("failed to open `{path}`: {source}")]
    Open { path: String, #[source] source: std::io::Error },
    #[error("malformed JSON in `{path}`: {source}")]
    Json { path: String, #[source] source: serde_json::Error },
}

/// Paths to the six seed files named in the configuration surface.
#[derive(Debug, Clone)]
pub struct SeedPaths<'a> {
    pub address: &'a Path,
    pub int: &'a Path,
    pub uint: &'a Path,
    pub string: &'a Path,
    pub byte: &'a Path,
    pub bytes: &'a Path,
}

/// Curated boundary/suspicious values per base type, loaded once and
/// read-only for the rest of the run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedPool {
    address: Vec<String>,
    int: Vec<String>,
    uint: Vec<String>,
    string: Vec<String>,
    byte: Vec<String>,
    bytes: Vec<String>,
}

impl SeedPool {
    pub fn load(paths: &SeedPaths<'_>) -> Result<Self, SeedPoolError> {
        Ok(Self {
            address: load_string_array(paths.address)?,
            int: load_string_array(paths.int)?,
            uint: load_string_array(paths.uint)?,
            string: load_string_array(paths.string)?,
            byte: load_string_array(paths.byte)?,
            bytes: load_string_array(paths.bytes)?,
        })
    }

    pub fn addresses(&self) -> &[String] {
        &self.address
    }

    pub fn ints(&self) -> &[String] {
        &self.int
    }

    pub fn uints(&self) -> &[String] {
        &self.uint
    }

    pub fn strings(&self) -> &[String] {
        &self.string
    }

    pub fn bytes1(&self) -> &[String] {
        &self.byte
    }

    pub fn dyn_bytes(&self) -> &[String] {
        &self.bytes
    }
}

fn load_string_array(path: &Path) -> Result<Vec<String>, SeedPoolError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| SeedPoolError::Open { path: path.display().to_string(), source })?;
    serde_json::from_str(&text).map_err(|source| SeedPoolError::Json { path: path.display().to_string(), source })
}
