//! Shared configuration, error taxonomy, and the signature index.

pub mod config;
pub mod error;
pub mod sigindex;

pub use config::{Config, ConfigError};
pub use error::LoadError;
pub use sigindex::{SigIndexError, SignatureIndex};
