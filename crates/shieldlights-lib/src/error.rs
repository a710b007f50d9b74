//! Unified error type for the shieldlights-lib crate.
//!
//! [`LightsError`] covers startup failures (directory enumeration), per-request
//! rejections (`Unsupported`) and the ambient config/protocol errors.
//! `From<std::io::Error>` lets `?` propagate plain I/O failures.

use std::fmt;
use std::path::PathBuf;

/// Unified error type for shieldlights-lib operations.
#[derive(Debug)]
pub enum LightsError {
    /// Standard I/O error (config file, host streams).
    Io(std::io::Error),
    /// Enumerating a sysfs directory that exists failed. Fatal at startup.
    Enumerate {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// No light is registered under this identifier.
    Unsupported(i32),
    /// Configuration validation error.
    Config(String),
    /// Malformed host request or unparseable argument.
    Protocol(String),
}

impl fmt::Display for LightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightsError::Io(e) => write!(f, "I/O error: {e}"),
            LightsError::Enumerate { dir, source } => {
                write!(f, "Failed to enumerate {}: {source}", dir.display())
            }
            LightsError::Unsupported(id) => write!(f, "Light {id} is not supported"),
            LightsError::Config(e) => write!(f, "Config error: {e}"),
            LightsError::Protocol(e) => write!(f, "Protocol error: {e}"),
        }
    }
}

impl std::error::Error for LightsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LightsError::Io(e) => Some(e),
            LightsError::Enumerate { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LightsError {
    fn from(e: std::io::Error) -> Self {
        LightsError::Io(e)
    }
}

/// Crate-level Result alias using [`LightsError`].
pub type Result<T> = std::result::Result<T, LightsError>;
