//! Error types for pitwall

use thiserror::Error;

/// Errors raised by the race-control core
#[derive(Error, Debug)]
pub enum RaceError {
    /// A mandatory configuration key is absent from every active scope
    #[error("mandatory config key [{section}::{key}] is not set in any active scope")]
    ConfigMissing {
        /// Configuration section
        section: String,
        /// Configuration key
        key: String,
    },

    /// A configuration value has the wrong shape for the requested accessor
    #[error("config key [{section}::{key}] is not a {expected}")]
    ConfigType {
        /// Configuration section
        section: String,
        /// Configuration key
        key: String,
        /// Expected value shape
        expected: &'static str,
    },

    /// The requested command name is not part of the fixed command set
    #[error("unknown command [{0}]")]
    UnknownCommand(String),

    /// Extraction did not yield exactly one candidate directory
    #[error(
        "expected exactly one unpacked candidate directory matching [{pattern}] but found {found}"
    )]
    AmbiguousInstallation {
        /// Name pattern used for discovery
        pattern: String,
        /// Number of matching directories
        found: usize,
    },

    /// Track definition could not be loaded or is invalid
    #[error("track error: {0}")]
    Track(String),

    /// Archive could not be read or unpacked
    #[error("archive error: {0}")]
    Archive(String),

    /// External load driver failed
    #[error("driver error: {0}")]
    Driver(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RaceError>;
