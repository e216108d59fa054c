//! Error type for the fallible edges of the engine.
//!
//! The fusion components themselves are total; only configuration loading,
//! trace reading and recording can fail.

use thiserror::Error;

/// Errors raised while configuring a session or moving data in and out of it.
#[derive(Debug, Error)]
pub enum PdrError {
    /// A configuration value is outside its accepted domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML or has wrongly typed fields.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading a trace or writing a recording failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type PdrResult<T> = Result<T, PdrError>;
