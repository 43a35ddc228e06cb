//! Error types for the carpus_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for carpus_core operations
///
/// The classification engine itself (generator, validator, cascade) is
/// total and never produces an error; these variants cover the config and
/// persistence layers around it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Taxonomy consistency error
    #[error("Taxonomy validation error: {0}")]
    TaxonomyValidation(String),

    /// Case store error
    #[error("Case error: {0}")]
    Case(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
