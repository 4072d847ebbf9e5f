// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Error taxonomy for the scanner.
///
/// "No pool for this pair/tier" and "no venue produced a path" are not errors:
/// adapters return `Ok(None)` and the evaluator reports a terminal
/// `OpportunityStatus` instead. Only genuine failures travel through here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Quote failed on {venue}: {reason}")]
    Quote { venue: String, reason: String },

    #[error("Chain read failed: {0}")]
    ChainRead(String),

    #[error("Token {0} has no resolvable metadata")]
    UnknownToken(String),

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
