//! Errors raised while deploying and driving the contracts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown contract in deployment module: {0}")]
    UnknownContract(String),

    #[error("Contract {0} declared twice in deployment module")]
    DuplicateContract(String),

    #[error("Step `{step}` reverted: {detail}")]
    Reverted { step: &'static str, detail: String },

    #[error("Step `{step}` could not be invoked: {detail}")]
    Invoke { step: &'static str, detail: String },

    #[error("Step `{step}` returned an unreadable value: {detail}")]
    Conversion { step: &'static str, detail: String },

    #[error("Address has no strkey form: {0}")]
    Address(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
