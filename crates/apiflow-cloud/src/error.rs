//! Self-hosted orchestration error types

use thiserror::Error;

/// Orchestration errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{tool} not found. Please install: {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unexpected orchestrator output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
