//! Terraform orchestrator error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("terraform not found. Please install: brew install terraform")]
    TerraformNotFound,

    #[error("aws CLI not found. Please install: brew install awscli")]
    AwsCliNotFound,

    #[error("aws authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("terraform output is missing '{0}'")]
    MissingOutput(String),

    #[error("Invalid quantity '{0}'")]
    InvalidQuantity(String),

    #[error("Invalid deployment name: {0}")]
    InvalidName(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Build context error: {0}")]
    Build(#[from] apiflow_build::BuildError),
}

impl From<TerraformError> for apiflow_cloud::CloudError {
    fn from(err: TerraformError) -> Self {
        use apiflow_cloud::CloudError;
        match err {
            TerraformError::TerraformNotFound => CloudError::ToolNotFound {
                tool: "terraform".to_string(),
                hint: "brew install terraform".to_string(),
            },
            TerraformError::AwsCliNotFound => CloudError::ToolNotFound {
                tool: "aws".to_string(),
                hint: "brew install awscli".to_string(),
            },
            TerraformError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            TerraformError::CommandFailed { command, stderr } => {
                CloudError::CommandFailed { command, stderr }
            }
            TerraformError::MissingOutput(name) => {
                CloudError::InvalidOutput(format!("terraform output is missing '{}'", name))
            }
            TerraformError::InvalidQuantity(q) => {
                CloudError::InvalidConfig(format!("Invalid quantity '{}'", q))
            }
            TerraformError::InvalidName(msg) => {
                CloudError::InvalidConfig(format!("Invalid deployment name: {}", msg))
            }
            TerraformError::JsonError(e) => CloudError::Json(e),
            TerraformError::IoError(e) => CloudError::Io(e),
            TerraformError::Build(e) => CloudError::InvalidConfig(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TerraformError>;
