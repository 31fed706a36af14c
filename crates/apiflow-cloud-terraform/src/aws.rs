//! aws CLI wrapper
//!
//! Only the calls needed for pre-flight: presence, caller identity and the
//! configured default region.

use crate::error::{Result, TerraformError};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// aws CLI wrapper
pub struct AwsCli {
    profile: Option<String>,
}

impl AwsCli {
    pub fn new(profile: Option<String>) -> Self {
        Self { profile }
    }

    /// Check if the aws CLI is installed
    pub async fn is_installed(&self) -> bool {
        is_on_path("aws").await
    }

    /// Check authentication by asking STS who we are
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        if !self.is_installed().await {
            return Err(TerraformError::AwsCliNotFound);
        }

        let output = self
            .run_command(&["sts", "get-caller-identity", "--output", "json"])
            .await
            .map_err(|e| match e {
                TerraformError::CommandFailed { stderr, .. } => {
                    TerraformError::AuthenticationFailed(stderr.trim().to_string())
                }
                other => other,
            })?;

        let identity: CallerIdentity = serde_json::from_str(&output)?;
        Ok(identity)
    }

    /// Region from the local aws configuration, if any
    pub async fn configured_region(&self) -> Option<String> {
        let output = self.run_command(&["configure", "get", "region"]).await.ok()?;
        let region = output.trim();
        if region.is_empty() {
            None
        } else {
            Some(region.to_string())
        }
    }

    /// Run an aws command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("aws");
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: aws {}", args.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TerraformError::CommandFailed {
                command: format!("aws {}", args.join(" ")),
                stderr: stderr.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Output of `aws sts get-caller-identity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(rename = "UserId")]
    pub user_id: String,

    #[serde(rename = "Account")]
    pub account: String,

    #[serde(rename = "Arn")]
    pub arn: String,
}

/// Check whether an executable is on PATH
pub(crate) async fn is_on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
