//! terraform CLI wrapper
//!
//! Wraps the terraform commands run inside a deployment working directory.

use crate::aws::is_on_path;
use crate::error::{Result, TerraformError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// terraform CLI wrapper bound to one working directory
pub struct Terraform {
    work_dir: PathBuf,
    aws_profile: Option<String>,
}

impl Terraform {
    pub fn new(work_dir: impl Into<PathBuf>, aws_profile: Option<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            aws_profile,
        }
    }

    /// Check if terraform is installed
    pub async fn is_installed() -> bool {
        is_on_path("terraform").await
    }

    /// terraform init
    pub async fn init(&self) -> Result<()> {
        self.run_command(&["init", "-input=false", "-no-color"]).await?;
        Ok(())
    }

    /// terraform plan, saving the plan to `plan_file`
    pub async fn plan(&self, plan_file: &Path) -> Result<()> {
        let out = format!("-out={}", plan_file.display());
        self.run_command(&["plan", "-input=false", "-no-color", &out])
            .await?;
        Ok(())
    }

    /// terraform show -json for a saved plan
    pub async fn show_plan_json(&self, plan_file: &Path) -> Result<String> {
        let plan = plan_file.display().to_string();
        self.run_command(&["show", "-json", "-no-color", &plan]).await
    }

    /// terraform apply of a saved plan
    pub async fn apply(&self, plan_file: &Path) -> Result<()> {
        let plan = plan_file.display().to_string();
        self.run_command(&["apply", "-input=false", "-no-color", "-auto-approve", &plan])
            .await?;
        Ok(())
    }

    /// terraform output -json
    pub async fn output_json(&self) -> Result<String> {
        self.run_command(&["output", "-json", "-no-color"]).await
    }

    /// Run a terraform command in the working directory and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("terraform");
        cmd.current_dir(&self.work_dir);
        cmd.args(args);
        cmd.env("TF_IN_AUTOMATION", "1");
        if let Some(profile) = &self.aws_profile {
            cmd.env("AWS_PROFILE", profile);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: terraform {} (in {})",
            args.join(" "),
            self.work_dir.display()
        );

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TerraformError::TerraformNotFound
            } else {
                TerraformError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TerraformError::CommandFailed {
                command: format!("terraform {}", args.first().copied().unwrap_or_default()),
                stderr: stderr.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
