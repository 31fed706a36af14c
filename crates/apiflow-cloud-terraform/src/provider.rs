//! Terraform orchestrator implementation

use crate::aws::AwsCli;
use crate::error::{Result, TerraformError};
use crate::pricing;
use crate::terraform::Terraform;
use crate::workspace::{self, CONTEXT_FILE, MAIN_FILE, PLAN_FILE, VARS_FILE};
use apiflow_build::{ContextBuilder, ExclusionRules};
use apiflow_cloud::{
    AuthStatus, Capability, CapabilityReport, CostEstimate, DeploySpec, InfraPlan, Orchestrator,
    PreparedDeployment, SelfHostedDeployment,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Service module instantiated by the generated root module
pub const MODULE_SOURCE: &str = "github.com/apiflow-dev/terraform-aws-apiflow-service";

const DEFAULT_REGION: &str = "us-east-1";

/// Orchestrator that provisions the service with terraform in the user's AWS account
///
/// Each API gets its own working directory under `state_root`, which keeps the
/// terraform state between runs. Only the per-run files are staged and cleaned up.
pub struct TerraformOrchestrator {
    state_root: PathBuf,
    aws: AwsCli,
    aws_profile: Option<String>,
}

impl TerraformOrchestrator {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
            aws: AwsCli::new(None),
            aws_profile: None,
        }
    }

    /// Named AWS profile for both the aws CLI and terraform
    pub fn with_aws_profile(mut self, profile: impl Into<String>) -> Self {
        let profile = profile.into();
        self.aws = AwsCli::new(Some(profile.clone()));
        self.aws_profile = Some(profile);
        self
    }

    /// Working directory for one API
    ///
    /// The name must stay a single path component under `state_root`.
    fn work_dir(&self, name: &str) -> Result<PathBuf> {
        apiflow_core::validate_name(name)
            .map_err(|e| TerraformError::InvalidName(e.to_string()))?;
        Ok(self.state_root.join(name))
    }

    fn terraform(&self, work_dir: &Path) -> Terraform {
        Terraform::new(work_dir, self.aws_profile.clone())
    }

    async fn resolve_region(&self, spec: &DeploySpec) -> String {
        if let Some(region) = &spec.region {
            return region.clone();
        }
        match self.aws.configured_region().await {
            Some(region) => region,
            None => {
                tracing::debug!("No region configured, using {}", DEFAULT_REGION);
                DEFAULT_REGION.to_string()
            }
        }
    }

    async fn stage(&self, spec: &DeploySpec) -> Result<PreparedDeployment> {
        let work_dir = self.work_dir(&spec.name)?;
        tokio::fs::create_dir_all(&work_dir).await?;

        // Package the project the same way the hosted build does
        let rules = ExclusionRules::hosted()
            .with_manifest_excludes(spec.exclude.iter().map(String::as_str))?;
        let context = ContextBuilder::create_context(&spec.project_dir, &rules)?;
        let context_path = work_dir.join(CONTEXT_FILE);
        tokio::fs::copy(context.path(), &context_path).await?;
        drop(context);

        let region = self.resolve_region(spec).await;
        tracing::info!("Staging {} for region {}", spec.name, region);

        let main = workspace::render_main(MODULE_SOURCE);
        tokio::fs::write(work_dir.join(MAIN_FILE), serde_json::to_vec_pretty(&main)?).await?;

        let vars = workspace::render_vars(spec, &region, CONTEXT_FILE);
        let vars_path = work_dir.join(VARS_FILE);
        tokio::fs::write(&vars_path, serde_json::to_vec_pretty(&vars)?).await?;

        Ok(PreparedDeployment {
            name: spec.name.clone(),
            staged_files: vec![context_path, vars_path, work_dir.join(PLAN_FILE)],
            work_dir,
        })
    }

    async fn estimate_cost(&self, work_dir: &Path) -> Result<CostEstimate> {
        let vars: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(work_dir.join(VARS_FILE)).await?)?;

        let text = |key: &str| vars[key].as_str().unwrap_or_default().to_string();
        let number = |key: &str| vars[key].as_u64().unwrap_or(1) as u32;

        pricing::estimate(
            &text("cpu"),
            &text("memory"),
            number("min_replicas"),
            number("max_replicas"),
        )
    }
}

#[async_trait]
impl Orchestrator for TerraformOrchestrator {
    fn name(&self) -> &str {
        "terraform"
    }

    async fn preflight(&self) -> apiflow_cloud::Result<CapabilityReport> {
        let cloud_cli = Capability {
            name: "aws".to_string(),
            available: self.aws.is_installed().await,
            hint: "brew install awscli".to_string(),
        };

        let credentials = if cloud_cli.available {
            match self.aws.caller_identity().await {
                Ok(identity) => AuthStatus::ok(format!("{} ({})", identity.arn, identity.account)),
                Err(e) => AuthStatus::failed(e.to_string()),
            }
        } else {
            AuthStatus::failed("aws CLI is not installed")
        };

        let iac_tool = Capability {
            name: "terraform".to_string(),
            available: Terraform::is_installed().await,
            hint: "brew install terraform".to_string(),
        };

        Ok(CapabilityReport {
            cloud_cli,
            credentials,
            iac_tool,
        })
    }

    async fn prepare(&self, spec: &DeploySpec) -> apiflow_cloud::Result<PreparedDeployment> {
        Ok(self.stage(spec).await?)
    }

    async fn plan(&self, prepared: &PreparedDeployment) -> apiflow_cloud::Result<InfraPlan> {
        let terraform = self.terraform(&prepared.work_dir);
        let plan_file = prepared.work_dir.join(PLAN_FILE);

        terraform.init().await?;
        terraform.plan(&plan_file).await?;
        let json = terraform.show_plan_json(&plan_file).await?;
        let plan = workspace::parse_plan(&json)?;
        tracing::info!("Plan: {}", plan.summary());

        let cost = self.estimate_cost(&prepared.work_dir).await?;

        Ok(InfraPlan {
            plan,
            cost,
            plan_file,
            created_at: chrono::Utc::now(),
        })
    }

    async fn deploy(&self, plan: &InfraPlan) -> apiflow_cloud::Result<SelfHostedDeployment> {
        let work_dir = plan.plan_file.parent().ok_or_else(|| {
            apiflow_cloud::CloudError::InvalidConfig(format!(
                "plan file has no parent directory: {}",
                plan.plan_file.display()
            ))
        })?;
        let terraform = self.terraform(work_dir);

        terraform.apply(&plan.plan_file).await?;
        let json = terraform.output_json().await?;
        Ok(workspace::parse_outputs(&json)?)
    }

    async fn cleanup(&self, prepared: &PreparedDeployment) -> apiflow_cloud::Result<()> {
        for file in &prepared.staged_files {
            match tokio::fs::remove_file(file).await {
                Ok(()) => tracing::debug!("Removed {}", file.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(TerraformError::IoError(e).into()),
            }
        }
        Ok(())
    }
}
