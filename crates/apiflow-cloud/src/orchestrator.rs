//! Orchestrator trait definition

use crate::action::Plan;
use crate::error::Result;
use apiflow_core::{Resources, Scaling};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Three-phase orchestration contract for self-hosted (BYOA) deployments
///
/// The pipeline calls the phases strictly in order:
/// `preflight` → `prepare` → `plan` → (confirmation) → `deploy`.
/// `cleanup` is called once `prepare` has succeeded, on every exit path.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Returns the orchestrator name (e.g., "terraform")
    fn name(&self) -> &str;

    /// Check that the cloud CLI, credentials and IaC tool are usable
    async fn preflight(&self) -> Result<CapabilityReport>;

    /// Stage local files and credentials
    async fn prepare(&self, spec: &DeploySpec) -> Result<PreparedDeployment>;

    /// Compute the infrastructure diff and a cost estimate
    async fn plan(&self, prepared: &PreparedDeployment) -> Result<InfraPlan>;

    /// Apply a previously computed plan
    async fn deploy(&self, plan: &InfraPlan) -> Result<SelfHostedDeployment>;

    /// Remove staged artifacts
    async fn cleanup(&self, prepared: &PreparedDeployment) -> Result<()>;
}

/// What the orchestrator is asked to deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploySpec {
    pub name: String,
    pub runtime: String,
    pub start_command: String,
    pub port: u16,
    pub health_check: String,
    pub endpoints: Vec<String>,
    /// Environment variable names (values are provisioned out of band)
    pub environment: Vec<String>,
    pub scaling: Scaling,
    pub resources: Resources,
    pub region: Option<String>,
    /// Extra exclusion patterns for the staged archive (manifest `files.exclude`)
    pub exclude: Vec<String>,
    /// Project directory to stage
    pub project_dir: PathBuf,
}

/// Result of the Prepare phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedDeployment {
    pub name: String,
    /// Working directory owned by the orchestrator
    pub work_dir: PathBuf,
    /// Files staged for this run only (removed by cleanup)
    pub staged_files: Vec<PathBuf>,
}

/// Result of the Plan phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraPlan {
    pub plan: Plan,
    pub cost: CostEstimate,
    /// Saved plan artifact to apply
    pub plan_file: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Result of the Deploy phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfHostedDeployment {
    /// Public DNS name of the load balancer / service
    pub dns_name: String,
    pub deployment_id: String,
    pub account: String,
    pub region: String,
}

impl SelfHostedDeployment {
    /// Public endpoint URL
    pub fn endpoint(&self) -> String {
        if self.dns_name.starts_with("http://") || self.dns_name.starts_with("https://") {
            self.dns_name.clone()
        } else {
            format!("http://{}", self.dns_name)
        }
    }
}

/// Monthly cost estimate shown before Deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated monthly cost at minimum scale (USD)
    pub monthly_min_usd: f64,
    /// Estimated monthly cost at maximum scale (USD)
    pub monthly_max_usd: f64,
    /// Line items (name, USD per month at minimum scale)
    pub breakdown: Vec<(String, f64)>,
}

impl std::fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if (self.monthly_max_usd - self.monthly_min_usd).abs() < 0.005 {
            write!(f, "~${:.2}/month", self.monthly_min_usd)
        } else {
            write!(
                f,
                "~${:.2}–${:.2}/month",
                self.monthly_min_usd, self.monthly_max_usd
            )
        }
    }
}

/// Availability of one required tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub available: bool,
    /// Install hint shown when unavailable
    pub hint: String,
}

/// Authentication status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Pre-flight result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub cloud_cli: Capability,
    pub credentials: AuthStatus,
    pub iac_tool: Capability,
}

impl CapabilityReport {
    pub fn is_ready(&self) -> bool {
        self.cloud_cli.available && self.credentials.authenticated && self.iac_tool.available
    }

    /// Human readable reasons the report is not ready
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for tool in [&self.cloud_cli, &self.iac_tool] {
            if !tool.available {
                problems.push(format!("{} not found (install: {})", tool.name, tool.hint));
            }
        }
        if self.cloud_cli.available && !self.credentials.authenticated {
            problems.push(format!(
                "cloud credentials invalid: {}",
                self.credentials.error.as_deref().unwrap_or("unknown error")
            ));
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(name: &str, available: bool) -> Capability {
        Capability {
            name: name.to_string(),
            available,
            hint: format!("brew install {}", name),
        }
    }

    #[test]
    fn test_report_ready() {
        let report = CapabilityReport {
            cloud_cli: capability("aws", true),
            credentials: AuthStatus::ok("123456789012"),
            iac_tool: capability("terraform", true),
        };
        assert!(report.is_ready());
        assert!(report.problems().is_empty());
    }

    #[test]
    fn test_report_problems() {
        let report = CapabilityReport {
            cloud_cli: capability("aws", true),
            credentials: AuthStatus::failed("ExpiredToken"),
            iac_tool: capability("terraform", false),
        };
        assert!(!report.is_ready());
        let problems = report.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("terraform"));
        assert!(problems[1].contains("ExpiredToken"));
    }

    #[test]
    fn test_endpoint_from_dns_name() {
        let deployment = SelfHostedDeployment {
            dns_name: "myapi-123.us-east-1.elb.amazonaws.com".to_string(),
            deployment_id: "arn:aws:ecs:svc".to_string(),
            account: "123456789012".to_string(),
            region: "us-east-1".to_string(),
        };
        assert_eq!(
            deployment.endpoint(),
            "http://myapi-123.us-east-1.elb.amazonaws.com"
        );
    }

    #[test]
    fn test_cost_display() {
        let cost = CostEstimate {
            monthly_min_usd: 9.0,
            monthly_max_usd: 90.0,
            breakdown: vec![],
        };
        assert_eq!(cost.to_string(), "~$9.00–$90.00/month");

        let flat = CostEstimate {
            monthly_min_usd: 12.5,
            monthly_max_usd: 12.5,
            breakdown: vec![],
        };
        assert_eq!(flat.to_string(), "~$12.50/month");
    }
}
