//! Terraform orchestrator for apiflow self-hosted deployments
//!
//! This crate implements the [`Orchestrator`](apiflow_cloud::Orchestrator)
//! contract on top of the `terraform` and `aws` CLIs, deploying the API as a
//! container service inside the user's own AWS account.
//!
//! # Requirements
//!
//! - `aws` CLI installed and authenticated (`aws sts get-caller-identity`)
//! - `terraform` >= 1.5 installed
//!
//! # Example
//!
//! ```ignore
//! use apiflow_cloud::Orchestrator;
//! use apiflow_cloud_terraform::TerraformOrchestrator;
//!
//! let orchestrator = TerraformOrchestrator::new("/home/me/.config/apiflow/byoa");
//!
//! let report = orchestrator.preflight().await?;
//! if !report.is_ready() {
//!     panic!("not ready: {:?}", report.problems());
//! }
//! ```

pub mod aws;
pub mod error;
pub mod pricing;
pub mod provider;
pub mod terraform;
pub mod workspace;

pub use aws::{AwsCli, CallerIdentity};
pub use error::{Result, TerraformError};
pub use provider::{MODULE_SOURCE, TerraformOrchestrator};
pub use terraform::Terraform;
