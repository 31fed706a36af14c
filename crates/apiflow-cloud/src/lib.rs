//! apiflow self-hosted cloud (BYOA) contract
//!
//! The deploy pipeline never provisions cloud resources itself. For
//! self-hosted targets it drives an external orchestrator through a fixed
//! protocol and only sequences the phases.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  apiflow CLI                     │
//! │          (apiflow deploy --target byoa)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                apiflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait Orchestrator                 │   │
//! │  │  preflight → prepare → plan → deploy      │   │
//! │  │                         └──→ cleanup      │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │   terraform    │
//!           │  orchestrator  │
//!           └────────────────┘
//! ```

pub mod action;
pub mod error;
pub mod orchestrator;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use error::{CloudError, Result};
pub use orchestrator::{
    AuthStatus, Capability, CapabilityReport, CostEstimate, DeploySpec, InfraPlan, Orchestrator,
    PreparedDeployment, SelfHostedDeployment,
};
