//! Terraform working directory contents
//!
//! Renders the root module (`main.tf.json`) and its variables, and parses the
//! JSON that `terraform show -json` / `terraform output -json` print.

use crate::error::{Result, TerraformError};
use apiflow_cloud::{Action, ActionType, DeploySpec, Plan, SelfHostedDeployment};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

pub const MAIN_FILE: &str = "main.tf.json";
pub const VARS_FILE: &str = "terraform.tfvars.json";
pub const CONTEXT_FILE: &str = "context.tar.gz";
pub const PLAN_FILE: &str = "tfplan";

/// Variables passed from a [`DeploySpec`] into the service module
const VARIABLES: &[&str] = &[
    "name",
    "region",
    "runtime",
    "start_command",
    "port",
    "health_check",
    "endpoints",
    "environment",
    "min_replicas",
    "max_replicas",
    "target_cpu",
    "memory",
    "cpu",
    "context_path",
];

const OUTPUTS: &[&str] = &["dns_name", "deployment_id", "account", "region"];

/// Render the root module that wraps the service module
pub fn render_main(module_source: &str) -> Value {
    let variables: serde_json::Map<String, Value> = VARIABLES
        .iter()
        .map(|name| (name.to_string(), json!({})))
        .collect();

    let mut module = serde_json::Map::new();
    module.insert("source".to_string(), json!(module_source));
    for name in VARIABLES {
        module.insert(name.to_string(), json!(format!("${{var.{}}}", name)));
    }

    let outputs: serde_json::Map<String, Value> = OUTPUTS
        .iter()
        .map(|name| {
            (
                name.to_string(),
                json!({ "value": format!("${{module.service.{}}}", name) }),
            )
        })
        .collect();

    json!({
        "terraform": { "required_version": ">= 1.5" },
        "provider": { "aws": { "region": "${var.region}" } },
        "variable": variables,
        "module": { "service": module },
        "output": outputs,
    })
}

/// Render `terraform.tfvars.json` for one deployment
pub fn render_vars(spec: &DeploySpec, region: &str, context_path: &str) -> Value {
    json!({
        "name": spec.name,
        "region": region,
        "runtime": spec.runtime,
        "start_command": spec.start_command,
        "port": spec.port,
        "health_check": spec.health_check,
        "endpoints": spec.endpoints,
        "environment": spec.environment,
        "min_replicas": spec.scaling.min_replicas,
        "max_replicas": spec.scaling.max_replicas,
        "target_cpu": spec.scaling.target_cpu,
        "memory": spec.resources.memory,
        "cpu": spec.resources.cpu,
        "context_path": context_path,
    })
}

#[derive(Debug, Deserialize)]
struct ShowPlan {
    #[serde(default)]
    resource_changes: Vec<ResourceChange>,
}

#[derive(Debug, Deserialize)]
struct ResourceChange {
    address: String,
    #[serde(rename = "type")]
    resource_type: String,
    change: Change,
}

#[derive(Debug, Deserialize)]
struct Change {
    actions: Vec<String>,
}

/// Parse `terraform show -json <plan>` into a [`Plan`]
pub fn parse_plan(json: &str) -> Result<Plan> {
    let show: ShowPlan = serde_json::from_str(json)?;

    let actions = show
        .resource_changes
        .into_iter()
        .map(|rc| {
            let action_type = action_type(&rc.change.actions);
            Action {
                description: format!("{} {}", action_type, rc.address),
                id: rc.address,
                action_type,
                resource_type: rc.resource_type,
                details: HashMap::new(),
            }
        })
        .collect();

    Ok(Plan::new(actions))
}

fn action_type(actions: &[String]) -> ActionType {
    let actions: Vec<&str> = actions.iter().map(String::as_str).collect();
    match actions.as_slice() {
        ["create"] => ActionType::Create,
        ["update"] => ActionType::Update,
        ["delete"] => ActionType::Delete,
        ["delete", "create"] | ["create", "delete"] => ActionType::Replace,
        _ => ActionType::NoOp,
    }
}

#[derive(Debug, Deserialize)]
struct OutputValue {
    value: Value,
}

/// Parse `terraform output -json` into the deployment result
pub fn parse_outputs(json: &str) -> Result<SelfHostedDeployment> {
    let outputs: HashMap<String, OutputValue> = serde_json::from_str(json)?;

    let get = |name: &str| -> Result<String> {
        match outputs.get(name).map(|o| &o.value) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(TerraformError::MissingOutput(name.to_string())),
        }
    };

    Ok(SelfHostedDeployment {
        dns_name: get("dns_name")?,
        deployment_id: get("deployment_id")?,
        account: get("account")?,
        region: get("region")?,
    })
}
