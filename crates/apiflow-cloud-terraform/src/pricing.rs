//! Rough monthly cost estimate for the container service
//!
//! Uses on-demand Fargate list prices (us-east-1). The estimate is shown to
//! the user before apply; it is not a bill.

use crate::error::{Result, TerraformError};
use apiflow_cloud::CostEstimate;

const HOURS_PER_MONTH: f64 = 730.0;
const VCPU_HOUR_USD: f64 = 0.04048;
const GB_HOUR_USD: f64 = 0.004445;
const LOAD_BALANCER_MONTH_USD: f64 = 16.43;

/// Parse a Kubernetes style CPU quantity ("250m", "1", "0.5") into vCPUs
pub fn parse_cpu(quantity: &str) -> Result<f64> {
    let q = quantity.trim();
    let value = match q.strip_suffix('m') {
        Some(millis) => millis.parse::<f64>().map(|m| m / 1000.0),
        None => q.parse::<f64>(),
    };
    value.map_err(|_| TerraformError::InvalidQuantity(quantity.to_string()))
}

/// Parse a memory quantity ("512Mi", "1Gi", "256M") into GiB
pub fn parse_memory_gb(quantity: &str) -> Result<f64> {
    let q = quantity.trim();
    let (number, divisor) = if let Some(n) = q.strip_suffix("Gi") {
        (n, 1.0)
    } else if let Some(n) = q.strip_suffix("Mi") {
        (n, 1024.0)
    } else if let Some(n) = q.strip_suffix('G') {
        (n, 1.0)
    } else if let Some(n) = q.strip_suffix('M') {
        (n, 1024.0)
    } else {
        return Err(TerraformError::InvalidQuantity(quantity.to_string()));
    };
    number
        .parse::<f64>()
        .map(|n| n / divisor)
        .map_err(|_| TerraformError::InvalidQuantity(quantity.to_string()))
}

/// Estimate the monthly cost for `replicas` tasks of the given size
pub fn estimate(cpu: &str, memory: &str, min_replicas: u32, max_replicas: u32) -> Result<CostEstimate> {
    let vcpu = parse_cpu(cpu)?;
    let memory_gb = parse_memory_gb(memory)?;

    let task_month = |replicas: u32| {
        f64::from(replicas) * HOURS_PER_MONTH * (vcpu * VCPU_HOUR_USD + memory_gb * GB_HOUR_USD)
    };

    let compute_min = task_month(min_replicas);
    let compute_max = task_month(max_replicas);

    Ok(CostEstimate {
        monthly_min_usd: round_cents(compute_min + LOAD_BALANCER_MONTH_USD),
        monthly_max_usd: round_cents(compute_max + LOAD_BALANCER_MONTH_USD),
        breakdown: vec![
            (
                format!("compute ({} x {} vCPU / {} GiB)", min_replicas, vcpu, memory_gb),
                round_cents(compute_min),
            ),
            ("load balancer".to_string(), LOAD_BALANCER_MONTH_USD),
        ],
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
