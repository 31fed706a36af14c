//! デプロイ要求の組み立て
//!
//! マニフェストで省略された scaling / resources はここでデフォルトを補う。

use crate::model::ExistingDeployment;
use apiflow_cloud::DeploySpec;
use apiflow_core::{Manifest, Resources, Scaling};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// scaling 省略時のデフォルト
pub const DEFAULT_SCALING: Scaling = Scaling {
    min_replicas: 1,
    max_replicas: 10,
    target_cpu: 70,
};

/// hosted プロトコルの resources 省略時のデフォルト
pub fn default_resources() -> Resources {
    Resources {
        memory: "512Mi".to_string(),
        cpu: "250m".to_string(),
    }
}

/// hosted: `POST /hosted/v1/deploy`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostedDeployRequest {
    pub api_name: String,
    pub image_tag: String,
    pub runtime: String,
    pub port: u16,
    pub start_command: String,
    pub endpoints: Vec<String>,
    pub health_check: String,
    pub environment: EnvironmentNames,
    pub scaling: Scaling,
    pub resources: Resources,
    /// 更新時のみ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
}

/// 環境変数は名前（とマニフェスト上のデフォルト）だけを送る。値は別経路で設定する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentNames {
    pub required: Vec<String>,
    pub optional: BTreeMap<String, String>,
}

/// legacy: `POST /deployment/api/v1/deploy/{api_name}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyDeployRequest {
    pub api_id: String,
    pub version: String,
    pub runtime: String,
    pub code_url: String,
    pub environment: Vec<String>,
    pub replicas: u32,
    pub resources: LegacyResources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyResources {
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_request: String,
    pub memory_limit: String,
}

impl Default for LegacyResources {
    fn default() -> Self {
        Self {
            cpu_request: "100m".to_string(),
            cpu_limit: "500m".to_string(),
            memory_request: "128Mi".to_string(),
            memory_limit: "512Mi".to_string(),
        }
    }
}

pub fn hosted_request(
    manifest: &Manifest,
    api_name: &str,
    image_tag: &str,
    existing: Option<&ExistingDeployment>,
) -> HostedDeployRequest {
    HostedDeployRequest {
        api_name: api_name.to_string(),
        image_tag: image_tag.to_string(),
        runtime: manifest.runtime.clone(),
        port: manifest.port,
        start_command: manifest.start_command.clone(),
        endpoints: manifest.endpoints.clone(),
        health_check: manifest.health_check_path(),
        environment: EnvironmentNames {
            required: manifest.environment.required.clone(),
            optional: manifest.environment.optional.clone(),
        },
        scaling: manifest.scaling.unwrap_or(DEFAULT_SCALING),
        resources: manifest.resources.clone().unwrap_or_else(default_resources),
        deployment_id: existing.map(|e| e.deployment_id.clone()),
    }
}

pub fn legacy_request(
    manifest: &Manifest,
    api_name: &str,
    version: &str,
    base_url: &str,
    replicas: u32,
) -> LegacyDeployRequest {
    LegacyDeployRequest {
        api_id: api_name.to_string(),
        version: version.to_string(),
        runtime: manifest.runtime.clone(),
        code_url: format!(
            "{}/storage/api/v1/code/{}/{}",
            base_url.trim_end_matches('/'),
            api_name,
            version
        ),
        environment: manifest.environment.required.clone(),
        replicas,
        resources: LegacyResources::default(),
    }
}

/// self-hosted オーケストレーターへ渡す仕様
pub fn deploy_spec(
    manifest: &Manifest,
    api_name: &str,
    region: Option<String>,
    project_dir: &Path,
) -> DeploySpec {
    DeploySpec {
        name: api_name.to_string(),
        runtime: manifest.runtime.clone(),
        start_command: manifest.start_command.clone(),
        port: manifest.port,
        health_check: manifest.health_check_path(),
        endpoints: manifest.endpoints.clone(),
        environment: manifest.environment.required.clone(),
        scaling: manifest.scaling.unwrap_or(DEFAULT_SCALING),
        resources: manifest.resources.clone().unwrap_or_else(default_resources),
        region,
        exclude: manifest.files.exclude.clone(),
        project_dir: project_dir.to_path_buf(),
    }
}

/// hosted のイメージタグ（`{name}:{unixtime}`）
pub fn image_tag(api_name: &str, explicit: Option<&str>) -> String {
    match explicit {
        Some(tag) => tag.to_string(),
        None => format!("{}:{}", api_name, chrono::Utc::now().timestamp()),
    }
}
