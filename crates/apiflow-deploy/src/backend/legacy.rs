//! legacy プロトコル（storage / deployment API）

use super::http::{self, ApiClient};
use super::{
    DEPLOY_TIMEOUT, DeployClient, DeployParams, DeploymentLookup, LOOKUP_TIMEOUT, StatusClient,
    UPLOAD_TIMEOUT, UploadClient, UploadRequest,
};
use crate::error::{DeployError, Result};
use crate::model::{BuildRef, DeploymentRecord, ExistingDeployment, Status};
use crate::request;
use apiflow_build::{BuildContext, BuildError};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// legacy API クライアント
///
/// - `POST storage/api/v1/upload/{name}` - コードのアップロード
/// - `POST deployment/api/v1/deploy/{name}` - デプロイ
/// - `GET deployment/api/v1/status/{name}` - ステータス
///
/// デプロイIDはAPI名そのもの。
pub struct LegacyClient {
    api: ApiClient,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct DeployResponse {
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

impl LegacyClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, token)?,
        })
    }

    fn status_path(api_name: &str) -> String {
        format!("deployment/api/v1/status/{}", api_name)
    }
}

#[async_trait]
impl DeploymentLookup for LegacyClient {
    async fn find(&self, api_name: &str) -> Result<Option<ExistingDeployment>> {
        let response = http::send(
            self.api.get(&Self::status_path(api_name)).timeout(LOOKUP_TIMEOUT),
            "failed to look up existing deployment",
        )
        .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body: StatusResponse =
                    http::json(response, "invalid deployment status response").await?;
                Ok(Some(ExistingDeployment {
                    deployment_id: api_name.to_string(),
                    endpoint: None,
                    status: Some(body.status),
                }))
            }
            _ => {
                let (status, body) = http::error_body(response).await;
                Err(DeployError::DeployRequest { status, body })
            }
        }
    }
}

#[async_trait]
impl UploadClient for LegacyClient {
    async fn upload(&self, request: &UploadRequest<'_>, context: &BuildContext) -> Result<BuildRef> {
        let data = context.read_bytes().map_err(BuildError::Io)?;
        tracing::debug!(bytes = data.len(), api_name = request.api_name, "uploading code");

        let code = Part::bytes(data)
            .file_name(format!("{}.tar.gz", request.api_name))
            .mime_str("application/gzip")
            .map_err(|e| DeployError::transport("invalid upload part", e))?;
        let form = Form::new()
            .part("code", code)
            .text("runtime", request.runtime.to_string());

        let path = format!("storage/api/v1/upload/{}", request.api_name);
        let response = http::send(
            self.api.post(&path).multipart(form).timeout(UPLOAD_TIMEOUT),
            "failed to upload code",
        )
        .await?;

        if !response.status().is_success() {
            let (status, body) = http::error_body(response).await;
            return Err(DeployError::Upload { status, body });
        }

        let body: UploadResponse = http::json(response, "invalid upload response").await?;
        Ok(BuildRef::Version(body.version))
    }
}

#[async_trait]
impl DeployClient for LegacyClient {
    async fn deploy(&self, params: &DeployParams<'_>) -> Result<DeploymentRecord> {
        let version = match params.build {
            BuildRef::Version(version) => version,
            BuildRef::Image { .. } => {
                return Err(DeployError::Config(
                    "legacy protocol deploys uploaded code versions, not images".to_string(),
                ));
            }
        };

        let payload = request::legacy_request(
            params.manifest,
            params.api_name,
            version,
            self.api.base_url(),
            params.replicas,
        );

        let path = format!("deployment/api/v1/deploy/{}", params.api_name);
        let response = http::send(
            self.api.post(&path).json(&payload).timeout(DEPLOY_TIMEOUT),
            "failed to send deploy request",
        )
        .await?;

        if !response.status().is_success() {
            let (status, body) = http::error_body(response).await;
            return Err(DeployError::DeployRequest { status, body });
        }

        let body: DeployResponse = http::json(response, "invalid deploy response").await?;
        Ok(DeploymentRecord {
            deployment_id: params.api_name.to_string(),
            endpoint: body.endpoint,
            status: Status::Pending,
        })
    }
}

#[async_trait]
impl StatusClient for LegacyClient {
    async fn status(&self, deployment_id: &str) -> Result<Status> {
        let response = http::send(
            self.api
                .get(&Self::status_path(deployment_id))
                .timeout(LOOKUP_TIMEOUT),
            "failed to fetch deployment status",
        )
        .await?;

        if !response.status().is_success() {
            let (status, body) = http::error_body(response).await;
            return Err(DeployError::DeployRequest { status, body });
        }

        let body: StatusResponse = http::json(response, "invalid status response").await?;
        Ok(Status::parse(&body.status))
    }
}
