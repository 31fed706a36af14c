//! hosted プロトコル（マニフェスト駆動、`/hosted/v1`）

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

/// hosted API クライアント
pub struct HostedClient {
    api: ApiClient,
}

#[derive(Debug, Deserialize)]
struct BuildResponse {
    image_tag: String,
    build_id: String,
}

#[derive(Debug, Deserialize)]
struct DeployResponse {
    endpoint: String,
    deployment_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

impl HostedClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, token)?,
        })
    }
}

#[async_trait]
impl DeploymentLookup for HostedClient {
    async fn find(&self, api_name: &str) -> Result<Option<ExistingDeployment>> {
        let path = format!("hosted/v1/deployments/{}", api_name);
        let response = http::send(
            self.api.get(&path).timeout(LOOKUP_TIMEOUT),
            "failed to look up existing deployment",
        )
        .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let existing: ExistingDeployment =
                    http::json(response, "invalid deployment record").await?;
                Ok(Some(existing))
            }
            _ => {
                let (status, body) = http::error_body(response).await;
                Err(DeployError::DeployRequest { status, body })
            }
        }
    }
}

#[async_trait]
impl UploadClient for HostedClient {
    async fn upload(&self, request: &UploadRequest<'_>, context: &BuildContext) -> Result<BuildRef> {
        let data = context.read_bytes().map_err(BuildError::Io)?;
        tracing::debug!(
            bytes = data.len(),
            image_tag = request.image_tag,
            "uploading build context"
        );

        let archive = Part::bytes(data)
            .file_name("context.tar.gz")
            .mime_str("application/gzip")
            .map_err(|e| DeployError::transport("invalid upload part", e))?;
        let form = Form::new()
            .part("context", archive)
            .text("api_name", request.api_name.to_string())
            .text("image_tag", request.image_tag.to_string());

        let response = http::send(
            self.api
                .post("hosted/v1/build")
                .multipart(form)
                .timeout(UPLOAD_TIMEOUT),
            "failed to upload build context",
        )
        .await?;

        if !response.status().is_success() {
            let (status, body) = http::error_body(response).await;
            return Err(DeployError::Upload { status, body });
        }

        let body: BuildResponse = http::json(response, "invalid build response").await?;
        Ok(BuildRef::Image {
            image_tag: body.image_tag,
            build_id: body.build_id,
        })
    }
}

#[async_trait]
impl DeployClient for HostedClient {
    async fn deploy(&self, params: &DeployParams<'_>) -> Result<DeploymentRecord> {
        let image_tag = match params.build {
            BuildRef::Image { image_tag, .. } => image_tag,
            BuildRef::Version(_) => {
                return Err(DeployError::Config(
                    "hosted protocol deploys built images, not code versions".to_string(),
                ));
            }
        };

        let payload =
            request::hosted_request(params.manifest, params.api_name, image_tag, params.existing);

        let response = http::send(
            self.api
                .post("hosted/v1/deploy")
                .json(&payload)
                .timeout(DEPLOY_TIMEOUT),
            "failed to send deploy request",
        )
        .await?;

        if !response.status().is_success() {
            let (status, body) = http::error_body(response).await;
            return Err(DeployError::DeployRequest { status, body });
        }

        let body: DeployResponse = http::json(response, "invalid deploy response").await?;
        Ok(DeploymentRecord {
            deployment_id: body.deployment_id,
            endpoint: body.endpoint,
            status: Status::Pending,
        })
    }
}

#[async_trait]
impl StatusClient for HostedClient {
    async fn status(&self, deployment_id: &str) -> Result<Status> {
        let path = format!("hosted/v1/deployments/{}/status", deployment_id);
        let response = http::send(
            self.api.get(&path).timeout(LOOKUP_TIMEOUT),
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
