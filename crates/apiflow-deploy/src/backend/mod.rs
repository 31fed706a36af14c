//! リモートバックエンドとの通信
//!
//! プロトコル（legacy / hosted）ごとに4つの能力を実装し、[`Backend`] に
//! まとめてパイプラインへ渡す。どのプロトコルを使うかは構築時に一度だけ決まる。

pub mod hosted;
mod http;
pub mod legacy;

use crate::error::Result;
use crate::model::{BuildRef, DeploymentRecord, ExistingDeployment, Status};
use apiflow_build::{BuildContext, ExclusionRules};
use apiflow_config::Protocol;
use apiflow_core::Manifest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use hosted::HostedClient;
pub use legacy::LegacyClient;

/// 既存デプロイの検索・ステータス取得
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);
/// デプロイ要求
pub const DEPLOY_TIMEOUT: Duration = Duration::from_secs(60);
/// アップロード/ビルド（大きなアーカイブとリモートビルドを待つ）
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// アップロードに付けるメタデータ
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub api_name: &'a str,
    pub runtime: &'a str,
    /// hosted のみ使用
    pub image_tag: &'a str,
}

/// デプロイ要求の入力
#[derive(Debug, Clone)]
pub struct DeployParams<'a> {
    pub api_name: &'a str,
    pub manifest: &'a Manifest,
    pub build: &'a BuildRef,
    /// 更新の場合は既存デプロイ
    pub existing: Option<&'a ExistingDeployment>,
    /// legacy のみ使用
    pub replicas: u32,
}

#[async_trait]
pub trait DeploymentLookup: Send + Sync {
    /// 名前でデプロイを探す（存在しなければ None）
    async fn find(&self, api_name: &str) -> Result<Option<ExistingDeployment>>;
}

#[async_trait]
pub trait UploadClient: Send + Sync {
    /// アーカイブを送信し、ビルド参照を返す
    async fn upload(&self, request: &UploadRequest<'_>, context: &BuildContext) -> Result<BuildRef>;
}

#[async_trait]
pub trait DeployClient: Send + Sync {
    /// デプロイを作成または更新する
    async fn deploy(&self, params: &DeployParams<'_>) -> Result<DeploymentRecord>;
}

#[async_trait]
pub trait StatusClient: Send + Sync {
    /// 現在のステータスを1回取得する
    async fn status(&self, deployment_id: &str) -> Result<Status>;
}

/// プロトコルごとのアダプタ一式
#[derive(Clone)]
pub struct Backend {
    pub protocol: Protocol,
    /// パッケージ時の除外ルール
    pub exclusions: ExclusionRules,
    pub lookup: Arc<dyn DeploymentLookup>,
    pub uploader: Arc<dyn UploadClient>,
    pub deployer: Arc<dyn DeployClient>,
    pub status: Arc<dyn StatusClient>,
}

impl Backend {
    /// 4つの能力をすべて実装したクライアントから構築する
    pub fn from_client<C>(protocol: Protocol, client: Arc<C>) -> Self
    where
        C: DeploymentLookup + UploadClient + DeployClient + StatusClient + 'static,
    {
        let exclusions = match protocol {
            Protocol::Legacy => ExclusionRules::legacy(),
            Protocol::Hosted => ExclusionRules::hosted(),
        };
        Self {
            protocol,
            exclusions,
            lookup: client.clone(),
            uploader: client.clone(),
            deployer: client.clone(),
            status: client,
        }
    }

    /// プロトコルに対応するHTTPバックエンドを構築する
    pub fn for_protocol(protocol: Protocol, base_url: &str, token: &str) -> Result<Self> {
        let backend = match protocol {
            Protocol::Legacy => {
                Self::from_client(protocol, Arc::new(LegacyClient::new(base_url, token)?))
            }
            Protocol::Hosted => {
                Self::from_client(protocol, Arc::new(HostedClient::new(base_url, token)?))
            }
        };
        tracing::debug!(protocol = %protocol, base_url, "backend selected");
        Ok(backend)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("protocol", &self.protocol)
            .field("exclusions", &self.exclusions)
            .finish_non_exhaustive()
    }
}
