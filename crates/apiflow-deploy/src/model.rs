//! パイプラインのデータモデル

use apiflow_config::DeployTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// リモートが報告するデプロイステータス
///
/// 未知の文字列は `Unknown` として保持し、非終端として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Pending,
    Building,
    Deploying,
    Ready,
    Running,
    Failed,
    Unknown(String),
}

impl Status {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pending" => Status::Pending,
            "building" => Status::Building,
            "deploying" => Status::Deploying,
            "ready" => Status::Ready,
            "running" => Status::Running,
            "failed" => Status::Failed,
            _ => Status::Unknown(value.to_string()),
        }
    }

    /// ready / running
    pub fn is_live(&self) -> bool {
        matches!(self, Status::Ready | Status::Running)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Building => write!(f, "building"),
            Status::Deploying => write!(f, "deploying"),
            Status::Ready => write!(f, "ready"),
            Status::Running => write!(f, "running"),
            Status::Failed => write!(f, "failed"),
            Status::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// アップロード/ビルドの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRef {
    /// legacy: アップロード済みコードのバージョン
    Version(String),
    /// hosted: ビルド済みイメージ
    Image { image_tag: String, build_id: String },
}

/// デプロイ要求の結果とその後のステータス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub deployment_id: String,
    pub endpoint: String,
    pub status: Status,
}

/// 同名で既に存在するデプロイ
///
/// 更新は同じIDに対して行うため、IDのないレコードは受け付けない。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingDeployment {
    #[serde(alias = "id")]
    pub deployment_id: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployAction {
    Create,
    Update,
}

impl fmt::Display for DeployAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployAction::Create => write!(f, "create"),
            DeployAction::Update => write!(f, "update"),
        }
    }
}

/// パイプラインへ明示的に渡す実行オプション
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// API名（未指定ならマニフェストの name）
    pub api_name: Option<String>,
    /// legacy: アップロード済みバージョンをデプロイ（パッケージ・アップロードを省略）
    pub version: Option<String>,
    /// legacy: レプリカ数
    pub replicas: u32,
    /// hosted: イメージタグ（未指定なら `{name}:{unixtime}`）
    pub image_tag: Option<String>,
    /// self-hosted: リージョン
    pub region: Option<String>,
    /// 確認プロンプトをすべて省略 (--yes)
    pub yes: bool,
    /// 既存デプロイの上書き確認を省略 (--force)
    pub force: bool,
    /// 進捗表示を出さない（JSON出力モード）
    pub quiet: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            api_name: None,
            version: None,
            replicas: 1,
            image_tag: None,
            region: None,
            yes: false,
            force: false,
            quiet: false,
        }
    }
}

impl DeployOptions {
    pub fn skip_prompts(&self) -> bool {
        self.yes || self.force
    }
}

/// デプロイ成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub api_name: String,
    pub record: DeploymentRecord,
    pub target: DeployTarget,
    pub action: DeployAction,
    /// self-hosted: クラウドアカウント
    pub account: Option<String>,
    /// self-hosted: リージョン
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed(DeploySummary),
    /// ユーザーが確認を拒否した
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("running"), Status::Running);
        assert_eq!(Status::parse("READY"), Status::Ready);
        assert_eq!(
            Status::parse("scaling"),
            Status::Unknown("scaling".to_string())
        );
        assert!(Status::parse("ready").is_live());
        assert!(!Status::parse("deploying").is_live());
        assert!(Status::parse("failed").is_failed());
        assert_eq!(Status::Unknown("scaling".to_string()).to_string(), "scaling");
    }

    #[test]
    fn test_existing_deployment_accepts_id_alias() {
        let existing: ExistingDeployment =
            serde_json::from_str(r#"{"id": "dep-9", "status": "running"}"#).unwrap();
        assert_eq!(existing.deployment_id, "dep-9");
        assert!(existing.endpoint.is_none());
    }

    #[test]
    fn test_existing_deployment_requires_id() {
        let result = serde_json::from_str::<ExistingDeployment>(r#"{"status": "running"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_skip_prompts() {
        let options = DeployOptions::default();
        assert!(!options.skip_prompts());
        assert!(
            DeployOptions {
                force: true,
                ..Default::default()
            }
            .skip_prompts()
        );
    }
}
