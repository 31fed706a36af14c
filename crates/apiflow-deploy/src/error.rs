use apiflow_build::BuildError;
use apiflow_cloud::CloudError;
use apiflow_config::ConfigError;
use apiflow_core::ManifestError;
use thiserror::Error;

/// デプロイパイプラインのエラー
///
/// どのエラーも致命的で、CLIの境界まで伝播する。自動リトライは
/// ステータスポーリングの非終端ステータスに対してのみ行う。
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid manifest: {0}")]
    ManifestValidation(String),

    #[error("Failed to package project: {0}")]
    Archive(#[from] BuildError),

    #[error("Upload failed (HTTP {status}): {body}")]
    Upload { status: u16, body: String },

    #[error("Deploy request failed (HTTP {status}): {body}")]
    DeployRequest { status: u16, body: String },

    #[error("Deployment did not become ready after {attempts} status checks (last status: {last_status})")]
    PollTimeout { attempts: u32, last_status: String },

    #[error("Deployment {deployment_id} failed on the remote service")]
    RemoteFailed { deployment_id: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Self-hosted {phase} failed: {source}")]
    SelfHosted {
        phase: &'static str,
        #[source]
        source: CloudError,
    },
}

impl DeployError {
    /// 機械可読出力用の安定したエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            DeployError::Config(_) => "ConfigError",
            DeployError::ManifestValidation(_) => "ManifestValidationError",
            DeployError::Archive(_) => "ArchiveError",
            DeployError::Upload { .. } => "UploadError",
            DeployError::DeployRequest { .. } => "DeployRequestError",
            DeployError::PollTimeout { .. } => "PollTimeoutError",
            DeployError::RemoteFailed { .. } => "RemoteFailedError",
            DeployError::Transport { .. } => "TransportError",
            DeployError::SelfHosted { .. } => "SelfHostedError",
        }
    }

    /// ユーザー向けの対処方法
    pub fn hint(&self) -> Option<String> {
        match self {
            DeployError::Config(_) => {
                Some("apiflow の設定（APIFLOW_TOKEN など）を確認してください".to_string())
            }
            DeployError::ManifestValidation(_) => {
                Some("apiflow validate でマニフェストを確認してください".to_string())
            }
            DeployError::Archive(e) => Some(e.user_message()),
            DeployError::PollTimeout { .. } => Some(
                "デプロイはリモートで継続している可能性があります。apiflow status で確認してください"
                    .to_string(),
            ),
            DeployError::RemoteFailed { .. } => {
                Some("apiflow logs でビルド・起動ログを確認してください".to_string())
            }
            DeployError::Transport { .. } => {
                Some("ネットワーク接続と APIFLOW_API_URL を確認してください".to_string())
            }
            DeployError::SelfHosted { source, .. } => match source {
                CloudError::ToolNotFound { hint, .. } => Some(format!("インストール: {}", hint)),
                CloudError::AuthenticationFailed(_) => {
                    Some("aws configure / aws sso login で認証してください".to_string())
                }
                _ => None,
            },
            DeployError::Upload { .. } | DeployError::DeployRequest { .. } => None,
        }
    }

    pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        DeployError::Transport {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn self_hosted(phase: &'static str) -> impl FnOnce(CloudError) -> Self {
        move |source| DeployError::SelfHosted { phase, source }
    }
}

impl From<ConfigError> for DeployError {
    fn from(err: ConfigError) -> Self {
        DeployError::Config(err.to_string())
    }
}

impl From<ManifestError> for DeployError {
    fn from(err: ManifestError) -> Self {
        DeployError::ManifestValidation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let timeout = DeployError::PollTimeout {
            attempts: 60,
            last_status: "deploying".to_string(),
        };
        let failed = DeployError::RemoteFailed {
            deployment_id: "dep-1".to_string(),
        };
        assert_eq!(timeout.kind(), "PollTimeoutError");
        assert_eq!(failed.kind(), "RemoteFailedError");
        assert!(timeout.to_string().contains("60"));
    }

    #[test]
    fn test_remote_body_is_verbatim() {
        let err = DeployError::Upload {
            status: 500,
            body: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "Upload failed (HTTP 500): disk full");
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_manifest_hint() {
        let err = DeployError::ManifestValidation("port must not be 0".to_string());
        assert!(err.hint().unwrap().contains("apiflow validate"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DeployError = ConfigError::MissingToken.into();
        assert_eq!(err.kind(), "ConfigError");
    }
}
