//! デプロイ先の選択
//!
//! 明示的な設定からのみ決まり、ネットワーク呼び出しの前に一度だけ選ぶ。

use crate::backend::Backend;
use crate::error::Result;
use apiflow_cloud::Orchestrator;
use apiflow_config::{DeployTarget, Settings};
use std::sync::Arc;

pub enum Target {
    /// プラットフォームのビルド/デプロイサービス（legacy または hosted プロトコル）
    Hosted(Backend),
    /// ユーザーのクラウドアカウント（外部オーケストレーターに委譲）
    SelfHosted(Arc<dyn Orchestrator>),
}

impl Target {
    /// 設定からデプロイ先を構築する
    ///
    /// hosted ではアクセストークンが必須。self-hosted のオーケストレーターは
    /// 選ばれた場合にだけ `self_hosted` で生成する。
    pub fn select<F>(settings: &Settings, self_hosted: F) -> Result<Self>
    where
        F: FnOnce() -> Arc<dyn Orchestrator>,
    {
        match settings.target {
            DeployTarget::Hosted => {
                let token = settings.require_token()?;
                let backend = Backend::for_protocol(settings.protocol, &settings.api_url, token)?;
                Ok(Target::Hosted(backend))
            }
            DeployTarget::SelfHosted => Ok(Target::SelfHosted(self_hosted())),
        }
    }

    pub fn kind(&self) -> DeployTarget {
        match self {
            Target::Hosted(_) => DeployTarget::Hosted,
            Target::SelfHosted(_) => DeployTarget::SelfHosted,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Hosted(backend) => f.debug_tuple("Hosted").field(backend).finish(),
            Target::SelfHosted(orchestrator) => {
                f.debug_tuple("SelfHosted").field(&orchestrator.name()).finish()
            }
        }
    }
}
