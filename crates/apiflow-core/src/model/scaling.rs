//! スケーリングとリソース設定

use serde::{Deserialize, Serialize};

/// オートスケーリング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scaling {
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// スケールアウトの目標CPU使用率（%）
    pub target_cpu: u32,
}

/// コンテナあたりのリソース設定（Kubernetes形式の数量文字列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// 例: "512Mi"
    pub memory: String,
    /// 例: "250m"
    pub cpu: String,
}
