//! マニフェスト定義

use super::environment::Environment;
use super::scaling::{Resources, Scaling};
use serde::{Deserialize, Serialize};

/// マニフェスト - APIプロジェクトのデプロイ記述子
///
/// YAML形式：
/// ```yaml
/// name: weather-api
/// runtime: python3.11
/// start_command: uvicorn main:app --host 0.0.0.0 --port 8000
/// port: 8000
/// endpoints: ["/forecast"]
/// health_check: /health
/// environment:
///   required: [WEATHER_KEY]
/// scaling:
///   min_replicas: 1
///   max_replicas: 3
///   target_cpu: 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// API名（アカウント内で一意）
    pub name: String,
    /// ランタイム識別子 (python3.11, node20 など)
    pub runtime: String,
    /// 起動コマンド
    pub start_command: String,
    /// 待ち受けポート
    pub port: u16,
    /// ファイル参照
    #[serde(default)]
    pub files: ManifestFiles,
    /// 公開エンドポイントのパス
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// ヘルスチェックのパス
    #[serde(default)]
    pub health_check: Option<String>,
    /// 環境変数の宣言
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub scaling: Option<Scaling>,
    #[serde(default)]
    pub resources: Option<Resources>,
}

/// マニフェストから参照されるファイル
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFiles {
    /// エントリーポイント (main.py など)
    #[serde(default)]
    pub entrypoint: Option<String>,
    /// 依存定義ファイル (requirements.txt など)
    #[serde(default)]
    pub requirements: Option<String>,
    /// アーカイブから追加で除外するファイル名パターン
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Manifest {
    /// スモークテストに使うヘルスチェックパス（未指定時は "/"）
    pub fn health_check_path(&self) -> String {
        match self.health_check.as_deref() {
            None | Some("") => "/".to_string(),
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{}", path),
        }
    }

    #[doc(hidden)]
    pub fn for_tests(name: &str) -> Self {
        Self {
            name: name.to_string(),
            runtime: "python3.11".to_string(),
            start_command: "python main.py".to_string(),
            port: 8000,
            files: ManifestFiles::default(),
            endpoints: Vec::new(),
            health_check: Some("/health".to_string()),
            environment: Environment::default(),
            scaling: None,
            resources: None,
        }
    }
}
