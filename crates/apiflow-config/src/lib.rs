pub mod error;

pub use error::*;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// APIのデフォルトベースURL
pub const DEFAULT_API_URL: &str = "https://api.apiflow.dev";

/// デプロイ先
///
/// 明示的な設定からのみ決定され、推測はしない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployTarget {
    /// プラットフォームのマネージド基盤
    #[default]
    Hosted,
    /// ユーザー自身のクラウドアカウント (BYOA)
    SelfHosted,
}

impl FromStr for DeployTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "self-hosted" | "self_hosted" | "byoa" => Ok(Self::SelfHosted),
            _ => Err(ConfigError::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hosted => write!(f, "hosted"),
            Self::SelfHosted => write!(f, "self-hosted"),
        }
    }
}

/// バックエンドのプロトコル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// マニフェスト駆動 (/hosted/v1)
    #[default]
    Hosted,
    /// 旧来の storage / deployment API
    Legacy,
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hosted" | "manifest" => Ok(Self::Hosted),
            "legacy" => Ok(Self::Legacy),
            _ => Err(ConfigError::UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hosted => write!(f, "hosted"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// ~/.config/apiflow/config.yaml の内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub target: Option<String>,
    pub protocol: Option<String>,
    pub region: Option<String>,
}

/// CLIフラグから渡される上書き値
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub target: Option<DeployTarget>,
    pub protocol: Option<Protocol>,
    pub region: Option<String>,
}

/// 解決済みの設定
///
/// 優先順位: CLIフラグ > 環境変数 > 設定ファイル > デフォルト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub target: DeployTarget,
    pub protocol: Protocol,
    pub region: Option<String>,
}

impl Settings {
    /// 設定ファイル・環境変数・上書き値から設定を解決する
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let file = match config_file_path() {
            Some(path) => load_config_file(&path)?,
            None => ConfigFile::default(),
        };
        Self::merge(file, overrides)
    }

    fn merge(file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let api_url = overrides
            .api_url
            .or_else(|| env("APIFLOW_API_URL"))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let target = match overrides.target {
            Some(target) => target,
            None => env("APIFLOW_TARGET")
                .or(file.target)
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let protocol = match overrides.protocol {
            Some(protocol) => protocol,
            None => env("APIFLOW_PROTOCOL")
                .or(file.protocol)
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: env("APIFLOW_TOKEN").or(file.access_token),
            target,
            protocol,
            region: overrides
                .region
                .or_else(|| env("APIFLOW_REGION"))
                .or(file.region),
        })
    }

    /// アクセストークンを取得（未設定ならエラー）
    pub fn require_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or(ConfigError::MissingToken)
    }
}

/// apiflowの設定ディレクトリを取得（なければ作成）
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("apiflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// 設定ファイルのパス
///
/// 1. 環境変数 APIFLOW_CONFIG_PATH
/// 2. ~/.config/apiflow/config.yaml
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("APIFLOW_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("apiflow").join("config.yaml"))
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const CLEAN_ENV: [(&str, Option<&str>); 6] = [
        ("APIFLOW_API_URL", None),
        ("APIFLOW_TOKEN", None),
        ("APIFLOW_TARGET", None),
        ("APIFLOW_PROTOCOL", None),
        ("APIFLOW_REGION", None),
        ("APIFLOW_CONFIG_PATH", None),
    ];

    #[test]
    #[serial]
    fn test_defaults() {
        temp_env::with_vars(CLEAN_ENV, || {
            let settings = Settings::merge(ConfigFile::default(), Overrides::default()).unwrap();
            assert_eq!(settings.api_url, DEFAULT_API_URL);
            assert_eq!(settings.target, DeployTarget::Hosted);
            assert_eq!(settings.protocol, Protocol::Hosted);
            assert!(settings.access_token.is_none());
            assert!(matches!(
                settings.require_token(),
                Err(ConfigError::MissingToken)
            ));
        });
    }

    #[test]
    #[serial]
    fn test_file_values_used() {
        temp_env::with_vars(CLEAN_ENV, || {
            let file = ConfigFile {
                api_url: Some("https://file.example.com/".to_string()),
                access_token: Some("file-token".to_string()),
                target: Some("self-hosted".to_string()),
                protocol: Some("legacy".to_string()),
                region: Some("eu-west-1".to_string()),
            };
            let settings = Settings::merge(file, Overrides::default()).unwrap();
            assert_eq!(settings.api_url, "https://file.example.com");
            assert_eq!(settings.require_token().unwrap(), "file-token");
            assert_eq!(settings.target, DeployTarget::SelfHosted);
            assert_eq!(settings.protocol, Protocol::Legacy);
            assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let vars = [
            ("APIFLOW_API_URL", Some("https://env.example.com")),
            ("APIFLOW_TOKEN", Some("env-token")),
            ("APIFLOW_TARGET", Some("hosted")),
            ("APIFLOW_PROTOCOL", None),
            ("APIFLOW_REGION", None),
            ("APIFLOW_CONFIG_PATH", None),
        ];
        temp_env::with_vars(vars, || {
            let file = ConfigFile {
                api_url: Some("https://file.example.com".to_string()),
                access_token: Some("file-token".to_string()),
                target: Some("self-hosted".to_string()),
                ..Default::default()
            };
            let settings = Settings::merge(file, Overrides::default()).unwrap();
            assert_eq!(settings.api_url, "https://env.example.com");
            assert_eq!(settings.access_token.as_deref(), Some("env-token"));
            assert_eq!(settings.target, DeployTarget::Hosted);
        });
    }

    #[test]
    #[serial]
    fn test_flags_override_env() {
        let vars = [
            ("APIFLOW_API_URL", Some("https://env.example.com")),
            ("APIFLOW_TOKEN", None),
            ("APIFLOW_TARGET", Some("hosted")),
            ("APIFLOW_PROTOCOL", Some("hosted")),
            ("APIFLOW_REGION", None),
            ("APIFLOW_CONFIG_PATH", None),
        ];
        temp_env::with_vars(vars, || {
            let overrides = Overrides {
                api_url: Some("http://127.0.0.1:9000".to_string()),
                target: Some(DeployTarget::SelfHosted),
                protocol: Some(Protocol::Legacy),
                region: Some("us-east-1".to_string()),
            };
            let settings = Settings::merge(ConfigFile::default(), overrides).unwrap();
            assert_eq!(settings.api_url, "http://127.0.0.1:9000");
            assert_eq!(settings.target, DeployTarget::SelfHosted);
            assert_eq!(settings.protocol, Protocol::Legacy);
            assert_eq!(settings.region.as_deref(), Some("us-east-1"));
        });
    }

    #[test]
    #[serial]
    fn test_unknown_target_is_error() {
        let vars = [("APIFLOW_TARGET", Some("mainframe"))];
        temp_env::with_vars(vars, || {
            let result = Settings::merge(ConfigFile::default(), Overrides::default());
            assert!(matches!(result, Err(ConfigError::UnknownTarget(_))));
        });
    }

    #[test]
    #[serial]
    fn test_resolve_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "api_url: https://yaml.example.com\naccess_token: yaml-token\n",
        )
        .unwrap();

        let vars = [
            ("APIFLOW_API_URL", None),
            ("APIFLOW_TOKEN", None),
            ("APIFLOW_TARGET", None),
            ("APIFLOW_PROTOCOL", None),
            ("APIFLOW_REGION", None),
            ("APIFLOW_CONFIG_PATH", Some(path.to_str().unwrap())),
        ];
        temp_env::with_vars(vars, || {
            let settings = Settings::resolve(Overrides::default()).unwrap();
            assert_eq!(settings.api_url, "https://yaml.example.com");
            assert_eq!(settings.access_token.as_deref(), Some("yaml-token"));
        });
    }

    #[test]
    #[serial]
    fn test_resolve_broken_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api_url: [unterminated\n").unwrap();

        temp_env::with_var("APIFLOW_CONFIG_PATH", Some(path.to_str().unwrap()), || {
            let result = Settings::resolve(Overrides::default());
            assert!(matches!(result, Err(ConfigError::Parse { .. })));
        });
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("BYOA".parse::<DeployTarget>().unwrap(), DeployTarget::SelfHosted);
        assert_eq!("legacy".parse::<Protocol>().unwrap(), Protocol::Legacy);
        assert_eq!(DeployTarget::SelfHosted.to_string(), "self-hosted");
        assert!("ftp".parse::<Protocol>().is_err());
    }
}
