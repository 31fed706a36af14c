use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "アクセストークンが設定されていません。以下のいずれかで指定してください:\n\
        - 環境変数 APIFLOW_TOKEN\n\
        - ~/.config/apiflow/config.yaml の access_token"
    )]
    MissingToken,

    #[error("不明なデプロイターゲット: {0} (hosted, self-hosted のいずれか)")]
    UnknownTarget(String),

    #[error("不明なプロトコル: {0} (hosted, legacy のいずれか)")]
    UnknownProtocol(String),

    #[error("設定ファイルのパースに失敗しました: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
