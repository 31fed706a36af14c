use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("マニフェストの読み込みに失敗しました: {path}\n理由: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("マニフェストのパースに失敗しました: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("マニフェストが見つかりません\n探索位置: {0}\nヒント: apiflow.yaml を含むディレクトリで実行してください")]
    NotFound(PathBuf),

    #[error("マニフェストが不正です: {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ManifestError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;
