//! マニフェストの発見・読み込み・検証

use crate::error::{ManifestError, Result};
use crate::model::Manifest;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// プロジェクトディレクトリ内で探索するマニフェストのファイル名（優先順）
pub const MANIFEST_CANDIDATES: [&str; 3] = ["apiflow.yaml", "apiflow.yml", ".apiflow/apiflow.yaml"];

/// マニフェストファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 APIFLOW_MANIFEST (直接パス指定)
/// 2. プロジェクトディレクトリ: apiflow.yaml, apiflow.yml, .apiflow/apiflow.yaml
pub fn find_manifest(project_dir: &Path) -> Result<PathBuf> {
    if let Ok(path) = std::env::var("APIFLOW_MANIFEST") {
        let path = PathBuf::from(path);
        debug!(path = %path.display(), "Checking APIFLOW_MANIFEST");
        if path.exists() {
            return Ok(path);
        }
    }

    for candidate in MANIFEST_CANDIDATES {
        let path = project_dir.join(candidate);
        if path.exists() {
            info!(manifest = %path.display(), "Found manifest");
            return Ok(path);
        }
    }

    Err(ManifestError::NotFound(project_dir.to_path_buf()))
}

/// マニフェストを読み込んで検証する
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content)
}

/// YAML文字列からマニフェストをパースして検証する
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(content)?;
    validate(&manifest)?;
    Ok(manifest)
}

/// API名を検証する
///
/// API名はURLパスとローカルの作業ディレクトリ名にそのまま使われるため、
/// 英小文字・数字・`-`・`_` のみを許可する。
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ManifestError::invalid("name", "空にはできません"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ManifestError::invalid(
            "name",
            format!("'{}' には英小文字・数字・'-'・'_' のみ使用できます", name),
        ));
    }
    Ok(())
}

fn validate(manifest: &Manifest) -> Result<()> {
    validate_name(&manifest.name)?;
    if manifest.runtime.trim().is_empty() {
        return Err(ManifestError::invalid("runtime", "空にはできません"));
    }
    if manifest.start_command.trim().is_empty() {
        return Err(ManifestError::invalid("start_command", "空にはできません"));
    }
    if manifest.port == 0 {
        return Err(ManifestError::invalid("port", "0 は使用できません"));
    }
    for endpoint in &manifest.endpoints {
        if !endpoint.starts_with('/') {
            return Err(ManifestError::invalid(
                "endpoints",
                format!("'{}' は '/' で始まる必要があります", endpoint),
            ));
        }
    }
    if let Some(scaling) = &manifest.scaling {
        if scaling.min_replicas == 0 {
            return Err(ManifestError::invalid(
                "scaling.min_replicas",
                "1 以上を指定してください",
            ));
        }
        if scaling.min_replicas > scaling.max_replicas {
            return Err(ManifestError::invalid(
                "scaling",
                "min_replicas は max_replicas 以下にしてください",
            ));
        }
        if scaling.target_cpu == 0 || scaling.target_cpu > 100 {
            return Err(ManifestError::invalid(
                "scaling.target_cpu",
                "1〜100 の範囲で指定してください",
            ));
        }
    }
    Ok(())
}
