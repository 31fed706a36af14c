use crate::error::{BuildError, BuildResult};
use crate::exclude::ExclusionRules;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tar::Builder;
use tempfile::NamedTempFile;

/// パッケージ済みのビルドコンテキスト
///
/// プロセスローカルな一時ファイルとして保持され、drop 時に削除される。
/// 1回のデプロイ実行だけが所有し、再利用・キャッシュはしない。
#[derive(Debug)]
pub struct BuildContext {
    file: NamedTempFile,
    size: u64,
    entries: usize,
}

impl BuildContext {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// 圧縮後のサイズ（バイト）
    pub fn size(&self) -> u64 {
        self.size
    }

    /// アーカイブに含まれる通常ファイルの数
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// アーカイブ全体を読み込む（アップロード用）
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.size as usize);
        self.file.reopen()?.read_to_end(&mut data)?;
        Ok(data)
    }
}

pub struct ContextBuilder;

impl ContextBuilder {
    /// プロジェクトディレクトリをtar.gzアーカイブとして作成
    ///
    /// 除外ルールはヘッダーを書く前に評価されるため、除外対象は
    /// アーカイブに一切含まれない。除外されたディレクトリは走査しない。
    pub fn create_context(root: &Path, rules: &ExclusionRules) -> BuildResult<BuildContext> {
        if !root.is_dir() {
            return Err(BuildError::ContextNotFound(root.to_path_buf()));
        }

        tracing::debug!("Creating build context from: {}", root.display());

        let file = tempfile::Builder::new()
            .prefix("apiflow-context-")
            .suffix(".tar.gz")
            .tempfile()?;

        // 途中で失敗した場合は `file` が drop されて一時ファイルも消える
        let entries = {
            let encoder = GzEncoder::new(file.as_file(), Compression::default());
            let mut tar = Builder::new(encoder);
            tar.follow_symlinks(false);

            let mut entries = 0;
            append_tree(&mut tar, root, root, rules, &mut entries)?;

            let mut encoder = tar.into_inner()?;
            encoder.flush()?;
            encoder.finish()?;
            entries
        };

        let size = file.as_file().metadata()?.len();
        tracing::debug!(
            "Build context created: {} files, {} bytes at {}",
            entries,
            size,
            file.path().display()
        );

        Self::check_context_size(size);

        Ok(BuildContext {
            file,
            size,
            entries,
        })
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: u64) {
        const MAX_CONTEXT_SIZE: u64 = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 マニフェストの files.exclude で不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

fn append_tree<W: Write>(
    tar: &mut Builder<W>,
    root: &Path,
    dir: &Path,
    rules: &ExclusionRules,
    entries: &mut usize,
) -> BuildResult<()> {
    let mut children = fs::read_dir(dir)
        .and_then(|iter| iter.collect::<io::Result<Vec<_>>>())
        .map_err(|source| archive_error(dir, source))?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let relative = relative_name(root, &path);

        if rules.is_excluded(&relative) {
            tracing::trace!("excluded: {}", relative);
            continue;
        }

        let file_type = child
            .file_type()
            .map_err(|source| archive_error(&path, source))?;

        if file_type.is_dir() {
            tar.append_dir(&relative, &path)
                .map_err(|source| archive_error(&path, source))?;
            append_tree(tar, root, &path, rules, entries)?;
        } else {
            tar.append_path_with_name(&path, &relative)
                .map_err(|source| archive_error(&path, source))?;
            if file_type.is_file() {
                *entries += 1;
            }
        }
    }

    Ok(())
}

/// ルートからの相対パス（区切りは常に `/`）
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_error(path: &Path, source: io::Error) -> BuildError {
    BuildError::Archive {
        path: PathBuf::from(path),
        source,
    }
}
