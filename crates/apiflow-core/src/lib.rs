//! apiflow コア
//!
//! APIプロジェクトのマニフェスト (`apiflow.yaml`) のデータモデルと、
//! その読み込み・検証を提供します。デプロイパイプラインはこのクレートの
//! [`Manifest`] を読み取り専用で利用します。

pub mod error;
pub mod loader;
pub mod model;

pub use error::{ManifestError, Result};
pub use loader::{
    MANIFEST_CANDIDATES, find_manifest, load_manifest, parse_manifest, validate_name,
};
pub use model::*;
