//! モデル定義
//!
//! マニフェストを構成するデータモデルを定義します。

mod environment;
mod manifest;
mod scaling;

// Re-exports
pub use environment::*;
pub use manifest::*;
pub use scaling::*;
