//! apiflow deploy pipeline
//!
//! プロジェクトをパッケージし、リモートのビルド/デプロイサービスへ送り、
//! デプロイが稼働するか失敗するまで追跡する。
//!
//! ```text
//! reconcile → package → upload → deploy → poll → report
//! ```
//!
//! - [`backend`] - プロトコルごとのHTTPクライアント（legacy / hosted）
//! - [`reconcile`] - 既存デプロイの検出と create / update の決定
//! - [`poller`] - 終端ステータスまでのポーリング
//! - [`pipeline`] - 上記を順に実行するパイプライン本体
//! - [`report`] - 結果の表示（人間向け / JSON）
//!
//! セルフホスト（BYOA）の場合は [`apiflow_cloud::Orchestrator`] に委譲する。

pub mod backend;
mod console;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod poller;
pub mod prompt;
pub mod reconcile;
pub mod report;
pub mod request;
mod selfhosted;
pub mod target;

pub use backend::{
    Backend, DeployClient, DeployParams, DeploymentLookup, StatusClient, UploadClient,
    UploadRequest, hosted::HostedClient, legacy::LegacyClient,
};
pub use error::{DeployError, Result};
pub use model::{
    BuildRef, DeployAction, DeployOptions, DeployOutcome, DeploySummary, DeploymentRecord,
    ExistingDeployment, Status,
};
pub use pipeline::Pipeline;
pub use poller::{PollPolicy, wait_until_live};
pub use prompt::{Prompter, StdinPrompter};
pub use reconcile::{Reconciliation, reconcile};
pub use target::Target;
