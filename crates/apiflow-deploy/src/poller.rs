//! ステータスポーリング
//!
//! リモートのステータス文字列を3つの結果に分類する:
//! - ready / running → 成功
//! - failed → 即座に失敗（リトライしない）
//! - それ以外（未知の値を含む）→ 待って再試行
//!
//! 固定間隔・固定回数で、バックオフやジッターはない。上限に達した場合は
//! リモートの失敗とは区別された `PollTimeout` になる。通信エラーは即座に致命的。

use crate::backend::StatusClient;
use crate::error::{DeployError, Result};
use crate::model::Status;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// 5秒間隔 × 60回（約5分）
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// デプロイが終端ステータスになるまで待つ
///
/// `on_status` は各試行の後に `(試行番号, ステータス)` で呼ばれる。
/// 最後の試行の後はスリープしない。
pub async fn wait_until_live<F>(
    client: &dyn StatusClient,
    deployment_id: &str,
    policy: &PollPolicy,
    mut on_status: F,
) -> Result<Status>
where
    F: FnMut(u32, &Status),
{
    let mut last = Status::Pending;

    for attempt in 1..=policy.max_attempts {
        let status = client.status(deployment_id).await?;
        tracing::debug!(deployment_id, attempt, status = %status, "polled deployment status");
        on_status(attempt, &status);

        if status.is_live() {
            return Ok(status);
        }
        if status.is_failed() {
            return Err(DeployError::RemoteFailed {
                deployment_id: deployment_id.to_string(),
            });
        }

        last = status;
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(DeployError::PollTimeout {
        attempts: policy.max_attempts,
        last_status: last.to_string(),
    })
}
