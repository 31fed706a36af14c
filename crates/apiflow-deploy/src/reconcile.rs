//! 既存デプロイの検出と create / update の決定

use crate::backend::DeploymentLookup;
use crate::error::Result;
use crate::model::ExistingDeployment;
use crate::prompt::Prompter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// 新規作成
    Create,
    /// 既存デプロイを同じIDで更新
    Update(ExistingDeployment),
    /// ユーザーが更新を拒否した（以降の変更操作は行わない）
    Abort,
}

/// 名前でデプロイを探し、作成か更新かを決める
///
/// 既存デプロイがあり `force` でなければ、変更操作の前に確認を取る。
pub async fn reconcile(
    lookup: &dyn DeploymentLookup,
    api_name: &str,
    force: bool,
    prompter: &dyn Prompter,
) -> Result<Reconciliation> {
    let Some(existing) = lookup.find(api_name).await? else {
        tracing::debug!(api_name, "no existing deployment");
        return Ok(Reconciliation::Create);
    };

    tracing::info!(
        api_name,
        status = existing.status.as_deref().unwrap_or("unknown"),
        "existing deployment found"
    );

    if force {
        return Ok(Reconciliation::Update(existing));
    }

    let message = format!(
        "'{}' は既にデプロイされています（ステータス: {}）。更新しますか？",
        api_name,
        existing.status.as_deref().unwrap_or("不明")
    );
    if prompter.confirm(&message) {
        Ok(Reconciliation::Update(existing))
    } else {
        Ok(Reconciliation::Abort)
    }
}
