//! セルフホスト（BYOA）デプロイ
//!
//! リソースのプロビジョニングはオーケストレーターに任せ、ここでは
//! pre-flight → Prepare → Plan → 確認 → Deploy の順序付けだけを行う。
//! Prepare が成功した後は、結果にかかわらず必ず Cleanup を呼ぶ。
//!
//! 既存デプロイの照合は Terraform の state が担う。Plan が既存リソースに
//! 触れる場合は更新として確認を求め、`--yes` / `--force` でのみ省略できる。

use crate::console::Console;
use crate::error::{DeployError, Result};
use crate::model::{DeployAction, DeployOptions, DeployOutcome, DeploySummary, DeploymentRecord, Status};
use crate::prompt::Prompter;
use crate::request;
use apiflow_cloud::{ActionType, Orchestrator, PreparedDeployment, SelfHostedDeployment};
use apiflow_config::DeployTarget;
use apiflow_core::Manifest;
use colored::Colorize;
use std::path::Path;

const STEPS: usize = 4;

pub(crate) async fn run(
    orchestrator: &dyn Orchestrator,
    prompter: &dyn Prompter,
    options: &DeployOptions,
    console: &Console,
    manifest: &Manifest,
    api_name: &str,
    project_dir: &Path,
) -> Result<DeployOutcome> {
    // 1. 事前チェック（Prepare より前に失敗させる）
    console.step(1, STEPS, "事前チェック中...");
    let report = orchestrator
        .preflight()
        .await
        .map_err(DeployError::self_hosted("preflight"))?;
    if !report.is_ready() {
        return Err(DeployError::Config(format!(
            "self-hosted deploy is not ready: {}",
            report.problems().join("; ")
        )));
    }
    if let Some(account) = &report.credentials.account_info {
        console.say(format!("  ✓ 認証済み: {}", account));
    }

    // 2. Prepare
    console.step(2, STEPS, "デプロイを準備中...");
    let spec = request::deploy_spec(manifest, api_name, options.region.clone(), project_dir);
    let prepared = orchestrator
        .prepare(&spec)
        .await
        .map_err(DeployError::self_hosted("prepare"))?;

    let result = plan_and_deploy(orchestrator, prompter, options, console, &prepared).await;

    if let Err(e) = orchestrator.cleanup(&prepared).await {
        tracing::warn!("failed to clean up staged files: {}", e);
    }

    let Some((deployment, action)) = result? else {
        console.say("デプロイをキャンセルしました".yellow().to_string());
        return Ok(DeployOutcome::Cancelled);
    };

    Ok(DeployOutcome::Deployed(DeploySummary {
        api_name: api_name.to_string(),
        record: DeploymentRecord {
            endpoint: deployment.endpoint(),
            deployment_id: deployment.deployment_id,
            status: Status::Ready,
        },
        target: DeployTarget::SelfHosted,
        action,
        account: Some(deployment.account),
        region: Some(deployment.region),
    }))
}

/// Plan → 確認 → Deploy。確認を拒否した場合は None
async fn plan_and_deploy(
    orchestrator: &dyn Orchestrator,
    prompter: &dyn Prompter,
    options: &DeployOptions,
    console: &Console,
    prepared: &PreparedDeployment,
) -> Result<Option<(SelfHostedDeployment, DeployAction)>> {
    // 3. Plan
    console.step(3, STEPS, "変更内容を計算中...");
    let plan = orchestrator
        .plan(prepared)
        .await
        .map_err(DeployError::self_hosted("plan"))?;

    console.say(format!("  {}", plan.plan.summary()));
    for action in plan
        .plan
        .actions
        .iter()
        .filter(|a| a.action_type != ActionType::NoOp)
    {
        console.say(format!("    {} {}", action.action_type, action.id.cyan()));
    }
    console.say(format!("  推定コスト: {}", plan.cost.to_string().yellow()));

    let existing = plan.plan.touches_existing();
    if existing {
        console.say(format!(
            "  {} 既存のデプロイ '{}' を更新します",
            "⚠".yellow(),
            prepared.name
        ));
    }

    if !options.skip_prompts() {
        let message = if existing {
            format!(
                "既存のデプロイ '{}' を更新します。推定コスト {} でデプロイしますか？",
                prepared.name, plan.cost
            )
        } else {
            format!("推定コスト {} でデプロイしますか？", plan.cost)
        };
        if !prompter.confirm(&message) {
            return Ok(None);
        }
    }

    // 4. Deploy
    console.step(4, STEPS, "デプロイ中...");
    let spinner = console.spinner("インフラを適用中...");
    let result = orchestrator.deploy(&plan).await;
    match &result {
        Ok(_) => spinner.finish_success(),
        Err(e) => spinner.finish_error(&e.to_string()),
    }
    let deployment = result.map_err(DeployError::self_hosted("deploy"))?;

    let action = if plan.plan.actions_by_type(ActionType::Create).is_empty() {
        DeployAction::Update
    } else {
        DeployAction::Create
    };
    Ok(Some((deployment, action)))
}
