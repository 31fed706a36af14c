//! デプロイ結果の表示
//!
//! 出力の形（特にJSON）は外部との契約。表示処理自体は状態を持たない。

use crate::error::DeployError;
use crate::model::DeploySummary;
use apiflow_core::Manifest;
use colored::Colorize;
use serde_json::{Value, json};

/// ヘルスチェックを叩くスモークテストのコマンド
pub fn smoke_test(endpoint: &str, manifest: &Manifest) -> String {
    format!(
        "curl {}{}",
        endpoint.trim_end_matches('/'),
        manifest.health_check_path()
    )
}

/// 次に実行するとよいコマンド
pub fn next_steps(api_name: &str, manifest: &Manifest) -> Vec<String> {
    let mut steps = vec![
        format!("apiflow status {}", api_name),
        format!("apiflow logs {}", api_name),
    ];
    if !manifest.environment.required.is_empty() {
        steps.push(format!("apiflow env push {}", api_name));
    }
    steps
}

pub fn to_json(summary: &DeploySummary, manifest: &Manifest) -> Value {
    json!({
        "status": "success",
        "deployment_id": summary.record.deployment_id,
        "endpoint": summary.record.endpoint,
        "deployment_status": summary.record.status.to_string(),
        "target": summary.target.to_string(),
        "action": summary.action,
        "smoke_test": smoke_test(&summary.record.endpoint, manifest),
        "next_steps": next_steps(&summary.api_name, manifest),
        "account": summary.account,
        "region": summary.region,
    })
}

pub fn cancelled_json() -> Value {
    json!({ "status": "cancelled" })
}

pub fn error_json(err: &DeployError) -> Value {
    error_payload(err.kind(), &err.to_string(), err.hint().as_deref())
}

/// `{"status":"error","error":{kind,message,hint}}`
pub fn error_payload(kind: &str, message: &str, hint: Option<&str>) -> Value {
    json!({
        "status": "error",
        "error": {
            "kind": kind,
            "message": message,
            "hint": hint,
        }
    })
}

pub fn render_human(summary: &DeploySummary, manifest: &Manifest) -> String {
    let mut lines = vec![
        format!("{}", "✓ デプロイが完了しました！".green().bold()),
        String::new(),
        format!("  エンドポイント: {}", summary.record.endpoint.cyan()),
        format!("  デプロイID:     {}", summary.record.deployment_id),
        format!("  ステータス:     {}", summary.record.status),
        format!("  ターゲット:     {} ({})", summary.target, summary.action),
    ];
    if let Some(account) = &summary.account {
        lines.push(format!("  アカウント:     {}", account));
    }
    if let Some(region) = &summary.region {
        lines.push(format!("  リージョン:     {}", region));
    }

    lines.push(String::new());
    lines.push("動作確認:".bold().to_string());
    lines.push(format!(
        "  {}",
        smoke_test(&summary.record.endpoint, manifest).cyan()
    ));

    lines.push(String::new());
    lines.push("次のステップ:".bold().to_string());
    for step in next_steps(&summary.api_name, manifest) {
        lines.push(format!("  {}", step.dimmed()));
    }
    lines.join("\n")
}

pub fn print_human(summary: &DeploySummary, manifest: &Manifest) {
    println!("{}", render_human(summary, manifest));
}
