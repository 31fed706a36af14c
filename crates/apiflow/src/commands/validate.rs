use apiflow_deploy::DeployError;
use colored::Colorize;
use std::path::Path;

pub fn handle(project_dir: &Path, json: bool) -> anyhow::Result<()> {
    let manifest_path = apiflow_core::find_manifest(project_dir).map_err(DeployError::from)?;
    let manifest = apiflow_core::load_manifest(&manifest_path).map_err(DeployError::from)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "valid",
                "manifest": manifest_path.display().to_string(),
                "name": manifest.name,
                "runtime": manifest.runtime,
                "port": manifest.port,
            })
        );
        return Ok(());
    }

    println!("{}", "マニフェストを検証中...".blue());
    println!(
        "マニフェスト: {}",
        manifest_path.display().to_string().cyan()
    );
    println!("{}", "✓ マニフェストは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  名前: {}", manifest.name.cyan());
    println!("  ランタイム: {}", manifest.runtime);
    println!("  ポート: {}", manifest.port);
    println!("  ヘルスチェック: {}", manifest.health_check_path());
    if !manifest.endpoints.is_empty() {
        println!("  エンドポイント: {}個", manifest.endpoints.len());
        for endpoint in &manifest.endpoints {
            println!("    - {}", endpoint);
        }
    }
    if !manifest.environment.required.is_empty() {
        println!(
            "  必須の環境変数: {}",
            manifest.environment.required.join(", ")
        );
    }
    if let Some(scaling) = &manifest.scaling {
        println!(
            "  スケーリング: {}〜{} (CPU {}%)",
            scaling.min_replicas, scaling.max_replicas, scaling.target_cpu
        );
    }

    Ok(())
}
