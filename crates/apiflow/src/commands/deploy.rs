use crate::DeployArgs;
use apiflow_cloud::Orchestrator;
use apiflow_cloud_terraform::TerraformOrchestrator;
use apiflow_config::{DeployTarget, Overrides, Settings};
use apiflow_deploy::{
    DeployError, DeployOptions, DeployOutcome, Pipeline, StdinPrompter, Target, report,
};
use colored::Colorize;
use std::sync::Arc;

pub async fn handle(args: DeployArgs, json: bool) -> anyhow::Result<()> {
    let manifest_path = apiflow_core::find_manifest(&args.path).map_err(DeployError::from)?;
    let manifest = apiflow_core::load_manifest(&manifest_path).map_err(DeployError::from)?;
    tracing::debug!(manifest = %manifest_path.display(), "manifest loaded");

    let settings = Settings::resolve(Overrides {
        api_url: args.api_url,
        target: args.target,
        protocol: args.protocol,
        region: args.region,
    })
    .map_err(DeployError::from)?;
    tracing::debug!(
        deploy_target = %settings.target,
        protocol = %settings.protocol,
        "settings resolved"
    );

    if !json {
        println!("{}", "デプロイを開始します...".blue().bold());
        println!(
            "API: {}",
            args.api_name.as_deref().unwrap_or(&manifest.name).cyan()
        );
        match settings.target {
            DeployTarget::Hosted => println!(
                "ターゲット: {} ({} / {})",
                settings.target.to_string().cyan(),
                settings.protocol,
                settings.api_url
            ),
            DeployTarget::SelfHosted => {
                println!("ターゲット: {}", settings.target.to_string().cyan())
            }
        }
    }

    // self-hosted の terraform 作業ディレクトリ（state を保持する）
    let byoa_root = match settings.target {
        DeployTarget::SelfHosted => Some(
            apiflow_config::get_config_dir()
                .map_err(DeployError::from)?
                .join("byoa"),
        ),
        DeployTarget::Hosted => None,
    };
    let aws_profile = args.aws_profile;
    let target = Target::select(&settings, move || -> Arc<dyn Orchestrator> {
        let orchestrator = TerraformOrchestrator::new(byoa_root.unwrap_or_default());
        match aws_profile {
            Some(profile) => Arc::new(orchestrator.with_aws_profile(profile)),
            None => Arc::new(orchestrator),
        }
    })?;

    let options = DeployOptions {
        api_name: args.api_name,
        version: args.version,
        replicas: args.replicas,
        image_tag: args.tag,
        region: settings.region.clone(),
        yes: args.yes,
        force: args.force,
        quiet: json,
    };

    let outcome = Pipeline::new(target, Arc::new(StdinPrompter), options)
        .run(&manifest, &args.path)
        .await?;

    match outcome {
        DeployOutcome::Deployed(summary) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report::to_json(&summary, &manifest))?
                );
            } else {
                println!();
                report::print_human(&summary, &manifest);
            }
        }
        DeployOutcome::Cancelled => {
            if json {
                println!("{}", report::cancelled_json());
            }
        }
    }

    Ok(())
}
