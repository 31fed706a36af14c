//! デプロイパイプライン
//!
//! reconcile → package → upload → deploy → poll を1本の制御フローで順に実行する。
//! プロトコル差分は [`Backend`] に閉じ込め、ここでは分岐しない。

use crate::backend::{Backend, DeployParams, UploadRequest};
use crate::console::Console;
use crate::error::{DeployError, Result};
use crate::model::{BuildRef, DeployAction, DeployOptions, DeployOutcome, DeploySummary};
use crate::poller::{PollPolicy, wait_until_live};
use crate::prompt::Prompter;
use crate::reconcile::{Reconciliation, reconcile};
use crate::request;
use crate::selfhosted;
use crate::target::Target;
use apiflow_build::ContextBuilder;
use apiflow_config::{DeployTarget, Protocol};
use apiflow_core::Manifest;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

const HOSTED_STEPS: usize = 4;

pub struct Pipeline {
    target: Target,
    prompter: Arc<dyn Prompter>,
    options: DeployOptions,
    poll_policy: PollPolicy,
}

impl Pipeline {
    pub fn new(target: Target, prompter: Arc<dyn Prompter>, options: DeployOptions) -> Self {
        Self {
            target,
            prompter,
            options,
            poll_policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// パイプラインを実行する
    ///
    /// 一時アーカイブはこの呼び出しの中で作られ、どの経路で戻っても削除される。
    pub async fn run(&self, manifest: &Manifest, project_dir: &Path) -> Result<DeployOutcome> {
        let api_name = self
            .options
            .api_name
            .clone()
            .unwrap_or_else(|| manifest.name.clone());
        // 引数で上書きされた名前はマニフェストの検証を通っていない
        apiflow_core::validate_name(&api_name)?;
        let console = Console::new(self.options.quiet);

        tracing::info!(
            api_name = %api_name,
            deploy_target = %self.target.kind(),
            "deploy started"
        );

        match &self.target {
            Target::Hosted(backend) => {
                self.run_hosted(backend, manifest, &api_name, project_dir, &console)
                    .await
            }
            Target::SelfHosted(orchestrator) => {
                selfhosted::run(
                    orchestrator.as_ref(),
                    self.prompter.as_ref(),
                    &self.options,
                    &console,
                    manifest,
                    &api_name,
                    project_dir,
                )
                .await
            }
        }
    }

    async fn run_hosted(
        &self,
        backend: &Backend,
        manifest: &Manifest,
        api_name: &str,
        project_dir: &Path,
        console: &Console,
    ) -> Result<DeployOutcome> {
        if self.options.version.is_some() && backend.protocol != Protocol::Legacy {
            return Err(DeployError::Config(
                "--version can only be used with the legacy protocol".to_string(),
            ));
        }

        // 1. 既存デプロイの確認
        console.step(1, HOSTED_STEPS, "既存デプロイを確認中...");
        let reconciliation = reconcile(
            backend.lookup.as_ref(),
            api_name,
            self.options.skip_prompts(),
            self.prompter.as_ref(),
        )
        .await?;

        let (action, existing) = match reconciliation {
            Reconciliation::Create => {
                console.say(format!("  新規デプロイ: {}", api_name.cyan()));
                (DeployAction::Create, None)
            }
            Reconciliation::Update(existing) => {
                console.say(format!("  既存デプロイを更新: {}", api_name.cyan()));
                (DeployAction::Update, Some(existing))
            }
            Reconciliation::Abort => {
                console.say("デプロイをキャンセルしました".yellow().to_string());
                return Ok(DeployOutcome::Cancelled);
            }
        };

        // 2. パッケージ・アップロード
        let build = match &self.options.version {
            Some(version) => {
                console.step(2, HOSTED_STEPS, "アップロードをスキップ（--version 指定）");
                console.say(format!("  バージョン: {}", version.cyan()));
                BuildRef::Version(version.clone())
            }
            None => {
                console.step(2, HOSTED_STEPS, "パッケージ・アップロード中...");
                self.package_and_upload(backend, manifest, api_name, project_dir, console)
                    .await?
            }
        };

        // 3. デプロイ要求
        console.step(3, HOSTED_STEPS, "デプロイを要求中...");
        let params = DeployParams {
            api_name,
            manifest,
            build: &build,
            existing: existing.as_ref(),
            replicas: self.options.replicas,
        };
        let mut record = backend.deployer.deploy(&params).await?;
        console.say(format!("  デプロイID: {}", record.deployment_id));

        // 4. ステータス待機
        console.step(4, HOSTED_STEPS, "デプロイ完了を待機中...");
        let spinner = console.spinner("ステータスを確認中...");
        let max_attempts = self.poll_policy.max_attempts;
        let result = wait_until_live(
            backend.status.as_ref(),
            &record.deployment_id,
            &self.poll_policy,
            |attempt, status| {
                spinner.set_message(&format!(
                    "ステータス: {} ({}/{})",
                    status, attempt, max_attempts
                ))
            },
        )
        .await;
        match &result {
            Ok(_) => spinner.finish_success(),
            Err(e) => spinner.finish_error(&e.to_string()),
        }
        record.status = result?;

        Ok(DeployOutcome::Deployed(DeploySummary {
            api_name: api_name.to_string(),
            record,
            target: DeployTarget::Hosted,
            action,
            account: None,
            region: None,
        }))
    }

    async fn package_and_upload(
        &self,
        backend: &Backend,
        manifest: &Manifest,
        api_name: &str,
        project_dir: &Path,
        console: &Console,
    ) -> Result<BuildRef> {
        let rules = backend
            .exclusions
            .clone()
            .with_manifest_excludes(manifest.files.exclude.iter().map(String::as_str))
            .map_err(|e| DeployError::ManifestValidation(e.to_string()))?;

        let context = ContextBuilder::create_context(project_dir, &rules)?;
        console.say(format!(
            "  ✓ {} ファイルをパッケージしました ({} KB)",
            context.entries(),
            context.size().div_ceil(1024)
        ));

        let image_tag = request::image_tag(api_name, self.options.image_tag.as_deref());
        let upload = UploadRequest {
            api_name,
            runtime: &manifest.runtime,
            image_tag: &image_tag,
        };

        let spinner = console.spinner("アップロード中...");
        let result = backend.uploader.upload(&upload, &context).await;
        match &result {
            Ok(_) => spinner.finish_success(),
            Err(e) => spinner.finish_error(&e.to_string()),
        }
        // アーカイブはアップロード後すぐに削除する
        drop(context);

        let build = result?;
        match &build {
            BuildRef::Version(version) => console.say(format!("  バージョン: {}", version.cyan())),
            BuildRef::Image {
                image_tag,
                build_id,
            } => console.say(format!(
                "  イメージ: {} (build {})",
                image_tag.cyan(),
                build_id
            )),
        }
        Ok(build)
    }
}
