mod commands;

use apiflow_config::{DeployTarget, Protocol};
use apiflow_deploy::{DeployError, report};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apiflow")]
#[command(about = "APIをパッケージして、ビルドして、公開する。", long_about = None)]
struct Cli {
    /// 機械可読なJSONで出力する
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// APIをデプロイ
    Deploy(DeployArgs),
    /// マニフェストを検証
    Validate {
        /// プロジェクトディレクトリ
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Args, Debug)]
pub(crate) struct DeployArgs {
    /// API名（省略時はマニフェストの name）
    pub api_name: Option<String>,

    /// バックエンドのプロトコル (hosted, legacy)
    #[arg(long)]
    pub protocol: Option<Protocol>,

    /// デプロイ先 (hosted, self-hosted)
    #[arg(long)]
    pub target: Option<DeployTarget>,

    /// アップロード済みのバージョンをデプロイ（legacy のみ）
    #[arg(long)]
    pub version: Option<String>,

    /// レプリカ数（legacy のみ）
    #[arg(long, default_value_t = 1)]
    pub replicas: u32,

    /// イメージタグ（hosted のみ、省略時は `{name}:{unixtime}`）
    #[arg(long)]
    pub tag: Option<String>,

    /// リージョン（self-hosted）
    #[arg(long)]
    pub region: Option<String>,

    /// AWSプロファイル（self-hosted）
    #[arg(long)]
    pub aws_profile: Option<String>,

    /// APIのベースURL
    #[arg(long)]
    pub api_url: Option<String>,

    /// 確認プロンプトをすべてスキップ
    #[arg(short, long)]
    pub yes: bool,

    /// 既存デプロイを確認なしで更新
    #[arg(short, long)]
    pub force: bool,

    /// プロジェクトディレクトリ
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ログはstderrへ（--json のstdoutを汚さない）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let json = cli.json;
    if let Err(err) = run(cli).await {
        report_error(&err, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Deploy(args) => commands::deploy::handle(args, cli.json).await?,
        Commands::Validate { path } => commands::validate::handle(&path, cli.json)?,
        Commands::Version => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })
                );
            } else {
                println!("apiflow {}", env!("CARGO_PKG_VERSION"));
            }
        }
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, json: bool) {
    let deploy_error = err.downcast_ref::<DeployError>();

    if json {
        let payload = match deploy_error {
            Some(e) => report::error_json(e),
            None => report::error_payload("Error", &format!("{:#}", err), None),
        };
        println!("{}", payload);
        return;
    }

    eprintln!("{} {:#}", "Error:".red().bold(), err);
    if let Some(hint) = deploy_error.and_then(|e| e.hint()) {
        eprintln!();
        eprintln!("{}", format!("ヒント: {}", hint).yellow());
    }
}
