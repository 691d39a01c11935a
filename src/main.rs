//! GitHub Slack Notifier CLI
//!
//! 按调度窗口拉取 GitHub 通知、过滤、解析链接并转发到 Slack，
//! 供定时 workflow 反复调用。单次运行，无常驻进程。

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use github_slack_notifier::{
    config::{Cli, Config},
    github::GithubClient,
    pipeline::{run, RunOutcome},
    slack::SlackSender,
};

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();

    let default_level = if config.debug_logging { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(error) = forward(&config).await {
        // {:#} 展开 anyhow 的错误链，保留底层原因
        error!("run failed: {error:#}");
        std::process::exit(1);
    }
}

async fn forward(config: &Config) -> anyhow::Result<()> {
    let source = GithubClient::new(&config.github_token)?;
    let sink = SlackSender::new(&config.slack_token)?;

    match run(&source, &sink, config, Utc::now()).await? {
        RunOutcome::NoneFetched => info!("nothing to forward this run"),
        RunOutcome::AllFiltered => info!("all fetched notifications were filtered out"),
        RunOutcome::Forwarded { sent, marked_read } => {
            info!(sent, marked_read, "notification forwarding complete");
        }
    }
    Ok(())
}
