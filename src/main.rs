mod app;
mod cli;

use anyhow::Context;
use clap::Parser;
use codexplain::api::transport::ReqwestTransport;
use codexplain::api::ApiClient;
use codexplain::{config, paths};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = cli::Args::parse();

    let config_dir = paths::config_dir()?;
    let cfg = config::Config::load_optional(config_dir.join("config.toml"))?;
    tracing::debug!(?config_dir, ?cfg, "resolved config");

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let api_url = config::Config::resolve_api_url(
        args.api_url.clone(),
        std::env::var("CODEXPLAIN_API_URL").ok(),
        cfg.as_ref(),
    );

    let mut transport = ReqwestTransport::new(http, &api_url)?;
    if let Some(secs) = cfg.as_ref().and_then(|c| c.timeout_secs) {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }
    let client = ApiClient::new(Arc::new(transport));

    let default_language = cfg.as_ref().and_then(|c| c.language.clone());

    match args.cmd {
        cli::Command::Explain { file, language } => {
            let language = language.or(default_language);
            app::cmd_explain(&client, file.as_deref(), language).await
        }
        cli::Command::Refactor { file, language, goal } => {
            let language = language.or(default_language);
            app::cmd_refactor(&client, file.as_deref(), language, goal).await
        }
        cli::Command::Tests {
            file,
            language,
            test_framework,
        } => {
            let language = language.or(default_language);
            app::cmd_tests(&client, file.as_deref(), language, test_framework).await
        }
        cli::Command::Health => app::cmd_health(&client).await,
        cli::Command::Ping => app::cmd_ping(&client).await,
        cli::Command::Reset => app::cmd_reset(),
    }
}
