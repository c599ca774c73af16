//! LMS Insight - a read-only reporting API over an LMS database.

mod cli;

use anyhow::Context;
use cli::{Cli, Command};
use lms_insight::api::{create_router, AppState};
use lms_insight::config::Config;
use lms_insight::db::{self, TablePrefix};
use lms_insight::logging;
use lms_insight::persistence::ReportStore;
use lms_insight::safety::classify_sql;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    match &cli.log_file {
        Some(path) => logging::init_file_logging(path),
        None => logging::init_stderr_logging(),
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command() {
        Command::Check { sql } => Ok(check(&sql)),
        Command::Serve => {
            let config = load_config(&cli)?;
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config precedence: flags, then environment, then file, then defaults.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());

    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env();
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn check(sql: &str) -> ExitCode {
    let verdict = classify_sql(sql);
    match serde_json::to_string_pretty(&verdict) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("allowed: {}", verdict.allowed),
    }
    if verdict.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Database: {}", config.database.display_string());
    let client = db::connect(&config.database).await?;
    let prefix = TablePrefix::new(config.database.table_prefix.clone())?;

    info!("Reports file: {}", config.reports.path.display());
    let store = ReportStore::new(config.reports.path.clone());

    let state = AppState::new(client.clone(), prefix, store, config.limits);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down");
    client.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
