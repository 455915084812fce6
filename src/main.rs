use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::util::SubscriberInitExt;

use of_alert::config::AppConfig;
use of_alert::error::Error;
use of_alert::pipeline::{RunOutcome, run_configured};
use of_alert::source;

/// Exit status when configuration is missing or invalid.
const EXIT_CONFIG: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();
    let _log_guard = init_tracing(
        config
            .as_ref()
            .ok()
            .and_then(|c| c.log_dir.as_deref()),
    );

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(Error::from(e).into()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            match e.downcast_ref::<Error>() {
                Some(Error::Config(_)) => ExitCode::from(EXIT_CONFIG),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<ExitCode> {
    let today = config
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    eprintln!("📋 of-alert v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Today: {}", today.format("%d/%m/%Y"));
    eprintln!(
        "   Horizon: {} business day(s)",
        config.alert.horizon_business_days
    );
    eprintln!(
        "   Delivery: {}",
        if config.dry_run {
            "dry run (no email)".to_string()
        } else {
            config
                .mail
                .message
                .recipients
                .iter()
                .map(|c| c.email.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    let sheet = source::from_config(&config.source, &config.alert.columns);

    let outcome = run_configured(&config, sheet.as_ref(), today)
        .await
        .with_context(|| format!("alert run against {} failed", sheet.describe()))?;

    match outcome {
        RunOutcome::NothingPending { scanned } => {
            tracing::info!(scanned, "Nothing pending");
        }
        RunOutcome::DryRun { rows, html } => {
            tracing::info!(rows, "Dry run complete");
            println!("{html}");
        }
        RunOutcome::Sent { rows, status } => {
            tracing::info!(rows, status, "Alert email sent");
        }
        RunOutcome::Rejected {
            rows,
            status,
            detail,
        } => {
            tracing::error!(rows, status, detail = %detail, "Email provider rejected the alert");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Stderr logging filtered by `RUST_LOG` (default `info`), plus a daily
/// rolling file when a log directory is given.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "of-alert.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(stderr_layer.with_filter(filter()))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(filter()),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(stderr_layer.with_filter(filter()))
                .init();
            None
        }
    }
}
