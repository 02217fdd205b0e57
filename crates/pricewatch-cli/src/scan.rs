//! `scan` command handler.

use std::future::Future;

use anyhow::Context;
use pricewatch_core::config::MAX_CONCURRENT_TARGETS;
use pricewatch_core::AppConfig;
use pricewatch_scraper::{BatchAverager, ScanOptions, ScraperError, WebDriverClient, WebDriverConfig};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::report;

/// Exit status after a forced abort (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// Clap value parser for `--concurrency`.
pub(crate) fn parse_concurrency(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a whole number"))?;
    if (1..=MAX_CONCURRENT_TARGETS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 1 and {MAX_CONCURRENT_TARGETS}"))
    }
}

/// Folds command-line flags over the environment configuration.
pub(crate) fn apply_overrides(
    config: &mut AppConfig,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
) {
    if let Some(concurrency) = concurrency {
        config.scraper_max_concurrent_targets = concurrency;
    }
    if let Some(timeout_secs) = timeout_secs {
        config.scraper_wait_timeout_secs = timeout_secs;
    }
}

/// Cancels `cancel` on the first interrupt and returns `true` on the second,
/// telling the caller to abort without waiting for in-flight targets.
/// Returns `false` if the interrupt source fails first.
pub(crate) async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: &CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        tracing::warn!(error = %e, "cannot listen for interrupts");
        return false;
    }
    tracing::warn!("interrupt received; finishing targets already in progress (interrupt again to abort)");
    cancel.cancel();

    if next_interrupt().await.is_err() {
        return false;
    }
    tracing::warn!("second interrupt received; aborting scan");
    true
}

pub(crate) async fn run_scan(pool: &SqlitePool, config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let targets: Vec<_> = pricewatch_db::list_targets(pool)
        .await?
        .into_iter()
        .map(pricewatch_db::TargetRow::into_target)
        .collect();

    if targets.is_empty() {
        println!("{}", report::EMPTY_CATALOG_HINT);
        return Ok(());
    }

    let client = WebDriverClient::new(WebDriverConfig::from_app_config(config))
        .context("failed to build WebDriver client")?;
    let averager = BatchAverager::new(client, ScanOptions::from_app_config(config));

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, &signal_token).await {
            eprintln!("scan aborted; results not reported");
            std::process::exit(FORCED_EXIT_CODE);
        }
    });

    let outcome = averager.run_until_cancelled(&targets, &cancel).await;
    signal_task.abort();

    let results = match outcome {
        Ok(results) => results,
        Err(ScraperError::DriverUnavailable { reason }) => {
            anyhow::bail!(
                "browser automation is unavailable at {}: {reason}",
                config.webdriver_url
            );
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", report::format_results(&results));
    }

    if cancel.is_cancelled() {
        eprintln!(
            "scan interrupted: {} of {} target(s) reported",
            results.len(),
            targets.len()
        );
    }
    Ok(())
}
