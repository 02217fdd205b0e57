//! Batch averager: reads every target, normalizes the readings, and maps
//! each target name to the mean of its parsed prices.

use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};
use pricewatch_core::{BatchResult, Target, TargetResult};
use tokio_util::sync::CancellationToken;

use crate::driver::BrowserDriver;
use crate::error::ScraperError;
use crate::normalize::normalize_price;
use crate::reader::{RawReading, ReaderOptions, TargetReader};

/// Tuning for one batch run.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Per-target budget for navigation plus the element wait.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Targets read at once. Each in-flight target holds its own session.
    pub max_concurrent: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            max_concurrent: 1,
        }
    }
}

impl ScanOptions {
    #[must_use]
    pub fn from_app_config(config: &pricewatch_core::AppConfig) -> Self {
        Self {
            wait_timeout: Duration::from_secs(config.scraper_wait_timeout_secs),
            poll_interval: Duration::from_millis(config.scraper_poll_interval_ms),
            max_concurrent: config.scraper_max_concurrent_targets,
        }
    }

    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            wait_timeout: self.wait_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

/// Runs a catalog through a [`BrowserDriver`].
pub struct BatchAverager<D> {
    driver: D,
    options: ScanOptions,
}

impl<D: BrowserDriver> BatchAverager<D> {
    #[must_use]
    pub fn new(driver: D, options: ScanOptions) -> Self {
        Self { driver, options }
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Reads every target and returns one entry per distinct name.
    ///
    /// Per-target failures never abort the batch; they surface as
    /// [`TargetResult::NoPriceFound`]. When two targets share a name the one
    /// later in the catalog wins, whatever order the reads finish in.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::DriverUnavailable`] if the automation backend
    /// cannot be reached before any target is read.
    pub async fn run(&self, targets: &[Target]) -> Result<BatchResult, ScraperError> {
        self.run_until_cancelled(targets, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops starting new targets once `cancel`
    /// fires. Targets already in flight finish and are recorded; targets
    /// never started are absent from the result.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub async fn run_until_cancelled(
        &self,
        targets: &[Target],
        cancel: &CancellationToken,
    ) -> Result<BatchResult, ScraperError> {
        if targets.is_empty() {
            return Ok(BatchResult::default());
        }

        self.driver
            .probe()
            .await
            .map_err(|e| match e {
                ScraperError::DriverUnavailable { .. } => e,
                other => ScraperError::DriverUnavailable {
                    reason: other.to_string(),
                },
            })?;

        let reader = TargetReader::new(&self.driver, self.options.reader_options());
        let max_concurrent = self.options.max_concurrent.max(1);

        tracing::info!(
            targets = targets.len(),
            max_concurrent,
            "starting batch"
        );

        let outcomes: Vec<(&Target, TargetResult)> = stream::iter(targets)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|target| {
                let reader = &reader;
                async move {
                    let result = match reader.read(target).await {
                        Ok(readings) => average_readings(&readings),
                        Err(failure) => {
                            tracing::warn!(
                                target_name = %target.name,
                                error = %failure,
                                "target failed; recording no price"
                            );
                            TargetResult::NoPriceFound
                        }
                    };
                    (target, result)
                }
            })
            // Yields in catalog order so duplicate names resolve the same way
            // at any concurrency.
            .buffered(max_concurrent)
            .collect()
            .await;

        let mut results = BatchResult::with_capacity(outcomes.len());
        for (target, result) in outcomes {
            if results.insert(target.name.clone(), result).is_some() {
                tracing::warn!(
                    target_name = %target.name,
                    "duplicate target name; keeping the later result"
                );
            }
        }

        if cancel.is_cancelled() {
            tracing::warn!(
                completed = results.len(),
                total = targets.len(),
                "batch cancelled; returning partial results"
            );
        }

        let found = results.iter().filter(|(_, result)| result.is_found()).count();
        tracing::info!(
            names = results.len(),
            found,
            not_found = results.len().saturating_sub(found),
            "batch complete"
        );

        Ok(results)
    }
}

/// Folds one target's raw readings into a result.
///
/// Readings that do not normalize to a number are skipped. If none remain,
/// or there were no readings at all, the target has no price.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_readings(readings: &[RawReading]) -> TargetResult {
    if readings.is_empty() {
        return TargetResult::NoPriceFound;
    }

    let prices: Vec<f64> = readings
        .iter()
        .filter_map(|reading| normalize_price(reading))
        .collect();

    if prices.is_empty() {
        return TargetResult::NoPriceFound;
    }

    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    TargetResult::Average(mean)
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
