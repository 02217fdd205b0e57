//! Target reader: one browser session against one target, returning the raw
//! text of every element the target's locator matches.

use std::time::Duration;

use pricewatch_core::Target;
use thiserror::Error;
use tokio::time::Instant;

use crate::client::extract_domain;
use crate::driver::{BrowserDriver, BrowserSession, ElementRef, Locator};
use crate::error::ScraperError;

/// Text content of one matched element, before normalization.
pub type RawReading = String;

/// Why a target produced no readings. Logged, then folded into
/// [`pricewatch_core::TargetResult::NoPriceFound`] by the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("could not open a browser session: {0}")]
    SessionUnavailable(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("target not read within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("driver error: {0}")]
    Driver(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Budget for navigation, the element-presence wait and the text reads.
    pub wait_timeout: Duration,
    /// Delay between presence checks while waiting.
    pub poll_interval: Duration,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Reads targets through an injected [`BrowserDriver`].
pub struct TargetReader<'d> {
    driver: &'d dyn BrowserDriver,
    options: ReaderOptions,
}

impl<'d> TargetReader<'d> {
    #[must_use]
    pub fn new(driver: &'d dyn BrowserDriver, options: ReaderOptions) -> Self {
        Self { driver, options }
    }

    /// Opens a fresh session, loads `target.location`, waits for the locator
    /// to match, and returns the text of every match.
    ///
    /// Single attempt, no retries. The session is closed before returning on
    /// every path.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchFailure`] describing the first step that failed.
    /// Driver errors never escape in raw form.
    pub async fn read(&self, target: &Target) -> Result<Vec<RawReading>, FetchFailure> {
        let locator = Locator::parse(&target.locator)
            .map_err(|e| FetchFailure::InvalidLocator(e.to_string()))?;

        let mut session = self.driver.open_session().await.map_err(|e| {
            tracing::error!(target_name = %target.name, error = %e, "failed to open browser session");
            FetchFailure::SessionUnavailable(e.to_string())
        })?;

        let outcome = self.read_in_session(session.as_mut(), target, &locator).await;

        if let Err(e) = session.close().await {
            tracing::warn!(target_name = %target.name, error = %e, "failed to close browser session");
        }

        outcome
    }

    async fn read_in_session(
        &self,
        session: &mut dyn BrowserSession,
        target: &Target,
        locator: &Locator,
    ) -> Result<Vec<RawReading>, FetchFailure> {
        let domain = extract_domain(&target.location);
        let timeout = self.options.wait_timeout;
        let deadline = Instant::now() + timeout;
        let timed_out = || FetchFailure::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        match tokio::time::timeout_at(deadline, session.navigate(&target.location)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(target_name = %target.name, %domain, error = %e, "navigation failed");
                return Err(FetchFailure::Navigation(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(target_name = %target.name, %domain, ?timeout, "timed out loading page");
                return Err(timed_out());
            }
        }

        let elements = match tokio::time::timeout_at(deadline, self.wait_for_elements(session, locator)).await {
            Ok(Ok(elements)) => elements,
            Ok(Err(e)) => {
                tracing::warn!(target_name = %target.name, %domain, %locator, error = %e, "element lookup failed");
                return Err(FetchFailure::Driver(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(target_name = %target.name, %domain, %locator, ?timeout, "no element matched before timeout");
                return Err(timed_out());
            }
        };

        let readings = match tokio::time::timeout_at(deadline, read_texts(session, &elements)).await {
            Ok(Ok(readings)) => readings,
            Ok(Err(e)) => {
                tracing::warn!(target_name = %target.name, %domain, error = %e, "failed to read element text");
                return Err(FetchFailure::Driver(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(target_name = %target.name, %domain, matched = elements.len(), ?timeout, "timed out reading element text");
                return Err(timed_out());
            }
        };

        tracing::debug!(target_name = %target.name, %domain, matched = readings.len(), "read target");
        Ok(readings)
    }

    /// Polls until at least one element matches. Unbounded on its own; the
    /// caller applies the deadline.
    async fn wait_for_elements(
        &self,
        session: &mut dyn BrowserSession,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, ScraperError> {
        loop {
            let elements = session.find_elements(locator).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

async fn read_texts(
    session: &mut dyn BrowserSession,
    elements: &[ElementRef],
) -> Result<Vec<RawReading>, ScraperError> {
    let mut readings = Vec::with_capacity(elements.len());
    for element in elements {
        readings.push(session.element_text(element).await?);
    }
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{FakeDriver, FakePage};

    fn fast_options() -> ReaderOptions {
        ReaderOptions {
            wait_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(5),
        }
    }

    fn target(location: &str) -> Target {
        Target::new("shop", location, "//span[@class='price']")
    }

    #[tokio::test]
    async fn returns_text_of_every_match() {
        let driver = FakeDriver::new().page(
            "https://shop.example/a",
            FakePage::elements(&["10", "20", "30"]),
        );
        let reader = TargetReader::new(&driver, fast_options());

        let readings = reader.read(&target("https://shop.example/a")).await.unwrap();
        assert_eq!(readings, vec!["10", "20", "30"]);
        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn waits_for_late_elements() {
        let driver = FakeDriver::new().page(
            "https://shop.example/slow",
            FakePage::elements(&["99"]).appearing_after(3),
        );
        let reader = TargetReader::new(&driver, fast_options());

        let readings = reader.read(&target("https://shop.example/slow")).await.unwrap();
        assert_eq!(readings, vec!["99"]);
    }

    #[tokio::test]
    async fn times_out_when_nothing_matches_and_still_closes() {
        let driver = FakeDriver::new().page("https://shop.example/empty", FakePage::elements(&[]));
        let reader = TargetReader::new(&driver, fast_options());

        let err = reader.read(&target("https://shop.example/empty")).await.unwrap_err();
        assert_eq!(err, FetchFailure::Timeout { timeout_ms: 200 });
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn hung_navigation_is_bounded_by_timeout() {
        let driver = FakeDriver::new().page("https://shop.example/hang", FakePage::hang());
        let reader = TargetReader::new(&driver, fast_options());

        let started = std::time::Instant::now();
        let err = reader.read(&target("https://shop.example/hang")).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn slow_text_reads_share_the_deadline() {
        // Four reads of 150 ms each overrun the 200 ms budget.
        let driver = FakeDriver::new().page(
            "https://shop.example/sluggish",
            FakePage::elements(&["1", "2", "3", "4"]).with_text_delay(Duration::from_millis(150)),
        );
        let reader = TargetReader::new(&driver, fast_options());

        let started = std::time::Instant::now();
        let err = reader
            .read(&target("https://shop.example/sluggish"))
            .await
            .unwrap_err();
        assert_eq!(err, FetchFailure::Timeout { timeout_ms: 200 });
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn navigation_error_becomes_failure() {
        let driver = FakeDriver::new().page("https://down.example", FakePage::navigation_error());
        let reader = TargetReader::new(&driver, fast_options());

        let err = reader.read(&target("https://down.example")).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Navigation(_)), "got {err:?}");
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn text_error_becomes_driver_failure() {
        let driver = FakeDriver::new().page(
            "https://shop.example/stale",
            FakePage::elements(&["1"]).with_text_error(),
        );
        let reader = TargetReader::new(&driver, fast_options());

        let err = reader.read(&target("https://shop.example/stale")).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Driver(_)), "got {err:?}");
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn session_failure_is_reported_without_close() {
        let driver = FakeDriver::new().refusing_sessions();
        let reader = TargetReader::new(&driver, fast_options());

        let err = reader.read(&target("https://shop.example/a")).await.unwrap_err();
        assert!(matches!(err, FetchFailure::SessionUnavailable(_)), "got {err:?}");
        assert_eq!(driver.opened(), 0);
        assert_eq!(driver.closed(), 0);
    }

    #[tokio::test]
    async fn empty_locator_fails_before_opening_a_session() {
        let driver = FakeDriver::new();
        let reader = TargetReader::new(&driver, fast_options());

        let err = reader
            .read(&Target::new("shop", "https://shop.example/a", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchFailure::InvalidLocator(_)));
        assert_eq!(driver.opened(), 0);
    }
}
