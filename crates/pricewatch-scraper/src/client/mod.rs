//! HTTP client for a W3C WebDriver endpoint (chromedriver, Selenium grid).

mod endpoint;
mod protocol;
mod session;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::{json, Value};

use crate::driver::{BrowserDriver, BrowserSession};
use crate::error::ScraperError;

pub use endpoint::{extract_domain, parse_endpoint};
pub use session::WebDriverSession;

/// Browser flags applied to every session regardless of configuration.
const BASE_BROWSER_ARGS: [&str; 3] = ["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"];

/// Settings for [`WebDriverClient`].
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the WebDriver server.
    pub endpoint: String,
    pub headless: bool,
    /// Fixed viewport `(width, height)`.
    pub window: (u32, u32),
    /// Timeout for each HTTP request sent to the driver.
    pub request_timeout_secs: u64,
    /// Page-load timeout the browser enforces on navigation.
    pub page_load_timeout_ms: u64,
    /// Additional browser command-line switches.
    pub extra_args: Vec<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_owned(),
            headless: true,
            window: (1920, 1080),
            request_timeout_secs: 30,
            page_load_timeout_ms: 10_000,
            extra_args: Vec::new(),
        }
    }
}

impl WebDriverConfig {
    #[must_use]
    pub fn from_app_config(config: &pricewatch_core::AppConfig) -> Self {
        Self {
            endpoint: config.webdriver_url.clone(),
            headless: config.browser_headless,
            window: config.browser_window,
            request_timeout_secs: config.scraper_request_timeout_secs,
            page_load_timeout_ms: config.scraper_wait_timeout_secs.saturating_mul(1000),
            extra_args: Vec::new(),
        }
    }
}

/// WebDriver-backed [`BrowserDriver`].
///
/// Each [`open_session`](BrowserDriver::open_session) call creates a new
/// browser instance on the server; sessions share only the pooled HTTP
/// connection to the driver.
pub struct WebDriverClient {
    pub(super) client: Client,
    pub(super) endpoint: Url,
    pub(super) config: WebDriverConfig,
}

impl WebDriverClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidEndpoint`] if the endpoint URL is
    /// unusable, or [`ScraperError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(config: WebDriverConfig) -> Result<Self, ScraperError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// New-session payload: Chrome with the configured flags and a
    /// page-load timeout.
    pub(crate) fn capabilities(&self) -> Value {
        let (width, height) = self.config.window;
        let mut args: Vec<String> = Vec::new();
        if self.config.headless {
            args.push("--headless".to_owned());
        }
        args.extend(BASE_BROWSER_ARGS.iter().map(|a| (*a).to_owned()));
        args.push(format!("--window-size={width},{height}"));
        args.extend(self.config.extra_args.iter().cloned());

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "pageLoadStrategy": "normal",
                    "timeouts": {
                        "pageLoad": self.config.page_load_timeout_ms,
                        "implicit": 0
                    },
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }

    fn command_url(&self, segments: &[&str]) -> Url {
        endpoint::command_url(&self.endpoint, segments)
    }
}

#[async_trait]
impl BrowserDriver for WebDriverClient {
    async fn probe(&self) -> Result<(), ScraperError> {
        let value = protocol::execute(
            &self.client,
            "status",
            Method::GET,
            self.command_url(&["status"]),
            None,
        )
        .await?;
        let status: protocol::Status = protocol::from_value("status", value)?;

        if status.ready {
            Ok(())
        } else {
            Err(ScraperError::DriverUnavailable {
                reason: format!(
                    "{} reports not ready: {}",
                    self.endpoint,
                    if status.message.is_empty() {
                        "no message"
                    } else {
                        status.message.as_str()
                    }
                ),
            })
        }
    }

    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, ScraperError> {
        let value = protocol::execute(
            &self.client,
            "new session",
            Method::POST,
            self.command_url(&["session"]),
            Some(&self.capabilities()),
        )
        .await?;
        let created: protocol::NewSession = protocol::from_value("new session", value)?;

        tracing::debug!(session_id = %created.session_id, "opened browser session");
        Ok(Box::new(WebDriverSession::new(
            self.client.clone(),
            &self.endpoint,
            created.session_id,
        )))
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
