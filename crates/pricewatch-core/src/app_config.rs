#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Base URL of a W3C WebDriver endpoint, e.g. a local `chromedriver`.
    pub webdriver_url: String,
    pub browser_headless: bool,
    /// Fixed viewport as `(width, height)` in pixels.
    pub browser_window: (u32, u32),
    /// Upper bound on the element-presence wait for a single target.
    pub scraper_wait_timeout_secs: u64,
    pub scraper_poll_interval_ms: u64,
    /// Timeout applied to each HTTP request sent to the WebDriver endpoint.
    pub scraper_request_timeout_secs: u64,
    pub scraper_max_concurrent_targets: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("webdriver_url", &self.webdriver_url)
            .field("browser_headless", &self.browser_headless)
            .field("browser_window", &self.browser_window)
            .field("scraper_wait_timeout_secs", &self.scraper_wait_timeout_secs)
            .field("scraper_poll_interval_ms", &self.scraper_poll_interval_ms)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "scraper_max_concurrent_targets",
                &self.scraper_max_concurrent_targets,
            )
            .finish()
    }
}
