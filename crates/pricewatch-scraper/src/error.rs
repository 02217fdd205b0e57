use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("webdriver command \"{command}\" failed with {status} ({error}): {message}")]
    WebDriver {
        command: &'static str,
        status: u16,
        error: String,
        message: String,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid webdriver endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid locator \"{locator}\": {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("browser automation unavailable: {reason}")]
    DriverUnavailable { reason: String },
}

impl ScraperError {
    /// W3C error code reported by the driver, if this is a driver-side failure.
    #[must_use]
    pub fn webdriver_code(&self) -> Option<&str> {
        match self {
            ScraperError::WebDriver { error, .. } => Some(error),
            _ => None,
        }
    }
}
