//! W3C WebDriver wire types and the request/response plumbing shared by the
//! client and its sessions.

use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;

/// Key under which W3C drivers return element references.
pub(super) const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Every WebDriver response wraps its payload in `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Status {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Sends one WebDriver command and returns the `value` payload.
///
/// # Errors
///
/// - [`ScraperError::Http`]: transport failure or request timeout.
/// - [`ScraperError::WebDriver`]: non-2xx response carrying a W3C error body.
/// - [`ScraperError::UnexpectedStatus`]: non-2xx response without one.
/// - [`ScraperError::Deserialize`]: 2xx response that is not a JSON envelope.
pub(super) async fn execute(
    client: &Client,
    command: &'static str,
    method: Method,
    url: Url,
    body: Option<&Value>,
) -> Result<Value, ScraperError> {
    let mut request = client
        .request(method, url.clone())
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(
            match serde_json::from_str::<Envelope<ErrorValue>>(&text) {
                Ok(envelope) => ScraperError::WebDriver {
                    command,
                    status: status.as_u16(),
                    error: envelope.value.error,
                    message: envelope.value.message,
                },
                Err(_) => ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                },
            },
        );
    }

    parse_value::<Value>(command, &text)
}

/// Decodes a response body into `T` by way of the `value` envelope.
pub(super) fn parse_value<T: serde::de::DeserializeOwned>(
    command: &'static str,
    body: &str,
) -> Result<T, ScraperError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.value)
        .map_err(|e| ScraperError::Deserialize {
            context: format!("{command} response"),
            source: e,
        })
}

/// Decodes a typed payload from an already-unwrapped `value`.
pub(super) fn from_value<T: serde::de::DeserializeOwned>(
    command: &'static str,
    value: Value,
) -> Result<T, ScraperError> {
    serde_json::from_value(value).map_err(|e| ScraperError::Deserialize {
        context: format!("{command} response"),
        source: e,
    })
}

/// Extracts element ids from a `find elements` payload.
///
/// Accepts the W3C key and the legacy `ELEMENT` key some older drivers
/// still emit.
pub(super) fn element_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.get(ELEMENT_KEY)
                        .or_else(|| item.get("ELEMENT"))
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                })
                .collect()
        })
        .unwrap_or_default()
}
