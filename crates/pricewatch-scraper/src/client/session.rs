//! One live WebDriver session.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::{json, Value};

use super::endpoint::command_url;
use super::protocol;
use crate::driver::{BrowserSession, ElementRef, Locator};
use crate::error::ScraperError;

/// Session handle returned by [`super::WebDriverClient`].
///
/// Dropping a session that was never closed schedules a best-effort
/// `DELETE /session/{id}` on the current Tokio runtime, so an abandoned read
/// (cancelled future, panic) does not leak a browser on the server.
pub struct WebDriverSession {
    client: Client,
    endpoint: Url,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    pub(super) fn new(client: Client, endpoint: &Url, session_id: String) -> Self {
        Self {
            client,
            endpoint: endpoint.clone(),
            session_id,
            closed: false,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, tail: &[&str]) -> Url {
        let mut segments = vec!["session", self.session_id.as_str()];
        segments.extend_from_slice(tail);
        command_url(&self.endpoint, &segments)
    }

    async fn execute(
        &self,
        command: &'static str,
        method: Method,
        tail: &[&str],
        body: Option<&Value>,
    ) -> Result<Value, ScraperError> {
        protocol::execute(&self.client, command, method, self.url(tail), body).await
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.execute("navigate", Method::POST, &["url"], Some(&json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, ScraperError> {
        let body = json!({ "using": locator.strategy(), "value": locator.value() });
        let value = self
            .execute("find elements", Method::POST, &["elements"], Some(&body))
            .await?;
        Ok(protocol::element_ids(&value)
            .into_iter()
            .map(ElementRef)
            .collect())
    }

    async fn element_text(&mut self, element: &ElementRef) -> Result<String, ScraperError> {
        let value = self
            .execute(
                "get element text",
                Method::GET,
                &["element", element.0.as_str(), "text"],
                None,
            )
            .await?;
        protocol::from_value("get element text", value)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if self.closed {
            return Ok(());
        }
        // Marked first: a failed delete is not retried from `Drop`.
        self.closed = true;
        self.execute("delete session", Method::DELETE, &[], None)
            .await?;
        tracing::debug!(session_id = %self.session_id, "closed browser session");
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                session_id = %self.session_id,
                "browser session dropped outside a runtime; it may outlive this process"
            );
            return;
        };

        let client = self.client.clone();
        let url = self.url(&[]);
        let session_id = std::mem::take(&mut self.session_id);
        tracing::warn!(%session_id, "browser session dropped without close; deleting in background");
        handle.spawn(async move {
            if let Err(e) = protocol::execute(&client, "delete session", Method::DELETE, url, None).await {
                tracing::warn!(%session_id, error = %e, "background session delete failed");
            }
        });
    }
}
