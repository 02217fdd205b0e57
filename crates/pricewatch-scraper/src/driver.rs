//! Browser-automation capability consumed by the target reader.
//!
//! The reader only needs a handful of operations: open a session, navigate,
//! query elements, read their text, and close. [`crate::WebDriverClient`]
//! implements these over the W3C WebDriver protocol; tests substitute an
//! in-memory fake.

use async_trait::async_trait;

use crate::error::ScraperError;

/// Prefix that switches a locator from XPath to a CSS selector.
pub const CSS_PREFIX: &str = "css=";

/// Element-location expression, parsed from a catalog `xpath` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    /// Parses a catalog locator. Plain text is XPath; `css=` selects CSS.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidLocator`] if the expression is empty.
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        let trimmed = raw.trim();
        let (locator, kind) = match trimmed.strip_prefix(CSS_PREFIX) {
            Some(selector) => (Locator::Css(selector.trim().to_owned()), "CSS selector"),
            None => (Locator::XPath(trimmed.to_owned()), "XPath expression"),
        };

        if locator.value().is_empty() {
            return Err(ScraperError::InvalidLocator {
                locator: raw.to_owned(),
                reason: format!("empty {kind}"),
            });
        }
        Ok(locator)
    }

    /// W3C location strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::XPath(_) => "xpath",
            Locator::Css(_) => "css selector",
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Locator::XPath(expr) | Locator::Css(expr) => expr,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::XPath(expr) => f.write_str(expr),
            Locator::Css(selector) => write!(f, "{CSS_PREFIX}{selector}"),
        }
    }
}

/// Opaque handle to an element inside one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(pub String);

/// Factory for isolated browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Checks that the automation backend is reachable and accepting sessions.
    async fn probe(&self) -> Result<(), ScraperError>;

    /// Starts a fresh session. Nothing is shared with other sessions.
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, ScraperError>;
}

/// One live browser session. Callers must [`close`](BrowserSession::close)
/// it once done; implementations should tolerate repeated closes.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Returns every element currently matching `locator`, possibly none.
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, ScraperError>;

    /// Rendered text content of `element`.
    async fn element_text(&mut self, element: &ElementRef) -> Result<String, ScraperError>;

    async fn close(&mut self) -> Result<(), ScraperError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_locator_is_xpath() {
        let locator = Locator::parse("  //span[@class='price']  ").unwrap();
        assert_eq!(locator, Locator::XPath("//span[@class='price']".to_owned()));
        assert_eq!(locator.strategy(), "xpath");
    }

    #[test]
    fn css_prefix_selects_css_strategy() {
        let locator = Locator::parse("css= .product .price").unwrap();
        assert_eq!(locator, Locator::Css(".product .price".to_owned()));
        assert_eq!(locator.strategy(), "css selector");
        assert_eq!(locator.to_string(), "css=.product .price");
    }

    #[test]
    fn empty_locators_are_rejected() {
        for raw in ["", "   ", "css=", "css=   "] {
            let err = Locator::parse(raw).unwrap_err();
            assert!(
                matches!(err, ScraperError::InvalidLocator { .. }),
                "expected InvalidLocator for {raw:?}, got {err:?}"
            );
        }
    }
}
