//! In-memory [`BrowserDriver`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::driver::{BrowserDriver, BrowserSession, ElementRef, Locator};
use crate::error::ScraperError;

#[derive(Debug, Clone)]
enum PageKind {
    Elements(Vec<String>),
    Hang,
    NavigationError,
}

/// Scripted behavior for one URL.
#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    kind: PageKind,
    /// Number of empty `find_elements` answers before elements appear.
    empty_polls: usize,
    text_error: bool,
    /// Extra time `navigate` takes.
    load_delay: Duration,
    /// Extra time each `element_text` call takes.
    text_delay: Duration,
}

impl FakePage {
    fn base() -> Self {
        Self {
            kind: PageKind::Elements(Vec::new()),
            empty_polls: 0,
            text_error: false,
            load_delay: Duration::ZERO,
            text_delay: Duration::ZERO,
        }
    }

    pub(crate) fn elements(texts: &[&str]) -> Self {
        Self {
            kind: PageKind::Elements(texts.iter().map(|t| (*t).to_owned()).collect()),
            ..Self::base()
        }
    }

    pub(crate) fn hang() -> Self {
        Self {
            kind: PageKind::Hang,
            ..Self::base()
        }
    }

    pub(crate) fn navigation_error() -> Self {
        Self {
            kind: PageKind::NavigationError,
            ..Self::base()
        }
    }

    pub(crate) fn appearing_after(mut self, polls: usize) -> Self {
        self.empty_polls = polls;
        self
    }

    pub(crate) fn with_text_error(mut self) -> Self {
        self.text_error = true;
        self
    }

    pub(crate) fn loading_for(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub(crate) fn with_text_delay(mut self, delay: Duration) -> Self {
        self.text_delay = delay;
        self
    }
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

#[derive(Default)]
pub(crate) struct FakeDriver {
    pages: HashMap<String, FakePage>,
    counters: Arc<Counters>,
    refuse_sessions: bool,
    probe_error: Option<String>,
    cancel_on_navigate: Option<(String, CancellationToken)>,
}

impl FakeDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_owned(), page);
        self
    }

    pub(crate) fn refusing_sessions(mut self) -> Self {
        self.refuse_sessions = true;
        self
    }

    pub(crate) fn failing_probe(mut self, reason: &str) -> Self {
        self.probe_error = Some(reason.to_owned());
        self
    }

    /// Cancels `token` when a session navigates to `url`.
    pub(crate) fn cancel_on_navigate(mut self, url: &str, token: CancellationToken) -> Self {
        self.cancel_on_navigate = Some((url.to_owned(), token));
        self
    }

    pub(crate) fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn navigations(&self) -> Vec<String> {
        self.counters.navigations.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn probe(&self) -> Result<(), ScraperError> {
        match &self.probe_error {
            Some(reason) => Err(ScraperError::DriverUnavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, ScraperError> {
        if self.refuse_sessions {
            return Err(ScraperError::DriverUnavailable {
                reason: "session not created".to_owned(),
            });
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            counters: Arc::clone(&self.counters),
            cancel_on_navigate: self.cancel_on_navigate.clone(),
            current: None,
            polls: 0,
            closed: false,
        }))
    }
}

struct FakeSession {
    pages: HashMap<String, FakePage>,
    counters: Arc<Counters>,
    cancel_on_navigate: Option<(String, CancellationToken)>,
    current: Option<FakePage>,
    polls: usize,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.counters.navigations.lock().unwrap().push(url.to_owned());
        if let Some((trigger, token)) = &self.cancel_on_navigate {
            if trigger == url {
                token.cancel();
            }
        }

        // Yield so concurrent sessions overlap.
        tokio::task::yield_now().await;

        let page = self.pages.get(url).cloned().unwrap_or_else(|| FakePage::elements(&[]));
        if !page.load_delay.is_zero() {
            tokio::time::sleep(page.load_delay).await;
        }
        match page.kind {
            PageKind::Hang => std::future::pending().await,
            PageKind::NavigationError => Err(ScraperError::WebDriver {
                command: "navigate",
                status: 500,
                error: "unknown error".to_owned(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_owned(),
            }),
            PageKind::Elements(_) => {
                self.current = Some(page);
                self.polls = 0;
                Ok(())
            }
        }
    }

    async fn find_elements(&mut self, _locator: &Locator) -> Result<Vec<ElementRef>, ScraperError> {
        let Some(page) = &self.current else {
            return Ok(Vec::new());
        };
        self.polls += 1;
        if self.polls <= page.empty_polls {
            return Ok(Vec::new());
        }
        match &page.kind {
            PageKind::Elements(texts) => Ok((0..texts.len())
                .map(|i| ElementRef(i.to_string()))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn element_text(&mut self, element: &ElementRef) -> Result<String, ScraperError> {
        let page = self.current.as_ref();
        if let Some(delay) = page.map(|p| p.text_delay).filter(|d| !d.is_zero()) {
            tokio::time::sleep(delay).await;
        }
        if page.is_some_and(|p| p.text_error) {
            return Err(ScraperError::WebDriver {
                command: "get element text",
                status: 404,
                error: "stale element reference".to_owned(),
                message: "element is not attached to the page document".to_owned(),
            });
        }
        let texts = match page.map(|p| &p.kind) {
            Some(PageKind::Elements(texts)) => texts,
            _ => return Ok(String::new()),
        };
        let index: usize = element.0.parse().unwrap();
        Ok(texts[index].clone())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
