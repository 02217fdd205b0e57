//! WebDriver endpoint URL handling.

use reqwest::Url;

use crate::error::ScraperError;

/// Parses the configured WebDriver base URL.
///
/// Accepts both bare servers (`http://localhost:9515`) and path-prefixed
/// grids (`http://selenium:4444/wd/hub`).
///
/// # Errors
///
/// Returns [`ScraperError::InvalidEndpoint`] if `raw` is not an absolute
/// `http`/`https` URL that can carry path segments.
pub fn parse_endpoint(raw: &str) -> Result<Url, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidEndpoint {
        endpoint: raw.to_owned(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_owned()));
    }
    Ok(url)
}

/// Appends command path segments to `base`, e.g. `["session", id, "url"]`.
///
/// Segments are percent-encoded individually, so driver-issued ids never
/// alter the path structure.
pub(super) fn command_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Hostname of a page address for log fields; falls back to the raw string.
#[must_use]
pub fn extract_domain(location: &str) -> String {
    Url::parse(location)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| location.to_owned())
}
