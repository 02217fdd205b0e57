//! Browser-driven price scraping: read each catalog target through a
//! WebDriver session, normalize the matched text, and average per target.

pub mod batch;
pub mod client;
pub mod driver;
pub mod error;
pub mod normalize;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{average_readings, BatchAverager, ScanOptions};
pub use client::{WebDriverClient, WebDriverConfig, WebDriverSession};
pub use driver::{BrowserDriver, BrowserSession, ElementRef, Locator};
pub use error::ScraperError;
pub use normalize::normalize_price;
pub use reader::{FetchFailure, RawReading, ReaderOptions, TargetReader};
