use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};

/// Literal used when a target yields no usable price, both for display and
/// in the serialized form of [`TargetResult::NoPriceFound`].
pub const PRICE_NOT_FOUND: &str = "price not found";

/// One monitored page: where to go and which elements hold the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Display label; keys the entry in [`BatchResult`].
    pub name: String,
    /// Page address handed to the browser as-is.
    pub location: String,
    /// XPath expression, or a CSS selector when prefixed with `css=`.
    pub locator: String,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            locator: locator.into(),
        }
    }
}

/// Final outcome for a single target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetResult {
    /// Unweighted mean of every price parsed from the matched elements.
    Average(f64),
    /// Nothing matched, nothing parsed, or the page could not be read.
    NoPriceFound,
}

impl TargetResult {
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        match self {
            TargetResult::Average(value) => Some(*value),
            TargetResult::NoPriceFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, TargetResult::Average(_))
    }
}

impl std::fmt::Display for TargetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetResult::Average(value) => write!(f, "{value:.2}"),
            TargetResult::NoPriceFound => f.write_str(PRICE_NOT_FOUND),
        }
    }
}

impl Serialize for TargetResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TargetResult::Average(value) => serializer.serialize_f64(*value),
            TargetResult::NoPriceFound => serializer.serialize_str(PRICE_NOT_FOUND),
        }
    }
}

/// Per-target outcomes of one batch run, keyed by [`Target::name`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    entries: HashMap<String, TargetResult>,
}

impl BatchResult {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Records the outcome for `name`, returning the outcome it replaced when
    /// two targets share a name.
    pub fn insert(&mut self, name: impl Into<String>, result: TargetResult) -> Option<TargetResult> {
        self.entries.insert(name.into(), result)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TargetResult> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    /// Entries ordered by name, for stable presentation.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &TargetResult)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    #[must_use]
    pub fn into_inner(self) -> HashMap<String, TargetResult> {
        self.entries
    }
}
