//! Plain-text rendering for command output.

use std::fmt::Write as _;

use pricewatch_core::{BatchResult, Target};

pub(crate) const EMPTY_CATALOG_HINT: &str =
    "catalog is empty; add targets with `pricewatch import <FILE>`";

/// One `name: value` line per target, sorted by name.
pub(crate) fn format_results(results: &BatchResult) -> String {
    let mut out = String::new();
    for (name, result) in results.sorted() {
        let _ = writeln!(out, "{name}: {result}");
    }
    out
}

/// Numbered listing of a catalog, one block per target.
pub(crate) fn format_catalog(targets: &[Target]) -> String {
    let mut out = String::new();
    for (index, target) in targets.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, target.name);
        let _ = writeln!(out, "   url:     {}", target.location);
        let _ = writeln!(out, "   locator: {}", target.locator);
    }
    out
}

#[cfg(test)]
mod tests {
    use pricewatch_core::TargetResult;

    use super::*;

    #[test]
    fn results_are_sorted_and_formatted() {
        let mut results = BatchResult::default();
        results.insert("zeta", TargetResult::NoPriceFound);
        results.insert("alpha", TargetResult::Average(1234.567));
        results.insert("mid", TargetResult::Average(10.0));

        assert_eq!(
            format_results(&results),
            "alpha: 1234.57\nmid: 10.00\nzeta: price not found\n"
        );
    }

    #[test]
    fn empty_results_render_nothing() {
        assert_eq!(format_results(&BatchResult::default()), "");
    }

    #[test]
    fn catalog_lists_every_field() {
        let targets = vec![
            Target::new("Kettle", "https://shop.example/kettle", "//span[@class='price']"),
            Target::new("Toaster", "https://shop.example/toaster", "css=.price"),
        ];

        let out = format_catalog(&targets);
        assert!(out.starts_with("1. Kettle\n"));
        assert!(out.contains("   url:     https://shop.example/kettle\n"));
        assert!(out.contains("2. Toaster\n"));
        assert!(out.contains("   locator: css=.price\n"));
    }
}
