//! Price-text normalization.
//!
//! Turns whatever text a price element renders (`"1 234,56 ₽"`,
//! `"$1,234.56"`, `"1.234.567,89"`) into an `f64`. The grammar is
//! deliberately lenient: everything except ASCII digits and the two
//! separator characters is noise.
//!
//! Separator policy: `,` and `.` are interchangeable. When more than one
//! separator remains, every separator but the last is a thousands grouping
//! and the last one is the decimal point, whatever the group widths are.
//! `"1.234.567"` therefore reads as `1234.567`, not `1234567`.

/// Normalizes raw element text into a price.
///
/// Returns `None` when the text holds no digits or does not reduce to a
/// finite decimal numeral. Never panics.
#[must_use]
pub fn normalize_price(text: &str) -> Option<f64> {
    // Whitespace (including U+00A0 and U+202F) falls out with the rest of
    // the non-numeric noise.
    let unified: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let numeral = collapse_group_separators(&unified);
    if !numeral.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    numeral.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Keeps only the last `.` as the decimal point; earlier ones are dropped
/// as thousands separators.
fn collapse_group_separators(unified: &str) -> String {
    match unified.rfind('.') {
        Some(last) if unified[..last].contains('.') => {
            let mut numeral: String = unified[..last].chars().filter(|c| *c != '.').collect();
            numeral.push_str(&unified[last..]);
            numeral
        }
        _ => unified.to_owned(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
