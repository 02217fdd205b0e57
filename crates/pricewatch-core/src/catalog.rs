//! Catalog ingestion: turns an uploaded spreadsheet (Excel workbook or CSV
//! export) or a YAML catalog file into a validated list of [`Target`]s.
//!
//! Every format uses the spreadsheet's column names: `title`, `url`, `xpath`.

use std::io::Read;
use std::path::Path;

use calamine::Reader;
use serde::Deserialize;

use crate::targets::Target;
use crate::ConfigError;

/// Columns every catalog must carry, in spreadsheet order.
pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "url", "xpath"];

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    xpath: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    targets: Vec<CatalogRow>,
}

/// Load and validate a catalog file, choosing the parser by file extension.
///
/// # Errors
///
/// Returns `ConfigError` if the extension is not `.csv`, `.xlsx`, `.xls`,
/// `.yaml` or `.yml`, the file cannot be read or parsed, or any row fails
/// validation.
pub fn load_targets(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let io_err = |source| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source,
    };

    match extension.as_deref() {
        Some("csv") => {
            let file = std::fs::File::open(path).map_err(io_err)?;
            parse_csv_targets(file)
        }
        Some("xlsx" | "xlsm" | "xls") => parse_workbook_targets(path),
        Some("yaml" | "yml") => {
            let content = std::fs::read_to_string(path).map_err(io_err)?;
            parse_yaml_targets(&content)
        }
        _ => Err(ConfigError::UnsupportedCatalogFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Parse a CSV catalog with a header row.
///
/// Header names are matched case-insensitively and may appear in any order;
/// extra columns are ignored. Fully blank rows are skipped. A header-only
/// file yields an empty list.
///
/// # Errors
///
/// Returns [`ConfigError::MissingColumns`] listing every absent required
/// column, [`ConfigError::CatalogCsv`] on malformed CSV, or
/// [`ConfigError::Validation`] when a row has an empty required cell.
pub fn parse_csv_targets<R: Read>(reader: R) -> Result<Vec<Target>, ConfigError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let columns = locate_columns(&headers)?;

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        // Row 1 is the header.
        rows.push((idx + 2, columns.row(|i| record.get(i))));
    }

    validate_rows(rows)
}

/// Parse the first sheet of an Excel workbook (`.xlsx`, `.xlsm`, `.xls`).
///
/// The first non-empty row is the header, matched like the CSV header. Row
/// numbers in validation errors are sheet row numbers.
///
/// # Errors
///
/// Returns [`ConfigError::CatalogWorkbook`] if the file cannot be opened or
/// has no readable sheet, [`ConfigError::MissingColumns`] listing every
/// absent required column, or [`ConfigError::Validation`] when a row has an
/// empty required cell.
pub fn parse_workbook_targets(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ConfigError::Validation("workbook has no sheets".to_string()))??;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    let columns = locate_columns(&headers)?;

    let rows = sheet_rows
        .enumerate()
        .map(|(idx, cells)| {
            let text = |i: usize| cells.get(i).map(ToString::to_string);
            // Sheet rows are 1-based and the header takes the first one.
            (first_row + idx + 2, columns.row(text))
        })
        .collect();

    validate_rows(rows)
}

/// Parse a YAML catalog of the form `targets: [{title, url, xpath}, ...]`.
///
/// # Errors
///
/// Returns [`ConfigError::CatalogYaml`] on malformed YAML or
/// [`ConfigError::Validation`] when an entry has an empty field.
pub fn parse_yaml_targets(content: &str) -> Result<Vec<Target>, ConfigError> {
    let file: CatalogFile = serde_yaml::from_str(content)?;
    let rows = file
        .targets
        .into_iter()
        .enumerate()
        .map(|(idx, row)| (idx + 1, row))
        .collect();
    validate_rows(rows)
}

/// Header positions of the required columns.
struct Columns {
    title: usize,
    url: usize,
    xpath: usize,
}

impl Columns {
    fn row<F, S>(&self, cell: F) -> CatalogRow
    where
        F: Fn(usize) -> Option<S>,
        S: AsRef<str>,
    {
        let text = |i: usize| cell(i).map(|s| s.as_ref().to_string()).unwrap_or_default();
        CatalogRow {
            title: text(self.title),
            url: text(self.url),
            xpath: text(self.xpath),
        }
    }
}

/// Finds every required column by case-insensitive header match.
fn locate_columns(headers: &[String]) -> Result<Columns, ConfigError> {
    let position = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
    };

    match REQUIRED_COLUMNS.map(position) {
        [Some(title), Some(url), Some(xpath)] => Ok(Columns { title, url, xpath }),
        found => Err(ConfigError::MissingColumns(
            REQUIRED_COLUMNS
                .iter()
                .zip(found)
                .filter(|(_, position)| position.is_none())
                .map(|(&column, _)| column.to_string())
                .collect(),
        )),
    }
}

fn validate_rows(rows: Vec<(usize, CatalogRow)>) -> Result<Vec<Target>, ConfigError> {
    let mut targets = Vec::with_capacity(rows.len());

    for (row_number, row) in rows {
        let title = row.title.trim();
        let url = row.url.trim();
        let xpath = row.xpath.trim();

        if title.is_empty() && url.is_empty() && xpath.is_empty() {
            continue;
        }

        let empty: Vec<&str> = [("title", title), ("url", url), ("xpath", xpath)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(column, _)| column)
            .collect();
        if !empty.is_empty() {
            return Err(ConfigError::Validation(format!(
                "row {row_number} has empty {}",
                empty.join(", ")
            )));
        }

        targets.push(Target::new(title, url, xpath));
    }

    Ok(targets)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
