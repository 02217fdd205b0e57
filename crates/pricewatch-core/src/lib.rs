pub mod app_config;
pub mod catalog;
pub mod config;
pub mod targets;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    load_targets, parse_csv_targets, parse_workbook_targets, parse_yaml_targets, REQUIRED_COLUMNS,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use targets::{BatchResult, Target, TargetResult, PRICE_NOT_FOUND};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported catalog format \"{path}\": expected .csv, .xlsx, .xls, .yaml or .yml")]
    UnsupportedCatalogFormat { path: String },

    #[error("catalog is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("failed to parse CSV catalog: {0}")]
    CatalogCsv(#[from] csv::Error),

    #[error("failed to parse YAML catalog: {0}")]
    CatalogYaml(#[from] serde_yaml::Error),

    #[error("failed to read workbook catalog: {0}")]
    CatalogWorkbook(#[from] calamine::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}
