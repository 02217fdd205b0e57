use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Upper bound on concurrently open browser sessions.
pub const MAX_CONCURRENT_TARGETS: usize = 5;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PRICEWATCH_DB_MAX_CONNECTIONS", "5")?;
    if db_max_connections == 0 {
        return Err(invalid(
            "PRICEWATCH_DB_MAX_CONNECTIONS",
            "must be at least 1".to_string(),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("PRICEWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let webdriver_url = or_default("PRICEWATCH_WEBDRIVER_URL", "http://localhost:9515");
    let browser_headless = parse_bool(
        "PRICEWATCH_BROWSER_HEADLESS",
        &or_default("PRICEWATCH_BROWSER_HEADLESS", "true"),
    )?;
    let browser_window = parse_window(
        "PRICEWATCH_BROWSER_WINDOW",
        &or_default("PRICEWATCH_BROWSER_WINDOW", "1920x1080"),
    )?;

    let scraper_wait_timeout_secs = parse_u64("PRICEWATCH_SCRAPER_WAIT_TIMEOUT_SECS", "10")?;
    let scraper_poll_interval_ms = parse_u64("PRICEWATCH_SCRAPER_POLL_INTERVAL_MS", "250")?;
    let scraper_request_timeout_secs =
        parse_u64("PRICEWATCH_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_max_concurrent_targets =
        parse_usize("PRICEWATCH_SCRAPER_MAX_CONCURRENT_TARGETS", "1")?;
    if !(1..=MAX_CONCURRENT_TARGETS).contains(&scraper_max_concurrent_targets) {
        return Err(invalid(
            "PRICEWATCH_SCRAPER_MAX_CONCURRENT_TARGETS",
            format!("must be between 1 and {MAX_CONCURRENT_TARGETS}, got {scraper_max_concurrent_targets}"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_acquire_timeout_secs,
        webdriver_url,
        browser_headless,
        browser_window,
        scraper_wait_timeout_secs,
        scraper_poll_interval_ms,
        scraper_request_timeout_secs,
        scraper_max_concurrent_targets,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Parses a `WIDTHxHEIGHT` viewport such as `1920x1080`.
fn parse_window(var: &str, raw: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: format!("expected WIDTHxHEIGHT, got \"{raw}\""),
    };

    let (w, h) = raw.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
