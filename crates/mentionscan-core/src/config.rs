//! Environment-based configuration loading and validation.
//!
//! Range limits on the search knobs are enforced here, at load time, so the
//! search core never sees an out-of-range value.

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is unparseable or out of range.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is unparseable or out of range.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("MENTIONSCAN_ENV", "development"));
    let log_level = or_default("MENTIONSCAN_LOG_LEVEL", "info");
    let user_agent = or_default("MENTIONSCAN_USER_AGENT", "mentionscan/0.1 (mention-search)");

    let cache_expiry_minutes = parse_u32("MENTIONSCAN_CACHE_EXPIRY_MINUTES", "30")?;
    check_range(
        "MENTIONSCAN_CACHE_EXPIRY_MINUTES",
        u64::from(cache_expiry_minutes),
        5,
        1440,
    )?;

    let max_concurrent_jobs = parse_usize("MENTIONSCAN_MAX_CONCURRENT_JOBS", "5")?;
    check_range(
        "MENTIONSCAN_MAX_CONCURRENT_JOBS",
        max_concurrent_jobs as u64,
        1,
        20,
    )?;

    let retry_attempts = parse_u32("MENTIONSCAN_RETRY_ATTEMPTS", "2")?;
    check_range("MENTIONSCAN_RETRY_ATTEMPTS", u64::from(retry_attempts), 0, 10)?;

    let timeout_seconds = parse_u64("MENTIONSCAN_TIMEOUT_SECONDS", "30")?;
    check_range("MENTIONSCAN_TIMEOUT_SECONDS", timeout_seconds, 5, 300)?;

    let retry_backoff_base_ms = parse_u64("MENTIONSCAN_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        env,
        log_level,
        cache_expiry_minutes,
        max_concurrent_jobs,
        retry_attempts,
        timeout_seconds,
        retry_backoff_base_ms,
        user_agent,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Validate an already-parsed value against its documented inclusive range.
fn check_range(var: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            var: var.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
