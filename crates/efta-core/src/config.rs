use crate::app_config::{AppConfig, Environment, RecommendationConfig};
use crate::ConfigError;

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
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("EFTA_ENV", "development"))?;

    let bind_addr: SocketAddr =
        parse_as("EFTA_BIND_ADDR", &or_default("EFTA_BIND_ADDR", "0.0.0.0:3000"))?;
    let log_level = or_default("EFTA_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("EFTA_CATALOG_PATH", "./config/catalog.yaml"));

    let db_max_connections: u32 = parse_as(
        "EFTA_DB_MAX_CONNECTIONS",
        &or_default("EFTA_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "EFTA_DB_MIN_CONNECTIONS",
        &or_default("EFTA_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "EFTA_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("EFTA_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let default_limit: usize = parse_as(
        "EFTA_SIMILAR_DEFAULT_LIMIT",
        &or_default("EFTA_SIMILAR_DEFAULT_LIMIT", "8"),
    )?;
    let max_limit: usize = parse_as(
        "EFTA_SIMILAR_MAX_LIMIT",
        &or_default("EFTA_SIMILAR_MAX_LIMIT", "50"),
    )?;
    if default_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "EFTA_SIMILAR_DEFAULT_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if max_limit < default_limit {
        return Err(ConfigError::InvalidEnvVar {
            var: "EFTA_SIMILAR_MAX_LIMIT".to_string(),
            reason: format!("must be >= EFTA_SIMILAR_DEFAULT_LIMIT ({default_limit})"),
        });
    }

    let rate_limit_max_requests: usize = parse_as(
        "EFTA_RATE_LIMIT_MAX_REQUESTS",
        &or_default("EFTA_RATE_LIMIT_MAX_REQUESTS", "120"),
    )?;
    let rate_limit_window_secs: u64 = parse_as(
        "EFTA_RATE_LIMIT_WINDOW_SECS",
        &or_default("EFTA_RATE_LIMIT_WINDOW_SECS", "60"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        recommendations: RecommendationConfig {
            default_limit,
            max_limit,
        },
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a raw env value, naming the variable in the error.
fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "EFTA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
