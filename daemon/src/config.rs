//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to the legacy (unprefixed) variable names with warning logs.

use cryptic_daemon_common::config::DaemonConfig;

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use cryptic_daemon::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("DAEMON_PORT", "PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Falls back to `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get a boolean environment variable with fallback
///
/// `true/t/yes/y/1/on` (case-insensitive) are true, any other value is false.
pub fn get_env_with_fallback_bool(new_name: &str, old_name: &str, default: bool) -> bool {
    get_env_with_fallback(new_name, old_name)
        .map(|value| parse_bool(&value))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1" | "on"
    )
}

/// Load the daemon configuration from environment variables.
pub fn from_env() -> DaemonConfig {
    let defaults = DaemonConfig::default();

    DaemonConfig {
        host: get_env_with_fallback_or("DAEMON_HOST", "HOST", &defaults.host),
        port: get_env_with_fallback_parse("DAEMON_PORT", "PORT", defaults.port),
        debug: get_env_with_fallback_bool("DAEMON_DEBUG", "DEBUG", defaults.debug),
        api_token: get_env_with_fallback("DAEMON_API_TOKEN", "API_TOKEN")
            .filter(|token| !token.is_empty()),
        log_level: get_env_with_fallback_or("DAEMON_LOG_LEVEL", "LOG_LEVEL", &defaults.log_level),
        database_url: get_env_with_fallback_or(
            "DAEMON_DATABASE_URL",
            "DATABASE_URL",
            &defaults.database_url,
        ),
        pool_size: get_env_with_fallback_parse("DAEMON_POOL_SIZE", "POOL_SIZE", defaults.pool_size),
        pool_recycle_secs: get_env_with_fallback_parse(
            "DAEMON_POOL_RECYCLE_SECS",
            "POOL_RECYCLE",
            defaults.pool_recycle_secs,
        ),
        sql_show_statements: get_env_with_fallback_bool(
            "DAEMON_SQL_SHOW_STATEMENTS",
            "SQL_SHOW_STATEMENTS",
            defaults.sql_show_statements,
        ),
        sql_create_tables: get_env_with_fallback_bool(
            "DAEMON_SQL_CREATE_TABLES",
            "SQL_CREATE_TABLES",
            defaults.sql_create_tables,
        ),
        list_disabled: get_env_with_fallback_bool(
            "DAEMON_LIST_DISABLED",
            "DAEMON_LIST_DISABLED",
            defaults.list_disabled,
        ),
        sentry_dsn: get_env_with_fallback("DAEMON_SENTRY_DSN", "SENTRY_DSN")
            .filter(|dsn| !dsn.trim().is_empty()),
    }
}
