//! Environment-driven settings.

use std::path::PathBuf;

/// Database path override.
pub const DB_PATH_VAR: &str = "SCHEMALOG_DB";
/// SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_VAR: &str = "SCHEMALOG_BUSY_TIMEOUT_MS";
/// Maximum pooled connections.
pub const POOL_SIZE_VAR: &str = "SCHEMALOG_POOL_SIZE";

pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Parse an environment variable with a default fallback.
///
/// Unset variables return `default` silently; set but unparsable values log a
/// warning and return `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Database path from [`DB_PATH_VAR`], if set and non-empty.
pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DB_PATH_VAR).filter(|v| !v.is_empty()).map(PathBuf::from)
}
