//! Process configuration loaded from environment variables.
//!
//! [`AppConfig::from_env`] reads the real environment; [`AppConfig::from_lookup`]
//! takes any key lookup so tests can supply a map instead.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scenery_api::ServerConfig;
use scenery_db::{DataAccessConfig, ReadConsistency, RuntimeMode};

use crate::error::ConfigError;

/// Default pool size for each side.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default acquire timeout in milliseconds.
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5000;

/// Default per-pool drain timeout in milliseconds.
const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `json` (any case) selects [`LogFormat::Json`]; anything else is text.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Runtime mode from `APP_ENV`.
    pub mode: RuntimeMode,
    /// HTTP bind address.
    pub server: ServerConfig,
    /// Write and read pool settings.
    pub data: DataAccessConfig,
    /// Root of the static assets; `static/` below it is served at `/static`.
    pub public_dir: PathBuf,
    /// Token for the GitHub account lookup.
    pub github_token: Option<String>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- write (primary) connection string
    ///
    /// Optional variables:
    /// - `DATABASE_READ_URL` -- read connection string (default: `DATABASE_URL`)
    /// - `APP_ENV` -- `production` enables TLS without certificate verification
    /// - `HOST` -- bind address (default `0.0.0.0`)
    /// - `PORT` -- bind port (default `3000`)
    /// - `DB_MAX_CONNECTIONS` -- write pool size (default 10)
    /// - `DB_READ_MAX_CONNECTIONS` -- read pool size (default: write pool size)
    /// - `DB_ACQUIRE_TIMEOUT_MS` -- wait for a pooled connection (default 5000)
    /// - `DB_SHUTDOWN_TIMEOUT_MS` -- drain bound per pool (default 5000)
    /// - `READ_YOUR_WRITES_MS` -- pin written keys to the write pool (default 0, off)
    /// - `PUBLIC_DIR` -- static asset root (default `public`)
    /// - `GITHUB_TOKEN` -- token for `POST /getGithubAccountInfo`
    /// - `LOG_FORMAT` -- `json` for JSON logs
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = RuntimeMode::from_flag(get("APP_ENV").as_deref());

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
        };

        let max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let read_max_connections = parse_or(&get, "DB_READ_MAX_CONNECTIONS", max_connections)?;
        let acquire_timeout = Duration::from_millis(parse_or(
            &get,
            "DB_ACQUIRE_TIMEOUT_MS",
            DEFAULT_ACQUIRE_TIMEOUT_MS,
        )?);
        let shutdown_timeout = Duration::from_millis(parse_or(
            &get,
            "DB_SHUTDOWN_TIMEOUT_MS",
            DEFAULT_SHUTDOWN_TIMEOUT_MS,
        )?);
        let ryw_window = Duration::from_millis(parse_or(&get, "READ_YOUR_WRITES_MS", 0_u64)?);

        let mut data = DataAccessConfig::from_urls(
            get("DATABASE_URL").as_deref(),
            get("DATABASE_READ_URL").as_deref(),
            mode,
        )?
        .with_consistency(ReadConsistency::from_window(ryw_window))
        .with_shutdown_timeout(shutdown_timeout);
        data.write = data
            .write
            .with_max_connections(max_connections)
            .with_acquire_timeout(acquire_timeout);
        data.read = data
            .read
            .with_max_connections(read_max_connections)
            .with_acquire_timeout(acquire_timeout);

        Ok(Self {
            mode,
            server,
            data,
            public_dir: get("PUBLIC_DIR").map_or_else(|| PathBuf::from("public"), PathBuf::from),
            github_token: get("GITHUB_TOKEN"),
            log_format: LogFormat::from_flag(get("LOG_FORMAT").as_deref()),
        })
    }

    /// Directory served under `/static`.
    pub fn static_dir(&self) -> PathBuf {
        self.public_dir.join("static")
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use scenery_db::TlsPolicy;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn load_ok(vars: &[(&str, &str)]) -> AppConfig {
        load(vars).unwrap_or_else(|e| panic!("config failed: {e}"))
    }

    const PRIMARY: (&str, &str) = ("DATABASE_URL", "postgres://app:pw@primary:5432/app");

    #[test]
    fn defaults_with_only_database_url() {
        let config = load_ok(&[PRIMARY]);
        assert_eq!(config.mode, RuntimeMode::Development);
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.data.read.url, config.data.write.url);
        assert_eq!(config.data.write.max_connections, 10);
        assert_eq!(config.data.read.max_connections, 10);
        assert_eq!(config.data.write.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.data.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.data.consistency, ReadConsistency::Eventual);
        assert_eq!(config.static_dir(), PathBuf::from("public/static"));
        assert_eq!(config.github_token, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = load(&[("DATABASE_READ_URL", "postgres://r@replica/app")]);
        assert!(matches!(err, Err(ConfigError::Database(_))));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load_ok(&[PRIMARY, ("DATABASE_READ_URL", "  "), ("PORT", "")]);
        assert_eq!(config.data.read.url, config.data.write.url);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn production_requires_unverified_tls_on_both_pools() {
        let config = load_ok(&[
            PRIMARY,
            ("DATABASE_READ_URL", "postgres://app:pw@replica:5432/app"),
            ("APP_ENV", "production"),
        ]);
        assert_eq!(config.mode, RuntimeMode::Production);
        assert_eq!(config.data.write.tls, TlsPolicy::RequireUnverified);
        assert_eq!(config.data.read.tls, TlsPolicy::RequireUnverified);
        assert!(!config.data.shares_target());
    }

    #[test]
    fn pool_sizes_and_timeouts_are_configurable() {
        let config = load_ok(&[
            PRIMARY,
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_READ_MAX_CONNECTIONS", "16"),
            ("DB_ACQUIRE_TIMEOUT_MS", "250"),
            ("DB_SHUTDOWN_TIMEOUT_MS", "1500"),
            ("READ_YOUR_WRITES_MS", "2000"),
        ]);
        assert_eq!(config.data.write.max_connections, 4);
        assert_eq!(config.data.read.max_connections, 16);
        assert_eq!(config.data.read.acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.data.shutdown_timeout, Duration::from_millis(1500));
        assert_eq!(
            config.data.consistency,
            ReadConsistency::ReadYourWrites {
                window: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn read_pool_size_follows_write_pool_size() {
        let config = load_ok(&[PRIMARY, ("DB_MAX_CONNECTIONS", "3")]);
        assert_eq!(config.data.read.max_connections, 3);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = load(&[PRIMARY, ("PORT", "eighty")]);
        match err {
            Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, "PORT"),
            other => panic!("expected invalid PORT, got {other:?}"),
        }
    }

    #[test]
    fn log_format_flag() {
        assert_eq!(LogFormat::from_flag(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::from_flag(None), LogFormat::Text);
    }
}
