//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Fiscal-year cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Accounting defaults (precision, number format, chart templates).
    #[serde(default)]
    pub accounting: AccountingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Fiscal-year cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached fiscal-year list stays valid.
    #[serde(default = "default_fiscal_year_ttl")]
    pub fiscal_year_ttl_secs: u64,
    /// Maximum number of organizations kept in the cache.
    #[serde(default = "default_fiscal_year_capacity")]
    pub fiscal_year_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fiscal_year_ttl_secs: default_fiscal_year_ttl(),
            fiscal_year_capacity: default_fiscal_year_capacity(),
        }
    }
}

fn default_fiscal_year_ttl() -> u64 {
    3600
}

fn default_fiscal_year_capacity() -> u64 {
    256
}

/// Accounting defaults shared by every organization.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountingConfig {
    /// Explicit currency precision; 0 means "derive from number format".
    #[serde(default)]
    pub currency_precision: u32,
    /// Display number format, e.g. `#,###.##`.
    #[serde(default = "default_number_format")]
    pub number_format: String,
    /// Directory holding chart-of-accounts templates (`<name>.json`).
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            currency_precision: 0,
            number_format: default_number_format(),
            charts_dir: default_charts_dir(),
        }
    }
}

fn default_number_format() -> String {
    "#,###.##".to_string()
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("charts")
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `BURSAR__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BURSAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("BURSAR__DATABASE__URL", Some("postgres://localhost/bursar_test")),
                ("BURSAR__SERVER__PORT", Some("9090")),
                ("BURSAR__ACCOUNTING__CURRENCY_PRECISION", Some("3")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/bursar_test");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.accounting.currency_precision, 3);
                assert_eq!(config.accounting.number_format, "#,###.##");
                assert_eq!(config.cache.fiscal_year_ttl_secs, 3600);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["BURSAR__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_defaults() {
        let accounting = AccountingConfig::default();
        assert_eq!(accounting.currency_precision, 0);
        assert_eq!(accounting.charts_dir, PathBuf::from("charts"));

        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }
}
