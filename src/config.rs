//! Configuration management

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Public URL used in robots.txt and sitemap.xml (e.g., "https://virallink.com")
    #[serde(default)]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file, created if missing
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub password: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

fn default_session_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
    #[serde(default = "default_visitor_page_size")]
    pub visitor_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            visitor_page_size: default_visitor_page_size(),
        }
    }
}

fn default_page_size() -> i64 {
    6
}

fn default_max_page_size() -> i64 {
    100
}

fn default_visitor_page_size() -> i64 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailConfig {
    /// Timeout applied to each HEAD probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!("virallink/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";

        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("VIRALLINK")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.http_port == 0 {
            anyhow::bail!("Invalid http_port: 0 is not allowed");
        }
        if self.server.host.is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.admin.password.is_empty() {
            anyhow::bail!("Admin password cannot be empty");
        }
        if self.admin.session_ttl_hours <= 0 {
            anyhow::bail!("Invalid session_ttl_hours: must be positive");
        }

        if self.catalog.default_page_size <= 0 || self.catalog.visitor_page_size <= 0 {
            anyhow::bail!("Page sizes must be positive");
        }
        if self.catalog.max_page_size < self.catalog.default_page_size {
            anyhow::bail!(
                "max_page_size ({}) cannot be smaller than default_page_size ({})",
                self.catalog.max_page_size,
                self.catalog.default_page_size
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("Invalid logging level '{}'. Must be one of: {:?}", self.logging.level, valid_levels);
        }

        Ok(())
    }

    /// Base URL for crawler files, without a trailing slash
    pub fn public_base_url(&self) -> String {
        if self.server.public_url.is_empty() {
            format!("http://{}:{}", self.server.host, self.server.http_port)
        } else {
            self.server.public_url.trim_end_matches('/').to_string()
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            http_port: 3000,
            public_url: "https://virallink.test/".to_string(),
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        admin: AdminConfig {
            password: "letmein".to_string(),
            session_ttl_hours: 24,
        },
        catalog: CatalogConfig::default(),
        thumbnails: ThumbnailConfig::default(),
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn rejects_empty_admin_password() {
        let mut config = test_config();
        config.admin.password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = test_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_max_page_size_below_default() {
        let mut config = test_config();
        config.catalog.max_page_size = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn public_base_url_strips_trailing_slash() {
        assert_eq!(test_config().public_base_url(), "https://virallink.test");

        let mut config = test_config();
        config.server.public_url.clear();
        assert_eq!(config.public_base_url(), "http://127.0.0.1:3000");
    }
}
