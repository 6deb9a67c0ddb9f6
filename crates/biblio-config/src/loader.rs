//! Configuration loader with layered sources.

use crate::{AppConfig, StorageDriver};
use biblio_core::BiblioError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration loader with runtime refresh support.
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
    environment: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides (not committed)
    /// 4. Environment variables with `BIBLIO_` prefix
    ///
    /// The environment comes from `BIBLIO_ENVIRONMENT`, defaulting to
    /// `development`.
    pub fn new(config_dir: impl Into<String>) -> Result<Self, BiblioError> {
        let environment =
            std::env::var("BIBLIO_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        Self::with_environment(config_dir, environment)
    }

    /// Creates a loader for an explicit environment name, bypassing
    /// `BIBLIO_ENVIRONMENT`.
    pub fn with_environment(
        config_dir: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, BiblioError> {
        let config_dir = config_dir.into();
        let environment = environment.into();
        let config = Self::load_config(&config_dir, &environment)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
            environment,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, BiblioError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), BiblioError> {
        let new_config = Self::load_config(&self.config_dir, &self.environment)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str, environment: &str) -> Result<AppConfig, BiblioError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        // 1. Load default configuration
        let default_path = format!("{}/default.toml", config_dir);
        if Path::new(&default_path).exists() {
            debug!("Loading default config from: {}", default_path);
            builder = builder.add_source(File::with_name(&default_path).required(false));
        }

        // 2. Load environment-specific configuration
        let env_path = format!("{}/{}.toml", config_dir, environment);
        if Path::new(&env_path).exists() {
            debug!("Loading environment config from: {}", env_path);
            builder = builder.add_source(File::with_name(&env_path).required(false));
        }

        // 3. Load local overrides (not committed to version control)
        let local_path = format!("{}/local.toml", config_dir);
        if Path::new(&local_path).exists() {
            debug!("Loading local config from: {}", local_path);
            builder = builder.add_source(File::with_name(&local_path).required(false));
        }

        // 4. Override with environment variables (BIBLIO_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("BIBLIO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_biblio_error)?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_biblio_error)?;
        app_config.app.environment = environment.to_string();

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), BiblioError> {
        if config.database.driver == StorageDriver::MySql && config.database.url.is_empty() {
            return Err(BiblioError::configuration(
                "Database URL is required for the mysql driver".to_string(),
            ));
        }

        if config.database.max_connections == 0 {
            return Err(BiblioError::configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }

        // The memory driver loses all data on process exit.
        if config.app.environment == "production" && config.database.driver == StorageDriver::Memory
        {
            warn!("Using the in-memory storage driver in production! Data will not survive restarts.");
        }

        Ok(())
    }

    /// Gets a specific configuration value by key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

fn config_error_to_biblio_error(err: ConfigError) -> BiblioError {
    BiblioError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("Failed to write config file");
    }

    #[tokio::test]
    async fn test_missing_directory_falls_back_to_defaults() {
        let loader = ConfigLoader::with_environment("./does-not-exist", "development").unwrap();
        let config = loader.get().await;
        assert_eq!(config.app.name, "biblio");
        assert_eq!(config.database.driver, StorageDriver::Memory);
    }

    #[tokio::test]
    async fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "default.toml",
            r#"
            [database]
            driver = "memory"
            max_connections = 10
            "#,
        );
        write_config(
            dir.path(),
            "test.toml",
            r#"
            [database]
            max_connections = 2
            "#,
        );

        let loader =
            ConfigLoader::with_environment(dir.path().to_str().unwrap(), "test").unwrap();
        let config = loader.get().await;
        assert_eq!(config.app.environment, "test");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.driver, StorageDriver::Memory);
    }

    #[tokio::test]
    async fn test_mysql_driver_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "default.toml",
            r#"
            [database]
            driver = "mysql"
            url = ""
            "#,
        );

        let err = ConfigLoader::with_environment(dir.path().to_str().unwrap(), "development")
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_value_by_key_path() {
        let loader = ConfigLoader::with_environment("./does-not-exist", "development").unwrap();
        let max: Option<u32> = loader.get_value("database.max_connections").await;
        assert_eq!(max, Some(10));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "default.toml",
            r#"
            [app]
            name = "biblio"
            "#,
        );

        let loader =
            ConfigLoader::with_environment(dir.path().to_str().unwrap(), "development").unwrap();
        assert_eq!(loader.get().await.database.max_connections, 10);

        write_config(
            dir.path(),
            "default.toml",
            r#"
            [database]
            max_connections = 3
            "#,
        );
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.database.max_connections, 3);
    }
}
