use super::types::Config;
use crate::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config, AppError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Config, AppError> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        debug!(path = %config_path.display(), "loading config");
        ConfigLoader::load_from_path(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the config file path (`$EBSCOST_CONFIG` or ~/.ebscost/config.toml)
    pub fn get_config_path() -> PathBuf {
        if let Ok(path) = std::env::var("EBSCOST_CONFIG") {
            return PathBuf::from(path);
        }

        if let Some(home) = dirs::home_dir() {
            home.join(".ebscost").join("config.toml")
        } else {
            PathBuf::from(".ebscost/config.toml")
        }
    }

    /// Initialize config directory and create default config
    pub fn init() -> Result<(), AppError> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
            println!("Created config at {}", config_path.display());
        } else {
            println!("Config already exists at {}", config_path.display());
        }

        Ok(())
    }

    /// Validate configuration
    pub fn check(&self) -> Result<(), AppError> {
        if self.aws.profile.trim().is_empty() {
            return Err(AppError::Config("aws.profile must not be empty".to_string()));
        }

        url::Url::parse(&self.pricing.endpoint).map_err(|e| {
            AppError::Config(format!(
                "pricing.endpoint '{}' is not a valid URL: {}",
                self.pricing.endpoint, e
            ))
        })?;

        if let Some(endpoint) = &self.aws.ec2_endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                AppError::Config(format!(
                    "aws.ec2_endpoint '{}' is not a valid URL: {}",
                    endpoint, e
                ))
            })?;
        }

        if self.pricing.signing_region.trim().is_empty() {
            return Err(AppError::Config(
                "pricing.signing_region must not be empty".to_string(),
            ));
        }

        if self.pricing.timeout_secs == 0 {
            return Err(AppError::Config(
                "pricing.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Print configuration as TOML
    pub fn print(&self) -> Result<(), AppError> {
        let content = toml::to_string_pretty(self)?;
        println!("{}", content);
        Ok(())
    }
}
