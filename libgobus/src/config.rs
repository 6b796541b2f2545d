//! Configuration management for GoBus

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

fn default_timeout_secs() -> u64 {
    25
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default_config())
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://go-by-bus.vercel.app/api/".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            database: DatabaseConfig {
                path: "~/.local/share/gobus/state.db".to_string(),
            },
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("GOBUS_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("gobus").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("gobus"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.api.base_url, "https://go-by-bus.vercel.app/api/");
        assert_eq!(config.api.timeout_secs, 25);
        assert!(config.database.path.ends_with("state.db"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[api]
base_url = "https://staging.gobus.example/api/"
timeout_secs = 10

[database]
path = "/tmp/gobus-test.db"
"#
        )
        .unwrap();

        let config = Config::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.api.base_url, "https://staging.gobus.example/api/");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.database.path, "/tmp/gobus-test.db");
    }

    #[test]
    fn test_timeout_defaults_when_omitted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[api]
base_url = "https://staging.gobus.example/api/"

[database]
path = "/tmp/gobus-test.db"
"#
        )
        .unwrap();

        let config = Config::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.api.timeout_secs, 25);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = Config::load_from_path(&PathBuf::from("/nonexistent/gobus.toml"));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_config_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[api]
base_url = "https://env.gobus.example/api/"

[database]
path = "/tmp/gobus-env.db"
"#
        )
        .unwrap();

        std::env::set_var("GOBUS_CONFIG", file.path());
        let resolved = resolve_config_path().unwrap();
        assert_eq!(resolved, file.path().to_path_buf());

        let config = Config::load().unwrap();
        assert_eq!(config.api.base_url, "https://env.gobus.example/api/");
        std::env::remove_var("GOBUS_CONFIG");
    }
}
