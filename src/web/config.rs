use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: DefaultSettings,
    #[serde(default)]
    pub predict: Option<PredictConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Built front-end; unknown paths are answered with its `index.html`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub base_folder: PathBuf,
}

/// Settings served to a browser that has saved nothing yet.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultSettings {
    pub station_longitude: f64,
    pub station_latitude: f64,
    pub prediction_hours: u32,
    pub minimum_elevation: f64,
    pub satellites: Vec<u32>,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            station_longitude: -73.43,
            station_latitude: 45.51,
            prediction_hours: 24,
            minimum_elevation: 5.0,
            satellites: vec![25338, 28654, 33591, 38771, 43689, 37214, 25544],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    pub tle_folder: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Entry point of the external identity provider.
    #[serde(default)]
    pub login_url: Option<String>,
    /// Tokens the provider hands back on `/auth`, one per account.
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub token: String,
    pub email: String,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn find_account(&self, token: &str) -> Option<&Account> {
        self.auth.accounts.iter().find(|a| a.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_yaml("storage:\n  base_folder: /tmp/pass-board\n").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert!(config.predict.is_none());
        assert_eq!(config.defaults.satellites.len(), 7);
        assert_eq!(config.defaults.prediction_hours, 24);
        assert!(config.auth.login_url.is_none());
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
web:
  bind: 127.0.0.1:5000
  static_dir: frontend/build
storage:
  base_folder: data/accounts
defaults:
  station_longitude: 2.35
  station_latitude: 48.85
  prediction_hours: 12
  minimum_elevation: 10.0
  satellites: [25544]
predict:
  tle_folder: data/tle
auth:
  login_url: https://id.example.com/authorize
  accounts:
    - token: s3cret
      email: ops@example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:5000");
        assert_eq!(config.defaults.satellites, vec![25544]);
        assert_eq!(
            config.predict.as_ref().unwrap().tle_folder,
            PathBuf::from("data/tle")
        );
        assert_eq!(
            config.find_account("s3cret").map(|a| a.email.as_str()),
            Some("ops@example.com")
        );
        assert!(config.find_account("wrong").is_none());
    }

    #[test]
    fn missing_storage_is_an_error() {
        assert!(matches!(
            Config::from_yaml("web:\n  bind: 0.0.0.0:1\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
