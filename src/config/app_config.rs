use std::time::Duration;

use serde::Deserialize;

use crate::api::v1::DEFAULT_MAX_BODY_BYTES;
use crate::domain::DomainError;
use crate::infrastructure::backend::HttpBackendConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::store::{StoreConfig, StoreType};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendSettings>,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound of JSON request bodies; images travel inline as data URLs
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Store section; `backend` is `redis` or `in_memory`
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

/// One algorithm service
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendSettings {
    pub id: String,
    pub url: String,
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_store_backend() -> String {
    "redis".to_string()
}

fn default_store_url() -> String {
    "redis://redis:6379".to_string()
}

fn default_connection_timeout_secs() -> u64 {
    5
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_backends() -> Vec<BackendSettings> {
    vec![BackendSettings {
        id: "alg1".to_string(),
        url: "http://algorithm:80".to_string(),
        timeout_secs: default_backend_timeout_secs(),
    }]
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            store: StoreSettings::default(),
            backends: default_backends(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: default_store_url(),
            key_prefix: None,
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl StoreSettings {
    pub fn to_store_config(&self) -> Result<StoreConfig, DomainError> {
        let store_type: StoreType = self.backend.parse()?;

        let mut config = match store_type {
            StoreType::InMemory => StoreConfig::in_memory(),
            StoreType::Redis => StoreConfig::redis(self.url.clone()),
        }
        .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs));

        if let Some(prefix) = &self.key_prefix {
            config = config.with_key_prefix(prefix.clone());
        }

        Ok(config)
    }
}

impl From<&BackendSettings> for HttpBackendConfig {
    fn from(settings: &BackendSettings) -> Self {
        HttpBackendConfig::new(settings.id.clone(), settings.url.clone())
            .with_timeout(Duration::from_secs(settings.timeout_secs))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn backend_configs(&self) -> Vec<HttpBackendConfig> {
        self.backends.iter().map(HttpBackendConfig::from).collect()
    }
}
