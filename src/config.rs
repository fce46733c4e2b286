use crate::core::{RecordingPolicy, Selector, DEFAULT_MOBILE_FETCH_SIZE, DEFAULT_RESULT_LIMIT};
use crate::services::DEFAULT_EMBEDDING_MODEL;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub gateway: GatewaySettings,
    pub embeddings: EmbeddingSettings,
    pub index: IndexSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    pub url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    pub timeout_secs: Option<u64>,
}

fn default_embedding_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_embedding_model() -> String { DEFAULT_EMBEDDING_MODEL.to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSettings {
    pub result_limit: Option<usize>,
    pub mobile_fetch_size: Option<usize>,
    #[serde(default)]
    pub recording_policy: RecordingPolicy,
    /// Send error payloads with the upstream failure's status instead of 200
    #[serde(default)]
    pub propagate_upstream_status: bool,
}

impl SearchSettings {
    pub fn selector(&self) -> Selector {
        Selector::new(
            self.result_limit.unwrap_or(DEFAULT_RESULT_LIMIT).min(DEFAULT_RESULT_LIMIT),
            self.mobile_fetch_size.unwrap_or(DEFAULT_MOBILE_FETCH_SIZE),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with RECOMENDA__)
    /// 4. Deployment variables (DATABASE_URL or DB_*, HOST_GATEWAY, OPENAI_API_KEY)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RECOMENDA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RECOMENDA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RECOMENDA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.embeddings.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "embeddings.api_key is empty; set OPENAI_API_KEY".to_string(),
            ));
        }
        if let Some(limit) = self.search.result_limit {
            if limit == 0 || limit > DEFAULT_RESULT_LIMIT {
                return Err(ConfigError::Message(format!(
                    "search.result_limit must be between 1 and {}, got {}",
                    DEFAULT_RESULT_LIMIT, limit
                )));
            }
        }
        Ok(())
    }
}

/// Compose a Postgres URL from the individual DB_* deployment variables
fn database_url_from_parts(user: &str, password: &str, host: &str, port: &str, database: &str) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}",
        urlencoding::encode(user),
        urlencoding::encode(password),
        host,
        port,
        database
    )
}

/// Apply the plain deployment variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    // DATABASE_URL wins over the split DB_* variables
    let database_url = env::var("DATABASE_URL").ok().or_else(|| {
        let host = env::var("DB_HOST").ok()?;
        Some(database_url_from_parts(
            &env::var("DB_USERNAME").unwrap_or_default(),
            &env::var("DB_PASSWORD").unwrap_or_default(),
            &host,
            &env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
            &env::var("DB_DATABASE").unwrap_or_default(),
        ))
    });

    let gateway_url = env::var("HOST_GATEWAY").ok();
    let api_key = env::var("OPENAI_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = database_url {
        builder = builder.set_override("database.url", url)?;
    }
    if let Some(url) = gateway_url {
        builder = builder.set_override("gateway.url", url)?;
    }
    if let Some(key) = api_key {
        builder = builder.set_override("embeddings.api_key", key)?;
    }

    builder.build()
}
