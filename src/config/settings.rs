//! Application settings and configuration structures.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Message store configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Translation service client settings
    pub translation: TranslationSettings,

    /// Speech service client settings
    pub speech: SpeechSettings,

    /// Upload and static file locations
    pub storage: StorageSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
///
/// When `url` is absent the relay keeps history in memory only.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Translation service (LibreTranslate-compatible) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    /// Base URL of the translation API
    pub base_url: String,

    /// Optional API key sent with every request
    pub api_key: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum number of translation/detection calls in flight
    pub max_concurrent_calls: usize,
}

/// Speech service (speech-to-text / text-to-speech sidecar) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSettings {
    /// Base URL of the speech sidecar
    pub base_url: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum number of speech calls in flight
    pub max_concurrent_calls: usize,
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// Directory uploads are written to (normally `<static_dir>/uploads`)
    pub upload_dir: PathBuf,

    /// Maximum accepted multipart body size in bytes
    pub max_upload_bytes: usize,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins; empty or "*" allows any origin
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Per-connection outbound queue length
    pub outbound_buffer: usize,

    /// How long a delivery may wait on a full outbound queue
    pub send_timeout_ms: u64,

    /// How long a closing connection may spend flushing queued frames
    pub close_grace_ms: u64,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a limit is configured as zero.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=8000 -> server.port = 8000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("translation.base_url", std::env::var("TRANSLATION_URL").ok())?
            .set_override_option(
                "translation.api_key",
                std::env::var("TRANSLATION_API_KEY").ok(),
            )?
            .set_override_option("speech.base_url", std::env::var("SPEECH_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    /// Settings built from defaults alone, without files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("test")?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("translation.base_url", "http://localhost:5000")?
            .set_default("translation.timeout_ms", 10_000_i64)?
            .set_default("translation.max_concurrent_calls", 16_i64)?
            .set_default("speech.base_url", "http://localhost:5100")?
            .set_default("speech.timeout_ms", 60_000_i64)?
            .set_default("speech.max_concurrent_calls", 4_i64)?
            .set_default("storage.static_dir", "static")?
            .set_default("storage.upload_dir", "static/uploads")?
            .set_default("storage.max_upload_bytes", 25 * 1024 * 1024_i64)? // 25MB
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .set_default("websocket.outbound_buffer", 256_i64)?
            .set_default("websocket.send_timeout_ms", 5_000_i64)?
            .set_default("websocket.close_grace_ms", 1_000_i64)
    }

    fn validated(settings: Self) -> Result<Self, ConfigError> {
        if settings.translation.max_concurrent_calls == 0 {
            return Err(ConfigError::Message(
                "translation.max_concurrent_calls must be at least 1".into(),
            ));
        }
        if settings.speech.max_concurrent_calls == 0 {
            return Err(ConfigError::Message(
                "speech.max_concurrent_calls must be at least 1".into(),
            ));
        }
        if settings.websocket.outbound_buffer == 0 {
            return Err(ConfigError::Message(
                "websocket.outbound_buffer must be at least 1".into(),
            ));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TranslationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SpeechSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl WebSocketSettings {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}
