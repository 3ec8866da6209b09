use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

/// Google Custom Search credentials. Both parts are required for the
/// search stage; their absence fails only search-backed generation.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Which generation provider to use: "gemini" (implicit search) or
    /// "claude" (requires the explicit search stage).
    pub provider: String,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Per-pair generation budget in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub voice_id: String,
    pub audio_dir: String,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("server.rust_log", "info,dailybrief=debug")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 30)?
            .set_default("search.api_key", None::<String>)?
            .set_default("search.engine_id", None::<String>)?
            .set_default("generation.provider", "gemini")?
            .set_default("generation.gemini_api_key", None::<String>)?
            .set_default("generation.anthropic_api_key", None::<String>)?
            .set_default("generation.timeout_secs", 120)?
            .set_default("speech.api_key", None::<String>)?
            // ElevenLabs default voice (Rachel)
            .set_default("speech.voice_id", "21m00Tcm4TlvDq8ikWAM")?
            .set_default("speech.audio_dir", "audio")?
            // Add in settings from environment variables (with a prefix of APP)
            // E.g. `APP_SERVER__PORT=8080` would set `ServerConfig.port`
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("APP")
                    .prefix_separator("_"),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_only_database_url() {
        // database.url has no default; everything else does
        std::env::set_var("APP_DATABASE__URL", "postgres://localhost/dailybrief_test");
        let cfg = AppConfig::build().expect("config should build from defaults");
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.generation.provider, "gemini");
        assert_eq!(cfg.generation.timeout_secs, 120);
        assert!(cfg.speech.api_key.is_none());
        assert_eq!(cfg.speech.audio_dir, "audio");
        std::env::remove_var("APP_DATABASE__URL");
    }
}
