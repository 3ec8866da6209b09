//! ElevenLabs text-to-speech adapter
//!
//! Returns the raw MP3 payload; file placement is the speech gate's
//! concern. Status mapping lets callers distinguish the retryable 429 from
//! the non-retryable 401.

use async_trait::async_trait;

use super::SpeechProvider;
use crate::config::SpeechConfig;
use crate::errors::AppError;

const TTS_ENDPOINT: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const TTS_MODEL: &str = "eleven_monolingual_v1";

pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl ElevenLabsSpeech {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AppError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            AppError::ConfigurationError("ElevenLabs API key not configured".into())
        })?;

        let payload = serde_json::json!({
            "text": text,
            "model_id": TTS_MODEL,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.5,
            }
        });

        let res = self
            .client
            .post(format!("{TTS_ENDPOINT}/{}", self.config.voice_id))
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "elevenlabs",
                status: None,
                message: format!("Request failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            let message = match status.as_u16() {
                401 => "invalid credentials".to_string(),
                429 => "rate limited".to_string(),
                other => format!("speech synthesis failed with status {other}"),
            };
            return Err(AppError::Provider {
                provider: "elevenlabs",
                status: Some(status.as_u16()),
                message,
            });
        }

        let bytes = res.bytes().await.map_err(|e| AppError::Provider {
            provider: "elevenlabs",
            status: None,
            message: format!("Failed to read audio payload: {e}"),
        })?;

        tracing::debug!(bytes = bytes.len(), "Speech synthesized");
        Ok(bytes.to_vec())
    }
}
