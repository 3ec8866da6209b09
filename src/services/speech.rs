//! On-demand speech gate
//!
//! Audio is synthesized lazily, the first time it is requested, and the
//! stored `voice_file_path` doubles as the cache marker. Two concurrent
//! first requests can both synthesize; the second write wins and the
//! orphaned file is harmless, so no lock is taken.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::db::ArticleStore;
use crate::errors::AppError;
use crate::providers::SpeechProvider;

/// Public URL prefix under which the audio directory is served.
pub const AUDIO_URL_PREFIX: &str = "/api/articles/audio";

#[derive(Debug, Serialize)]
pub struct AudioRef {
    pub article_id: i32,
    pub audio_url: String,
    pub cached: bool,
}

pub struct SpeechService {
    store: Arc<dyn ArticleStore>,
    speech: Arc<dyn SpeechProvider>,
    audio_dir: PathBuf,
}

impl SpeechService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        speech: Arc<dyn SpeechProvider>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            speech,
            audio_dir: audio_dir.into(),
        }
    }

    /// Return the audio URL for an article, synthesizing on first request.
    pub async fn audio_for_article(&self, id: i32) -> Result<AudioRef, AppError> {
        let article = self
            .store
            .article_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "article".into(),
                resource_id: id.to_string(),
            })?;

        if let Some(path) = article.voice_file_path {
            tracing::debug!(article_id = id, "Serving cached audio");
            return Ok(AudioRef {
                article_id: id,
                audio_url: path,
                cached: true,
            });
        }

        let audio = self.speech.synthesize(&article.content).await?;

        tokio::fs::create_dir_all(&self.audio_dir).await?;
        let filename = format!("article_{id}_{}.mp3", chrono::Utc::now().timestamp_millis());
        tokio::fs::write(self.audio_dir.join(&filename), &audio).await?;

        let audio_url = format!("{AUDIO_URL_PREFIX}/{filename}");
        self.store.set_article_audio_path(id, &audio_url).await?;
        metrics::counter!("dailybrief_tts_synthesis_total").increment(1);

        tracing::info!(article_id = id, %audio_url, bytes = audio.len(), "Audio synthesized");
        Ok(AudioRef {
            article_id: id,
            audio_url,
            cached: false,
        })
    }
}
