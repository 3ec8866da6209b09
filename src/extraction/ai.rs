//! AI extraction strategy
//!
//! Last resort in the chain: hands the URL to the configured generation
//! provider, which reads the page itself and returns structured fields.
//! Most expensive and slowest, so it never claims hosts.

use std::sync::Arc;

use async_trait::async_trait;

use super::ExtractionStrategy;
use crate::errors::AppError;
use crate::providers::{ExtractedPage, GenerationProvider};

pub struct AiExtractStrategy {
    generator: Arc<dyn GenerationProvider>,
}

impl AiExtractStrategy {
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ExtractionStrategy for AiExtractStrategy {
    fn name(&self) -> &'static str {
        "ai-extraction"
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedPage, AppError> {
        self.generator.extract_page(url).await
    }
}
