//! Text-generation adapters
//!
//! Two interchangeable generation strategies:
//!
//! - [`GeminiGenerator`] researches with its built-in knowledge, so the
//!   orchestrator skips the explicit search stage and no sources are cited.
//! - [`ClaudeGenerator`] writes from search results gathered beforehand and
//!   cites the de-duplicated result links as sources.
//!
//! Both follow the `Headline: ...` first-line convention; when the marker
//! is missing the headline falls back to `"{topic} - Daily Update"` rather
//! than failing.

use async_trait::async_trait;

use super::{dedup_sources, ExtractedPage, GeneratedArticle, GenerationProvider, Language, SearchHit};
use crate::errors::AppError;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Minimum acceptable length for AI-extracted page content.
const MIN_EXTRACTED_CHARS: usize = 50;

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Zh => "Please write the article in Chinese (简体中文).",
        Language::En => "Please write the article in English.",
    }
}

/// Split generated text into headline and body. The first line starting
/// (case-insensitively) with `Headline:` names the headline and is removed
/// from the body; without a marker the headline is synthesized.
pub(crate) fn parse_generated(topic: &str, full_text: &str) -> (String, String) {
    let marker_line = full_text.lines().position(|line| {
        let trimmed = line.trim_start();
        trimmed
            .get(..9)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("headline:"))
    });

    match marker_line {
        Some(idx) => {
            let headline = full_text
                .lines()
                .nth(idx)
                .and_then(|line| {
                    let trimmed = line.trim_start();
                    trimmed.get(9..).map(|rest| rest.trim().to_string())
                })
                .unwrap_or_default();

            let content = full_text
                .lines()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, line)| line)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string();

            if headline.is_empty() {
                (format!("{topic} - Daily Update"), content)
            } else {
                (headline, content)
            }
        }
        None => (
            format!("{topic} - Daily Update"),
            full_text.trim().to_string(),
        ),
    }
}

/// Strip markdown code fences from a model response that should be JSON.
pub(crate) fn strip_code_fences(text: &str) -> String {
    text.trim()
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Parse the JSON object an extraction prompt asks the model to return.
pub(crate) fn parse_extraction_json(text: &str) -> Result<ExtractedPage, AppError> {
    let cleaned = strip_code_fences(text);
    let data: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| AppError::Provider {
            provider: "ai-extraction",
            status: None,
            message: format!("Failed to parse webpage content as JSON: {e}"),
        })?;

    let title = data["title"].as_str().unwrap_or_default().trim().to_string();
    let content = data["content"].as_str().unwrap_or_default().trim().to_string();

    if title.is_empty() || content.is_empty() {
        return Err(AppError::Provider {
            provider: "ai-extraction",
            status: None,
            message: "Failed to extract title and content from webpage".into(),
        });
    }
    if content.chars().count() < MIN_EXTRACTED_CHARS {
        return Err(AppError::ContentTooShort {
            length: content.chars().count(),
            minimum: MIN_EXTRACTED_CHARS,
        });
    }

    Ok(ExtractedPage {
        title,
        content,
        author: data["author"].as_str().map(|s| s.trim().to_string()),
        publish_date: data["publishDate"].as_str().map(|s| s.to_string()),
    })
}

fn article_prompt_gemini(topic: &str, language: Language) -> String {
    format!(
        "You are a skilled journalist and analyst. Research and write a comprehensive article about \"{topic}\" based on the latest information.\n\n\
        {instruction}\n\n\
        Please:\n\
        1. Search for the latest developments and news about {topic}\n\
        2. Summarize key information and recent developments\n\
        3. Identify important trends and patterns\n\
        4. Provide meaningful analysis and insights\n\
        5. Maintain an objective, informative tone\n\n\
        Format the article with:\n\
        - Start with \"Headline: [compelling headline]\"\n\
        - Then write a 300-500 word article suitable for voice narration\n\
        - Be informative and engaging\n\n\
        Write the article now:",
        instruction = language_instruction(language),
    )
}

fn article_prompt_claude(topic: &str, language: Language, hits: &[SearchHit]) -> String {
    let results = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   {}\n   Source: {}",
                i + 1,
                hit.title,
                hit.snippet,
                hit.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a skilled journalist and analyst. I have gathered the latest search results about \"{topic}\". Please write a comprehensive, well-structured article that:\n\n\
        1. Summarizes the key information and developments\n\
        2. Identifies important trends and patterns\n\
        3. Provides meaningful analysis and insights\n\
        4. Maintains an objective, informative tone\n\n\
        {instruction}\n\n\
        Search Results:\n{results}\n\n\
        Please write the article in a clear, engaging format suitable for voice narration. \
        Include a compelling headline at the start in the format \"Headline: [your headline here]\". \
        The article should be approximately 300-500 words.",
        instruction = language_instruction(language),
    )
}

fn summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following article in 150-250 words. Focus on the key points, \
        main ideas, and most important information. Write in a clear, concise style \
        suitable for quick reading.\n\nArticle content:\n{content}\n\nSummary:"
    )
}

fn extraction_prompt(url: &str) -> String {
    format!(
        "Fetch and analyze the webpage at this URL: {url}\n\n\
        Please extract the following information in JSON format:\n\
        {{\n\
          \"title\": \"The article title or headline\",\n\
          \"content\": \"The full main article text content (at least 200 words, preserve paragraph structure with \\n\\n between paragraphs)\",\n\
          \"author\": \"The author name if available, otherwise null\",\n\
          \"publishDate\": \"The publish date in YYYY-MM-DD format if available, otherwise null\"\n\
        }}\n\n\
        Important:\n\
        - Extract the complete article text, not just a summary\n\
        - Preserve the natural paragraph structure\n\
        - If author or date are not found, use null\n\
        - Return ONLY the JSON object, no other text\n\n\
        JSON:"
    )
}

/// Gemini adapter: generation with built-in research, no explicit sources.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn call(
        &self,
        prompt: String,
        temperature: f64,
        max_output_tokens: u32,
    ) -> Result<String, AppError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::ConfigurationError("Gemini API key not configured".into())
        })?;

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_output_tokens,
            }
        });

        let res = self
            .client
            .post(format!(
                "{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent"
            ))
            .query(&[("key", api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "gemini",
                status: None,
                message: format!("Request failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Provider {
                provider: "gemini",
                status: Some(status.as_u16()),
                message: "Generation request rejected".into(),
            });
        }

        let body: serde_json::Value = res.json().await.map_err(|e| AppError::Provider {
            provider: "gemini",
            status: None,
            message: format!("Parse error: {e}"),
        })?;

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::Provider {
                provider: "gemini",
                status: None,
                message: "Invalid response from Gemini API".into(),
            })
    }
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    fn needs_search(&self) -> bool {
        false
    }

    async fn generate_article(
        &self,
        topic: &str,
        language: Language,
        _context: Option<&[SearchHit]>,
    ) -> Result<GeneratedArticle, AppError> {
        let full_text = self
            .call(article_prompt_gemini(topic, language), 0.7, 2048)
            .await?;
        let (headline, content) = parse_generated(topic, &full_text);

        Ok(GeneratedArticle {
            headline,
            content,
            // Built-in knowledge, no grounding mechanism
            sources: Vec::new(),
        })
    }

    async fn summarize(&self, content: &str) -> Result<String, AppError> {
        let summary = self.call(summary_prompt(content), 0.5, 500).await?;
        Ok(summary.trim().to_string())
    }

    async fn extract_page(&self, url: &str) -> Result<ExtractedPage, AppError> {
        // Low temperature for factual extraction
        let text = self.call(extraction_prompt(url), 0.1, 4096).await?;
        parse_extraction_json(&text)
    }
}

/// Claude adapter: generation grounded in explicit search results.
pub struct ClaudeGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ClaudeGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn call(&self, prompt: String, max_tokens: u32) -> Result<String, AppError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::ConfigurationError("Anthropic API key not configured".into())
        })?;

        let payload = serde_json::json!({
            "model": ANTHROPIC_MODEL,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let res = self
            .client
            .post(ANTHROPIC_ENDPOINT)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "claude",
                status: None,
                message: format!("Request failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Provider {
                provider: "claude",
                status: Some(status.as_u16()),
                message: "Generation request rejected".into(),
            });
        }

        let body: serde_json::Value = res.json().await.map_err(|e| AppError::Provider {
            provider: "claude",
            status: None,
            message: format!("Parse error: {e}"),
        })?;

        body["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::Provider {
                provider: "claude",
                status: None,
                message: "Invalid response from Anthropic API".into(),
            })
    }
}

#[async_trait]
impl GenerationProvider for ClaudeGenerator {
    fn needs_search(&self) -> bool {
        true
    }

    async fn generate_article(
        &self,
        topic: &str,
        language: Language,
        context: Option<&[SearchHit]>,
    ) -> Result<GeneratedArticle, AppError> {
        let hits = context.unwrap_or_default();
        let full_text = self
            .call(article_prompt_claude(topic, language, hits), 2048)
            .await?;
        let (headline, content) = parse_generated(topic, &full_text);

        Ok(GeneratedArticle {
            headline,
            content,
            sources: dedup_sources(hits.iter().map(|h| h.link.clone()).collect()),
        })
    }

    async fn summarize(&self, content: &str) -> Result<String, AppError> {
        let summary = self.call(summary_prompt(content), 500).await?;
        Ok(summary.trim().to_string())
    }

    async fn extract_page(&self, url: &str) -> Result<ExtractedPage, AppError> {
        let text = self.call(extraction_prompt(url), 4096).await?;
        parse_extraction_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_marker_is_extracted_and_stripped() {
        let (headline, content) =
            parse_generated("AI", "Headline: My Title\nBody text continues here.");
        assert_eq!(headline, "My Title");
        assert_eq!(content, "Body text continues here.");
    }

    #[test]
    fn missing_marker_falls_back_to_synthesized_headline() {
        let text = "Just body text with no marker at all.";
        let (headline, content) = parse_generated("Stock Market", text);
        assert_eq!(headline, "Stock Market - Daily Update");
        assert_eq!(content, text);
    }

    #[test]
    fn marker_is_case_insensitive_and_need_not_be_first() {
        let (headline, content) =
            parse_generated("EV", "Intro line.\nHEADLINE:   Charged Up\nRest of body.");
        assert_eq!(headline, "Charged Up");
        assert_eq!(content, "Intro line.\nRest of body.");
        assert!(!content.to_lowercase().contains("headline:"));
    }

    #[test]
    fn empty_marker_falls_back() {
        let (headline, _) = parse_generated("AI", "Headline:\nBody.");
        assert_eq!(headline, "AI - Daily Update");
    }

    #[test]
    fn code_fences_are_stripped() {
        let fenced = "```json\n{\"title\": \"T\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"T\"}");
        // Idempotent on unfenced input
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn extraction_json_round_trip() {
        let body = "word ".repeat(20);
        let raw = format!(
            "```json\n{{\"title\": \"A Story\", \"content\": \"{body}\", \"author\": \"Jo\", \"publishDate\": \"2026-01-05\"}}\n```"
        );
        let page = parse_extraction_json(&raw).unwrap();
        assert_eq!(page.title, "A Story");
        assert_eq!(page.author.as_deref(), Some("Jo"));
        assert_eq!(page.publish_date.as_deref(), Some("2026-01-05"));
    }

    #[test]
    fn extraction_rejects_short_content() {
        let raw = "{\"title\": \"T\", \"content\": \"too short\"}";
        assert!(matches!(
            parse_extraction_json(raw),
            Err(AppError::ContentTooShort { .. })
        ));
    }

    #[test]
    fn extraction_rejects_missing_title() {
        let body = "word ".repeat(20);
        let raw = format!("{{\"content\": \"{body}\"}}");
        assert!(matches!(
            parse_extraction_json(&raw),
            Err(AppError::Provider { .. })
        ));
    }

    #[test]
    fn claude_prompt_lists_numbered_results() {
        let hits = vec![
            SearchHit {
                title: "First".into(),
                snippet: "one".into(),
                link: "https://a.example".into(),
            },
            SearchHit {
                title: "Second".into(),
                snippet: "two".into(),
                link: "https://b.example".into(),
            },
        ];
        let prompt = article_prompt_claude("AI", Language::Zh, &hits);
        assert!(prompt.contains("1. First"));
        assert!(prompt.contains("2. Second"));
        assert!(prompt.contains("Source: https://b.example"));
        assert!(prompt.contains("简体中文"));
    }
}
