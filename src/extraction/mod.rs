//! Cascading extraction fallback chain
//!
//! No single technique is reliable across the open web: paywalled,
//! anti-bot-protected and region-specific platforms each respond to
//! different extraction methods. The chain tries an ordered list of
//! strategies until one yields acceptable content, isolating each failure
//! and carrying the last reason when everything is exhausted.
//!
//! Declared order: direct HTML scraping, reader proxy, AI extraction.
//! A strategy claiming a URL's host via `preferred_for` is promoted to the
//! front regardless of declared order.

mod ai;
mod html;
mod reader;

pub use ai::AiExtractStrategy;
pub use html::HtmlScrapeStrategy;
pub use reader::ReaderProxyStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::errors::AppError;
use crate::providers::ExtractedPage;

/// Minimum cleaned body length for an extraction to count as a success;
/// a shorter extraction is worse than an explicit failure.
pub const MIN_CONTENT_CHARS: usize = 50;

#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hosts this strategy should handle ahead of the declared order
    /// (e.g. platforms known to block generic scraping).
    fn preferred_for(&self, _url: &Url) -> bool {
        false
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedPage, AppError>;
}

pub struct ExtractionChain {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl ExtractionChain {
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the chain for a URL: first strategy producing a non-empty title
    /// and a cleaned body of at least [`MIN_CONTENT_CHARS`] wins. Failures
    /// never abort the chain; they are recorded and the next strategy runs.
    pub async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError> {
        let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;

        // Stable partition: preferred strategies first, declared order kept
        // within each group.
        let mut order: Vec<&Arc<dyn ExtractionStrategy>> = Vec::new();
        order.extend(self.strategies.iter().filter(|s| s.preferred_for(&parsed)));
        order.extend(self.strategies.iter().filter(|s| !s.preferred_for(&parsed)));

        let attempts = order.len();
        let mut last_error: Option<AppError> = None;

        for strategy in order {
            match strategy.attempt(url).await {
                Ok(page) => match accept(page) {
                    Ok(accepted) => {
                        tracing::info!(url, strategy = strategy.name(), "Extraction succeeded");
                        return Ok(accepted);
                    }
                    Err(e) => {
                        tracing::warn!(url, strategy = strategy.name(), error = %e, "Extraction rejected");
                        last_error = Some(e);
                    }
                },
                Err(e) => {
                    tracing::warn!(url, strategy = strategy.name(), error = %e, "Extraction attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::ExtractionExhausted {
            url: url.to_string(),
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no strategies configured".into()),
        })
    }
}

/// Acceptance gate applied to any strategy's output: cleanup, then title
/// and minimum-length checks.
fn accept(page: ExtractedPage) -> Result<ExtractedPage, AppError> {
    let content = clean_content(&page.content);
    let length = content.chars().count();

    if page.title.trim().is_empty() {
        return Err(AppError::ValidationError("extracted title is empty".into()));
    }
    if length < MIN_CONTENT_CHARS {
        return Err(AppError::ContentTooShort {
            length,
            minimum: MIN_CONTENT_CHARS,
        });
    }

    Ok(ExtractedPage {
        title: page.title.trim().to_string(),
        content,
        author: page.author,
        publish_date: page.publish_date,
    })
}

/// Cleanup policy: collapse intra-line whitespace runs to single spaces,
/// collapse 2+ consecutive blank lines to exactly one, trim. Idempotent.
pub fn clean_content(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_blank_run = false;

    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !in_blank_run && !out.is_empty() {
                out.push(String::new());
            }
            in_blank_run = true;
        } else {
            in_blank_run = false;
            out.push(collapsed);
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    enum Behavior {
        Succeed,
        Short,
        Fail(&'static str),
    }

    struct FakeStrategy {
        label: &'static str,
        behavior: Behavior,
        preferred_host: Option<&'static str>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ExtractionStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            self.label
        }

        fn preferred_for(&self, url: &Url) -> bool {
            self.preferred_host
                .is_some_and(|h| url.host_str() == Some(h))
        }

        async fn attempt(&self, _url: &str) -> Result<ExtractedPage, AppError> {
            self.calls.lock().unwrap().push(self.label);
            match self.behavior {
                Behavior::Succeed => Ok(ExtractedPage {
                    title: format!("{} title", self.label),
                    content: "long enough body ".repeat(10),
                    author: None,
                    publish_date: None,
                }),
                Behavior::Short => Ok(ExtractedPage {
                    title: "short".into(),
                    content: "tiny".into(),
                    author: None,
                    publish_date: None,
                }),
                Behavior::Fail(reason) => Err(AppError::Provider {
                    provider: "fake",
                    status: None,
                    message: reason.into(),
                }),
            }
        }
    }

    fn strategy(
        label: &'static str,
        behavior: Behavior,
        calls: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn ExtractionStrategy> {
        Arc::new(FakeStrategy {
            label,
            behavior,
            preferred_host: None,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn first_success_wins_after_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = ExtractionChain::new(vec![
            strategy("a", Behavior::Fail("a broke"), &calls),
            strategy("b", Behavior::Succeed, &calls),
            strategy("c", Behavior::Succeed, &calls),
        ]);

        let page = chain.extract("https://example.com/story").await.unwrap();
        assert_eq!(page.title, "b title");
        // c is never attempted
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn exhaustion_carries_last_reason() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = ExtractionChain::new(vec![
            strategy("a", Behavior::Fail("a broke"), &calls),
            strategy("b", Behavior::Fail("b broke"), &calls),
        ]);

        let err = chain.extract("https://example.com/story").await.unwrap_err();
        match err {
            AppError::ExtractionExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("b broke"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_content_is_a_strategy_failure_not_terminal() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = ExtractionChain::new(vec![
            strategy("a", Behavior::Short, &calls),
            strategy("b", Behavior::Succeed, &calls),
        ]);

        let page = chain.extract("https://example.com/story").await.unwrap();
        assert_eq!(page.title, "b title");
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn preferred_strategy_is_promoted_for_matching_host() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reader = Arc::new(FakeStrategy {
            label: "reader",
            behavior: Behavior::Succeed,
            preferred_host: Some("mp.weixin.qq.com"),
            calls: calls.clone(),
        });
        let chain = ExtractionChain::new(vec![
            strategy("html", Behavior::Succeed, &calls),
            reader,
        ]);

        // Matching host: reader runs first despite declared order
        let page = chain
            .extract("https://mp.weixin.qq.com/s/abc")
            .await
            .unwrap();
        assert_eq!(page.title, "reader title");
        assert_eq!(*calls.lock().unwrap(), vec!["reader"]);

        // Other hosts keep declared order
        calls.lock().unwrap().clear();
        let page = chain.extract("https://example.org/post").await.unwrap();
        assert_eq!(page.title, "html title");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_attempt() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = ExtractionChain::new(vec![strategy("a", Behavior::Succeed, &calls)]);

        let err = chain.extract("not a url").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cleanup_collapses_whitespace_and_blank_lines() {
        let raw = "First   line\t here\n\n\n\nSecond    paragraph\n\n\nThird\n\n";
        let cleaned = clean_content(raw);
        assert_eq!(cleaned, "First line here\n\nSecond paragraph\n\nThird");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let raw = "  A  messy\n\n\n  document\twith   gaps \n\n\n\n tail  ";
        let once = clean_content(raw);
        let twice = clean_content(&once);
        assert_eq!(once, twice);
    }
}
