//! Reader proxy strategy
//!
//! Routes the URL through the r.jina.ai rendering proxy, which executes
//! the page and returns a plain-text digest framed with `Title:` and
//! `Markdown Content:` markers. Claims hosts known to block direct
//! scraping so the chain promotes it ahead of the HTML strategy there.

use async_trait::async_trait;
use url::Url;

use super::ExtractionStrategy;
use crate::errors::AppError;
use crate::providers::ExtractedPage;

const PROXY_ENDPOINT: &str = "https://r.jina.ai";

const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// Platforms where direct scraping is known to fail (bot walls, login
/// gates, client-side rendering).
const PREFERRED_HOSTS: [&str; 4] = ["mp.weixin.qq.com", "medium.com", "x.com", "twitter.com"];

pub struct ReaderProxyStrategy {
    client: reqwest::Client,
}

impl ReaderProxyStrategy {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReaderProxyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for ReaderProxyStrategy {
    fn name(&self) -> &'static str {
        "reader-proxy"
    }

    fn preferred_for(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        PREFERRED_HOSTS
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedPage, AppError> {
        let res = self
            .client
            .get(format!("{PROXY_ENDPOINT}/{url}"))
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "reader-proxy",
                status: None,
                message: format!("Proxy fetch failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Provider {
                provider: "reader-proxy",
                status: Some(status.as_u16()),
                message: format!("Proxy returned status {status}"),
            });
        }

        let body = res.text().await.map_err(|e| AppError::Provider {
            provider: "reader-proxy",
            status: None,
            message: format!("Failed to read proxy response: {e}"),
        })?;

        Ok(parse_reader_response(&body))
    }
}

/// Split the proxy's framed response into title and body. A response
/// without the expected markers is treated as the body verbatim.
pub fn parse_reader_response(text: &str) -> ExtractedPage {
    let mut title = None;
    let mut content_start = None;

    for (idx, line) in text.lines().enumerate() {
        if title.is_none() {
            if let Some(rest) = line.strip_prefix("Title:") {
                let rest = rest.trim();
                if !rest.is_empty() {
                    title = Some(rest.to_string());
                }
            }
        }
        if line.trim() == "Markdown Content:" {
            content_start = Some(idx + 1);
            break;
        }
    }

    let content = match content_start {
        Some(start) => text
            .lines()
            .skip(start)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        None => text.trim().to_string(),
    };

    ExtractedPage {
        title: title.unwrap_or_else(|| "Untitled".to_string()),
        content,
        author: None,
        publish_date: None,
    }
}
