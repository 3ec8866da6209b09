//! Direct HTML scraping strategy
//!
//! Fetches the page with a browser-like user agent and mines the DOM with
//! metadata-first heuristics: social-graph tags over the `<title>` element
//! for the title, known article containers over a bare paragraph sweep for
//! the body.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::ExtractionStrategy;
use crate::errors::AppError;
use crate::providers::ExtractedPage;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Containers likely to hold the article body, in priority order.
const CONTENT_SELECTORS: [&str; 9] = [
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    ".post-body",
    ".article-body",
];

/// Page chrome that must never contribute to the extracted body.
const EXCLUDED_TAGS: [&str; 6] = ["script", "style", "nav", "header", "footer", "aside"];
const EXCLUDED_CLASSES: [&str; 3] = ["ad", "advertisement", "social-share"];

pub struct HtmlScrapeStrategy {
    client: reqwest::Client,
}

impl HtmlScrapeStrategy {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HtmlScrapeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for HtmlScrapeStrategy {
    fn name(&self) -> &'static str {
        "html-scrape"
    }

    async fn attempt(&self, url: &str) -> Result<ExtractedPage, AppError> {
        let res = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "html-scrape",
                status: None,
                message: format!("Fetch failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Provider {
                provider: "html-scrape",
                status: Some(status.as_u16()),
                message: format!("Page fetch returned status {status}"),
            });
        }

        let body = res.text().await.map_err(|e| AppError::Provider {
            provider: "html-scrape",
            status: None,
            message: format!("Failed to read page body: {e}"),
        })?;

        Ok(parse_article_html(&body))
    }
}

/// Mine an HTML document for article fields. Pure so the heuristics are
/// testable without a live fetch; length validation is the chain's job.
pub fn parse_article_html(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    ExtractedPage {
        title: extract_title(&document),
        content: extract_content(&document),
        author: extract_author(&document),
        publish_date: extract_publish_date(&document),
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_title(document: &Html) -> String {
    meta_content(document, "meta[property=\"og:title\"]")
        .or_else(|| meta_content(document, "meta[name=\"twitter:title\"]"))
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_else(|| "Untitled".to_string())
}

fn extract_author(document: &Html) -> Option<String> {
    meta_content(document, "meta[name=\"author\"]")
        .or_else(|| meta_content(document, "meta[property=\"article:author\"]"))
        .or_else(|| first_text(document, ".author"))
        .or_else(|| first_text(document, "[rel=\"author\"]"))
}

fn extract_publish_date(document: &Html) -> Option<String> {
    let raw = meta_content(document, "meta[property=\"article:published_time\"]")
        .or_else(|| meta_content(document, "meta[name=\"publish_date\"]"))
        .or_else(|| {
            let sel = Selector::parse("time[datetime]").ok()?;
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("datetime"))
                .map(String::from)
        })?;

    // Keep the date part of an ISO timestamp
    raw.split('T').next().map(String::from)
}

fn is_excluded_element(el: &scraper::node::Element) -> bool {
    EXCLUDED_TAGS.contains(&el.name())
        || el.classes().any(|class| EXCLUDED_CLASSES.contains(&class))
}

/// Whether the element, or any ancestor, is page chrome.
fn inside_excluded(el: &scraper::ElementRef<'_>) -> bool {
    is_excluded_element(el.value())
        || el
            .ancestors()
            .any(|node| node.value().as_element().is_some_and(is_excluded_element))
}

fn extract_content(document: &Html) -> String {
    // A thin match keeps trying less-specific containers before the
    // page-wide sweep; a wrapper `<article>` around a teaser must not
    // shadow the real body in `main`.
    for selector in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        if let Some(container) = document.select(&sel).next() {
            let text = paragraphs_of(&container);
            if text.chars().count() >= 100 {
                return text;
            }
        }
    }

    // No recognizable container: sweep every paragraph on the page
    let Ok(p_sel) = Selector::parse("p") else {
        return String::new();
    };
    document
        .select(&p_sel)
        .filter(|p| !inside_excluded(p))
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paragraphs_of(container: &scraper::ElementRef<'_>) -> String {
    let Ok(p_sel) = Selector::parse("p") else {
        return String::new();
    };
    let paragraphs: Vec<String> = container
        .select(&p_sel)
        .filter(|p| !inside_excluded(p))
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if paragraphs.is_empty() {
        // Container without <p> children, e.g. bare text in a div
        visible_text(container)
    } else {
        paragraphs.join("\n\n")
    }
}

/// Concatenated text of a container, skipping text under excluded
/// elements (inline scripts, share widgets and the like).
fn visible_text(container: &scraper::ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let excluded = node
            .ancestors()
            .any(|a| a.value().as_element().is_some_and(is_excluded_element));
        if !excluded {
            out.push_str(text);
        }
    }
    out.trim().to_string()
}
