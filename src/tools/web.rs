//! Web page text scraping.

use super::{text_or_error, Tool};
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use scraper::{Html, Node};
use tracing::debug;

/// Elements whose text is never part of the readable page.
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Fetch a page and return its visible text.
pub struct WebScraperTool {
    http: reqwest::Client,
    max_chars: usize,
}

impl WebScraperTool {
    pub fn new(http: reqwest::Client, max_chars: usize) -> Self {
        Self { http, max_chars }
    }

    async fn scrape(&self, input: &str) -> Result<String> {
        let url = url::Url::parse(input.trim())
            .map_err(|e| PalaverError::InvalidInput(format!("'{}' is not a URL: {}", input.trim(), e)))?;

        let html = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("Fetched {} bytes from {}", html.len(), url);

        Ok(truncate_chars(&visible_text(&html), self.max_chars))
    }
}

#[async_trait]
impl Tool for WebScraperTool {
    fn name(&self) -> &str {
        "web_scraper"
    }

    fn description(&self) -> &str {
        "Scrape text content from a webpage. Input should be the URL."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.scrape(input).await, "scraping webpage")
    }
}

/// Text of an HTML document without scripts or styles, whitespace collapsed.
pub(crate) fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut text to `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_drops_scripts() {
        let html = r#"<html><head><title>Shop</title><style>p { color: red; }</style></head>
            <body><h1>Welcome</h1>
            <script>var x = 1;</script>
            <p>Fresh   bread
               daily</p></body></html>"#;
        assert_eq!(visible_text(html), "Shop Welcome Fresh bread daily");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_invalid_url_is_text() {
        let tool = WebScraperTool::new(reqwest::Client::new(), 100);
        let text = tool.run("not a url").await;
        assert!(text.starts_with("Error scraping webpage: Invalid input"));
    }
}
