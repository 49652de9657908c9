//! Research tools: DuckDuckGo instant answers, Wikipedia and arXiv.

use super::{text_or_error, Tool};
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
const WIKIPEDIA_URL: &str = "https://en.wikipedia.org/w/api.php";
const ARXIV_URL: &str = "https://export.arxiv.org/api/query";

/// Number of pages or papers returned by Wikipedia and arXiv.
const TOP_RESULTS: usize = 3;
/// Maximum characters kept from each summary.
const MAX_SUMMARY_CHARS: usize = 4000;

fn build_url(base: &str, params: &[(&str, &str)]) -> Result<url::Url> {
    url::Url::parse_with_params(base, params).map_err(|e| PalaverError::InvalidInput(e.to_string()))
}

fn require_query(input: &str) -> Result<&str> {
    let query = input.trim();
    if query.is_empty() {
        Err(PalaverError::InvalidInput("empty search query".to_string()))
    } else {
        Ok(query)
    }
}

// === DuckDuckGo ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    answer: Value,
    #[serde(default)]
    related_topics: Vec<Value>,
}

/// Web search through the DuckDuckGo instant answer API.
pub struct DuckDuckGoSearchTool {
    http: reqwest::Client,
}

impl DuckDuckGoSearchTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn search(&self, input: &str) -> Result<String> {
        let query = require_query(input)?;
        let url = build_url(
            DUCKDUCKGO_URL,
            &[("q", query), ("format", "json"), ("no_html", "1"), ("skip_disambig", "1")],
        )?;
        let body = self.http.get(url).send().await?.error_for_status()?.text().await?;
        format_instant_answer(&body)
    }
}

fn format_instant_answer(body: &str) -> Result<String> {
    let answer: InstantAnswer = serde_json::from_str(body)?;
    let mut parts = Vec::new();

    if let Some(text) = answer.answer.as_str().filter(|s| !s.is_empty()) {
        parts.push(text.to_string());
    }
    if !answer.abstract_text.is_empty() {
        if answer.heading.is_empty() {
            parts.push(answer.abstract_text);
        } else {
            parts.push(format!("{}: {}", answer.heading, answer.abstract_text));
        }
    }

    // Topic groups nest their entries under "Topics"
    let topics = answer.related_topics.iter().flat_map(|topic| match topic.get("Topics") {
        Some(Value::Array(nested)) => nested.iter().collect::<Vec<_>>(),
        _ => vec![topic],
    });
    parts.extend(
        topics
            .filter_map(|t| t.get("Text").and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .take(5)
            .map(str::to_string),
    );

    if parts.is_empty() {
        Ok("No good DuckDuckGo Search Result was found".to_string())
    } else {
        Ok(parts.join("\n"))
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for when you need to answer questions \
         about current events. Input should be a search query."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.search(input).await, "searching DuckDuckGo")
    }
}

// === Wikipedia ===

/// Page summaries from Wikipedia.
pub struct WikipediaTool {
    http: reqwest::Client,
}

impl WikipediaTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn lookup(&self, input: &str) -> Result<String> {
        let query = require_query(input)?;
        let limit = TOP_RESULTS.to_string();
        let url = build_url(
            WIKIPEDIA_URL,
            &[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ],
        )?;
        let body = self.http.get(url).send().await?.error_for_status()?.text().await?;
        format_wikipedia_pages(&body)
    }
}

fn format_wikipedia_pages(body: &str) -> Result<String> {
    let response: Value = serde_json::from_str(body)?;
    let Some(pages) = response.pointer("/query/pages").and_then(Value::as_object) else {
        return Ok("No good Wikipedia Search Result was found".to_string());
    };

    let mut pages: Vec<&Value> = pages.values().collect();
    pages.sort_by_key(|p| p.get("index").and_then(Value::as_u64).unwrap_or(u64::MAX));

    let summaries: Vec<String> = pages
        .iter()
        .take(TOP_RESULTS)
        .filter_map(|page| {
            let title = page.get("title")?.as_str()?;
            let extract = page.get("extract").and_then(Value::as_str).unwrap_or("");
            Some(format!(
                "Page: {}\nSummary: {}",
                title,
                super::web::truncate_chars(extract.trim(), MAX_SUMMARY_CHARS)
            ))
        })
        .collect();

    if summaries.is_empty() {
        Ok("No good Wikipedia Search Result was found".to_string())
    } else {
        Ok(summaries.join("\n\n"))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions \
         about people, places, companies, facts, historical events, or other subjects. \
         Input should be a search query."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.lookup(input).await, "searching Wikipedia")
    }
}

// === arXiv ===

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Paper search on arXiv.
pub struct ArxivTool {
    http: reqwest::Client,
}

impl ArxivTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn search(&self, input: &str) -> Result<String> {
        let query = require_query(input)?;
        let search = format!("all:{}", query);
        let limit = TOP_RESULTS.to_string();
        let url = build_url(
            ARXIV_URL,
            &[("search_query", search.as_str()), ("start", "0"), ("max_results", limit.as_str())],
        )?;
        let body = self.http.get(url).send().await?.error_for_status()?.text().await?;
        format_arxiv_feed(&body)
    }
}

#[derive(Debug, Default)]
struct Paper {
    published: String,
    title: String,
    authors: Vec<String>,
    summary: String,
}

fn feed_error(e: impl std::fmt::Display) -> PalaverError {
    PalaverError::InvalidInput(format!("malformed arXiv feed: {}", e))
}

/// Collect the entries of an Atom feed. Text is unescaped.
fn parse_arxiv_feed(feed: &str) -> Result<Vec<Paper>> {
    let mut reader = Reader::from_str(feed);
    let mut papers = Vec::new();
    let mut current: Option<Paper> = None;
    let mut path: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event().map_err(feed_error)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"entry" => current = Some(Paper::default()),
                    b"author" => {
                        if let Some(paper) = current.as_mut() {
                            paper.authors.push(String::new());
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Event::End(e) => {
                path.pop();
                if e.local_name().as_ref() == b"entry" {
                    papers.extend(current.take());
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(feed_error)?;
                append_text(current.as_mut(), &path, &text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).to_string();
                append_text(current.as_mut(), &path, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

fn append_text(paper: Option<&mut Paper>, path: &[Vec<u8>], text: &str) {
    let Some(paper) = paper else {
        return;
    };
    let field = match path.last().map(Vec::as_slice) {
        Some(b"title") => &mut paper.title,
        Some(b"summary") => &mut paper.summary,
        Some(b"published") => &mut paper.published,
        Some(b"name") if path.iter().any(|n| n == b"author") => match paper.authors.last_mut() {
            Some(author) => author,
            None => return,
        },
        _ => return,
    };
    field.push_str(text);
}

fn format_arxiv_feed(feed: &str) -> Result<String> {
    let clean = |s: &str| WHITESPACE_RE.replace_all(s.trim(), " ").to_string();

    let papers: Vec<String> = parse_arxiv_feed(feed)?
        .into_iter()
        .take(TOP_RESULTS)
        .map(|paper| {
            let authors: Vec<String> = paper.authors.iter().map(|a| clean(a)).collect();
            format!(
                "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                paper.published.trim().chars().take(10).collect::<String>(),
                clean(&paper.title),
                authors.join(", "),
                clean(&paper.summary)
            )
        })
        .collect();

    if papers.is_empty() {
        Ok("No good Arxiv Result was found".to_string())
    } else {
        Ok(papers.join("\n\n"))
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "A wrapper around Arxiv.org. Useful for when you need to answer questions about \
         Physics, Mathematics, Computer Science, Quantitative Biology, Quantitative Finance, \
         Statistics, Electrical Engineering, and Economics from scientific articles on \
         arxiv.org. Input should be a search query."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.search(input).await, "searching arXiv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_answer_with_topic_groups() {
        let body = r#"{
            "Heading": "Rust",
            "AbstractText": "Rust is a programming language.",
            "Answer": "",
            "RelatedTopics": [
                {"Text": "Cargo - the Rust package manager"},
                {"Name": "Games", "Topics": [{"Text": "Rust (video game)"}]}
            ]
        }"#;
        assert_eq!(
            format_instant_answer(body).unwrap(),
            "Rust: Rust is a programming language.\nCargo - the Rust package manager\nRust (video game)"
        );
    }

    #[test]
    fn test_instant_answer_empty() {
        let body = r#"{"Heading": "", "AbstractText": "", "RelatedTopics": []}"#;
        assert_eq!(
            format_instant_answer(body).unwrap(),
            "No good DuckDuckGo Search Result was found"
        );
    }

    #[test]
    fn test_wikipedia_pages_sorted_by_rank() {
        let body = r#"{"query": {"pages": {
            "2": {"title": "Second", "index": 2, "extract": "Runner up."},
            "1": {"title": "First", "index": 1, "extract": " Best match. "}
        }}}"#;
        assert_eq!(
            format_wikipedia_pages(body).unwrap(),
            "Page: First\nSummary: Best match.\n\nPage: Second\nSummary: Runner up."
        );
    }

    #[test]
    fn test_wikipedia_no_results() {
        assert_eq!(
            format_wikipedia_pages(r#"{"batchcomplete": ""}"#).unwrap(),
            "No good Wikipedia Search Result was found"
        );
    }

    #[test]
    fn test_arxiv_feed() {
        let feed = r#"<feed>
          <entry>
            <published>2017-06-12T17:57:34Z</published>
            <title>Attention Is All
              You Need</title>
            <summary>  The dominant sequence transduction models...  </summary>
            <author><name>Ashish Vaswani</name></author>
            <author>
              <name>Noam Shazeer</name>
            </author>
          </entry>
        </feed>"#;
        assert_eq!(
            format_arxiv_feed(feed).unwrap(),
            "Published: 2017-06-12\nTitle: Attention Is All You Need\n\
             Authors: Ashish Vaswani, Noam Shazeer\n\
             Summary: The dominant sequence transduction models..."
        );
    }

    #[test]
    fn test_arxiv_empty_feed() {
        assert_eq!(
            format_arxiv_feed("<feed></feed>").unwrap(),
            "No good Arxiv Result was found"
        );
    }

    #[test]
    fn test_arxiv_entities_decoded() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <title>ArXiv Query: Q&amp;A</title>
          <entry>
            <published>2023-01-02T00:00:00Z</published>
            <title>Q&amp;A over &lt;tables&gt;</title>
            <summary>Answers &quot;why&quot; &amp; &apos;how&apos;.</summary>
            <author><name>Ana M&#252;ller</name></author>
          </entry>
        </feed>"#;
        assert_eq!(
            format_arxiv_feed(feed).unwrap(),
            "Published: 2023-01-02\nTitle: Q&A over <tables>\n\
             Authors: Ana M\u{fc}ller\n\
             Summary: Answers \"why\" & 'how'."
        );
    }

    #[test]
    fn test_arxiv_malformed_feed() {
        let err = format_arxiv_feed("<feed><entry></feed>").unwrap_err();
        assert!(err.to_string().contains("malformed arXiv feed"));
    }
}
