//! Stock quotes and company news from Yahoo Finance.

use super::{text_or_error, Tool};
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// Number of news items requested per ticker.
const NEWS_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
}

/// Current price for a ticker symbol.
pub struct StockPriceTool {
    http: reqwest::Client,
}

impl StockPriceTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn quote(&self, symbol: &str) -> Result<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PalaverError::InvalidInput("empty stock symbol".to_string()));
        }

        let url = url::Url::parse_with_params(
            &format!("{}{}", CHART_URL, symbol),
            &[("interval", "1d"), ("range", "1d")],
        )
        .map_err(|e| PalaverError::InvalidInput(e.to_string()))?;

        let body = self.http.get(url).send().await?.text().await?;
        let price = parse_market_price(&body)?;
        Ok(format!("The current price of {} is ${}", symbol, price))
    }
}

/// Extract `regularMarketPrice` from a chart response body.
fn parse_market_price(body: &str) -> Result<f64> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(PalaverError::InvalidInput(error.description));
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|r| r.meta.regular_market_price)
        .ok_or_else(|| PalaverError::InvalidInput("no market price in response".to_string()))
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "stock_price_checker"
    }

    fn description(&self) -> &str {
        "Useful for getting the current stock price of a company. Input should be the stock symbol."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.quote(input).await, "fetching stock price")
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsItem {
    title: String,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    provider_publish_time: Option<i64>,
    #[serde(default)]
    related_tickers: Vec<String>,
}

/// Recent news headlines for a ticker symbol.
pub struct YahooFinanceNewsTool {
    http: reqwest::Client,
}

impl YahooFinanceNewsTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn news(&self, symbol: &str) -> Result<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PalaverError::InvalidInput("empty stock symbol".to_string()));
        }

        let count = NEWS_COUNT.to_string();
        let url = url::Url::parse_with_params(
            SEARCH_URL,
            &[
                ("q", symbol.as_str()),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ],
        )
        .map_err(|e| PalaverError::InvalidInput(e.to_string()))?;

        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        format_news(&body, &symbol)
    }
}

/// Render the news items that mention `symbol`, one block per story.
fn format_news(body: &str, symbol: &str) -> Result<String> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let stories: Vec<String> = response
        .news
        .into_iter()
        .filter(|item| {
            item.related_tickers.is_empty()
                || item.related_tickers.iter().any(|t| t.eq_ignore_ascii_case(symbol))
        })
        .map(|item| {
            let published = item
                .provider_publish_time
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .map(|at| at.format("%Y-%m-%d").to_string());
            let source = match (item.publisher, published) {
                (Some(publisher), Some(date)) => format!("{} ({})", publisher, date),
                (Some(publisher), None) => publisher,
                (None, Some(date)) => date,
                (None, None) => String::new(),
            };

            let mut story = item.title;
            if !source.is_empty() {
                story.push_str(&format!("\n{}", source));
            }
            if let Some(link) = item.link {
                story.push_str(&format!("\n{}", link));
            }
            story
        })
        .collect();

    if stories.is_empty() {
        Ok(format!(
            "No news found for company that searched with {} ticker.",
            symbol
        ))
    } else {
        Ok(stories.join("\n\n"))
    }
}

#[async_trait]
impl Tool for YahooFinanceNewsTool {
    fn name(&self) -> &str {
        "yahoo_finance_news"
    }

    fn description(&self) -> &str {
        "Useful for when you need to find financial news about a public company. \
         Input should be a company ticker. For example, AAPL for Apple, MSFT for Microsoft."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.news(input).await, "fetching financial news")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_market_price() {
        let body = r#"{"chart":{"result":[{"meta":{"currency":"USD","symbol":"AAPL","regularMarketPrice":189.84}}],"error":null}}"#;
        assert_eq!(parse_market_price(body).unwrap(), 189.84);
    }

    #[test]
    fn test_parse_chart_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_market_price(body).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[tokio::test]
    async fn test_empty_symbol() {
        let tool = StockPriceTool::new(reqwest::Client::new());
        assert_eq!(
            tool.run("  ").await,
            "Error fetching stock price: Invalid input: empty stock symbol"
        );
    }

    #[test]
    fn test_format_news_filters_by_ticker() {
        let body = r#"{"news": [
            {"title": "Apple unveils new chips", "publisher": "Reuters",
             "link": "https://example.com/a", "providerPublishTime": 1700000000,
             "relatedTickers": ["AAPL", "NVDA"]},
            {"title": "Oil prices climb", "publisher": "Bloomberg",
             "relatedTickers": ["XOM"]},
            {"title": "Markets wrap"}
        ]}"#;
        assert_eq!(
            format_news(body, "AAPL").unwrap(),
            "Apple unveils new chips\nReuters (2023-11-14)\nhttps://example.com/a\n\nMarkets wrap"
        );
    }

    #[test]
    fn test_format_news_empty() {
        assert_eq!(
            format_news(r#"{"news": []}"#, "ZZZZ").unwrap(),
            "No news found for company that searched with ZZZZ ticker."
        );
        assert_eq!(
            format_news(r#"{"quotes": []}"#, "ZZZZ").unwrap(),
            "No news found for company that searched with ZZZZ ticker."
        );
    }

    #[tokio::test]
    async fn test_news_empty_symbol() {
        let tool = YahooFinanceNewsTool::new(reqwest::Client::new());
        assert_eq!(
            tool.run("").await,
            "Error fetching financial news: Invalid input: empty stock symbol"
        );
    }
}
