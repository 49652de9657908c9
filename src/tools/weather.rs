//! Current weather from wttr.in.

use super::{text_or_error, Tool};
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const WTTR_URL: &str = "https://wttr.in/";

#[derive(Debug, Deserialize)]
struct WttrResponse {
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    weather_desc: Vec<DescriptionValue>,
}

#[derive(Debug, Deserialize)]
struct DescriptionValue {
    value: String,
}

/// Current conditions for a city, in metric units.
pub struct WeatherTool {
    http: reqwest::Client,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn current(&self, city: &str) -> Result<String> {
        let city = city.trim();
        if city.is_empty() {
            return Err(PalaverError::InvalidInput("empty city name".to_string()));
        }

        let mut url = url::Url::parse(WTTR_URL).map_err(|e| PalaverError::InvalidInput(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PalaverError::InvalidInput("cannot build weather URL".to_string()))?
            .pop_if_empty()
            .push(city);
        url.query_pairs_mut().append_pair("format", "j1");

        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        format_conditions(city, &body)
    }
}

fn format_conditions(city: &str, body: &str) -> Result<String> {
    let response: WttrResponse = serde_json::from_str(body)?;
    match response.current_condition.first() {
        Some(current) => {
            let description = current
                .weather_desc
                .first()
                .map(|d| d.value.trim())
                .unwrap_or("unknown");
            Ok(format!(
                "Current weather in {}: {}, Temperature: {}°C",
                city, description, current.temp_c
            ))
        }
        None => Ok(format!("Unable to get weather data for {}", city)),
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather_checker"
    }

    fn description(&self) -> &str {
        "Get current weather information for a city. Input should be the city name."
    }

    async fn run(&self, input: &str) -> String {
        text_or_error(self.current(input).await, "fetching weather")
    }
}
