//! Best-effort weather lookup against WeatherAPI.com.
//!
//! Weather is always-available-but-possibly-wrong: any failure (missing key,
//! network, HTTP error, malformed body) collapses to the [`UNKNOWN_WEATHER`]
//! sentinel rather than an error. Crop advice never blocks on weather.

use serde::Deserialize;
use tracing::warn;

use agribot_core::config::WeatherConfig;

/// Sentinel returned whenever a forecast cannot be produced.
pub const UNKNOWN_WEATHER: &str = "Unknown weather";

/// Client for the WeatherAPI.com forecast endpoint.
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    forecast_days: u8,
}

impl WeatherClient {
    /// Build a client from configuration. A missing API key is tolerated;
    /// lookups then return the sentinel.
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resolve_api_key(),
            base_url: config.base_url.clone(),
            forecast_days: config.forecast_days,
        }
    }

    /// Fetch a one-line forecast summary for a location.
    ///
    /// Never fails: every error path returns [`UNKNOWN_WEATHER`].
    pub async fn fetch_weather(&self, location: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No weather API key configured");
            return UNKNOWN_WEATHER.to_string();
        };

        let url = format!("{}/forecast.json", self.base_url);
        let days = self.forecast_days.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("q", location),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(location, error = %e, "Weather request failed");
                return UNKNOWN_WEATHER.to_string();
            }
        };

        if !response.status().is_success() {
            warn!(location, status = %response.status(), "Weather API returned an error");
            return UNKNOWN_WEATHER.to_string();
        }

        let forecast: ForecastResponse = match response.json().await {
            Ok(f) => f,
            Err(e) => {
                warn!(location, error = %e, "Malformed weather response");
                return UNKNOWN_WEATHER.to_string();
            }
        };

        summarize_forecast(&forecast).unwrap_or_else(|| UNKNOWN_WEATHER.to_string())
    }
}

/// Render the first forecast day as a one-line summary.
///
/// Returns `None` when the forecast carries no days.
fn summarize_forecast(forecast: &ForecastResponse) -> Option<String> {
    let day = forecast.forecast.forecastday.first()?;
    let rain_expected = if day.day.daily_will_it_rain == 1 {
        "yes"
    } else {
        "no"
    };
    Some(format!(
        "Date: {}, {}, Max Temp: {}°C, Min Temp: {}°C, Rain Chance: {}%, Rain Expected: {}",
        day.date,
        day.day.condition.text,
        day.day.maxtemp_c,
        day.day.mintemp_c,
        day.day.daily_chance_of_rain,
        rain_expected,
    ))
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: Day,
}

#[derive(Debug, Deserialize)]
struct Day {
    maxtemp_c: f64,
    mintemp_c: f64,
    #[serde(default)]
    daily_will_it_rain: u8,
    #[serde(default)]
    daily_chance_of_rain: u8,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forecast() -> ForecastResponse {
        serde_json::from_str(
            r#"{
                "forecast": {
                    "forecastday": [{
                        "date": "2025-08-06",
                        "day": {
                            "maxtemp_c": 34.2,
                            "mintemp_c": 26.1,
                            "daily_will_it_rain": 1,
                            "daily_chance_of_rain": 80,
                            "condition": {"text": "Patchy rain nearby"}
                        }
                    }]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_summarize_forecast() {
        let summary = summarize_forecast(&sample_forecast()).unwrap();
        assert!(summary.contains("Date: 2025-08-06"));
        assert!(summary.contains("Patchy rain nearby"));
        assert!(summary.contains("Max Temp: 34.2°C"));
        assert!(summary.contains("Rain Chance: 80%"));
        assert!(summary.contains("Rain Expected: yes"));
    }

    #[test]
    fn test_summarize_forecast_no_rain() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "forecast": {
                    "forecastday": [{
                        "date": "2025-08-06",
                        "day": {
                            "maxtemp_c": 30.0,
                            "mintemp_c": 22.0,
                            "daily_will_it_rain": 0,
                            "daily_chance_of_rain": 5,
                            "condition": {"text": "Sunny"}
                        }
                    }]
                }
            }"#,
        )
        .unwrap();
        let summary = summarize_forecast(&forecast).unwrap();
        assert!(summary.contains("Rain Expected: no"));
    }

    #[test]
    fn test_summarize_forecast_empty_days() {
        let forecast: ForecastResponse =
            serde_json::from_str(r#"{"forecast": {"forecastday": []}}"#).unwrap();
        assert!(summarize_forecast(&forecast).is_none());
    }

    #[test]
    fn test_missing_rain_fields_default() {
        // daily_* fields are absent in some plan tiers.
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "forecast": {
                    "forecastday": [{
                        "date": "2025-08-06",
                        "day": {
                            "maxtemp_c": 30.0,
                            "mintemp_c": 22.0,
                            "condition": {"text": "Sunny"}
                        }
                    }]
                }
            }"#,
        )
        .unwrap();
        let summary = summarize_forecast(&forecast).unwrap();
        assert!(summary.contains("Rain Chance: 0%"));
    }

    #[tokio::test]
    async fn test_fetch_weather_without_key_returns_sentinel() {
        if std::env::var("WEATHER_API_KEY").is_ok() {
            return;
        }
        let client = WeatherClient::from_config(&WeatherConfig::default());
        assert_eq!(client.fetch_weather("Udaipur").await, UNKNOWN_WEATHER);
    }

    #[tokio::test]
    async fn test_fetch_weather_unreachable_host_returns_sentinel() {
        let config = WeatherConfig {
            base_url: "http://127.0.0.1:1/v1".to_string(),
            api_key: Some("test-key".to_string()),
            forecast_days: 1,
        };
        let client = WeatherClient::from_config(&config);
        assert_eq!(client.fetch_weather("Udaipur").await, UNKNOWN_WEATHER);
    }
}
