use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::alert_monitor::WeatherProvider;
use crate::error::{ AppError, Result };

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A single provider observation, consumed and discarded after comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature: f64,
    pub description: String,
    pub location: String,
}

pub struct WeatherService {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    main: ConditionsMain,
    #[serde(default)]
    weather: Vec<ConditionsSummary>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ConditionsMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionsSummary {
    description: String,
}

impl From<CurrentConditions> for WeatherReading {
    fn from(conditions: CurrentConditions) -> Self {
        WeatherReading {
            temperature: conditions.main.temp,
            description: conditions.weather
                .into_iter()
                .next()
                .map(|summary| summary.description)
                .unwrap_or_default(),
            location: conditions.name,
        }
    }
}

impl WeatherService {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap(),
            api_key,
        }
    }

    /// Raw provider payload for the current-weather proxy route.
    pub async fn current_by_city(&self, city: &str) -> Result<serde_json::Value> {
        self.fetch_json("weather", &[("q", city)]).await
    }

    /// Raw provider payload for the five-day forecast proxy route.
    pub async fn forecast_by_city(&self, city: &str) -> Result<serde_json::Value> {
        self.fetch_json("forecast", &[("q", city)]).await
    }

    pub async fn current_by_coordinates(&self, lat: f64, lon: f64) -> Result<serde_json::Value> {
        self.fetch_json(
            "weather",
            &[("lat", lat.to_string().as_str()), ("lon", lon.to_string().as_str())]
        ).await
    }

    pub async fn forecast_by_coordinates(&self, lat: f64, lon: f64) -> Result<serde_json::Value> {
        self.fetch_json(
            "forecast",
            &[("lat", lat.to_string().as_str()), ("lon", lon.to_string().as_str())]
        ).await
    }

    async fn fetch_json(
        &self,
        endpoint: &str,
        params: &[(&str, &str)]
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", OPENWEATHER_API_BASE, endpoint);

        let response = self.client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "imperial")])
            .send().await
            .map_err(|e| AppError::Provider(format!("Weather API request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::CityNotFound);
        }

        if !response.status().is_success() {
            return Err(AppError::Provider(format!("Weather API returned {}", response.status())));
        }

        response
            .json().await
            .map_err(|e| AppError::Provider(format!("Invalid weather API response: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for WeatherService {
    async fn current_reading(&self, city: &str) -> Result<WeatherReading> {
        let payload = self.current_by_city(city).await?;

        let conditions: CurrentConditions = serde_json
            ::from_value(payload)
            .map_err(|e| AppError::Provider(format!("Invalid weather API response: {}", e)))?;

        Ok(conditions.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_from_provider_payload() {
        let payload = json!({
            "name": "Austin",
            "main": { "temp": 95.4, "humidity": 40 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }]
        });

        let conditions: CurrentConditions = serde_json::from_value(payload).unwrap();
        let reading = WeatherReading::from(conditions);

        assert_eq!(reading, WeatherReading {
            temperature: 95.4,
            description: "clear sky".to_string(),
            location: "Austin".to_string(),
        });
    }

    #[test]
    fn test_reading_tolerates_missing_conditions_list() {
        let payload = json!({
            "name": "Austin",
            "main": { "temp": 70.0 }
        });

        let conditions: CurrentConditions = serde_json::from_value(payload).unwrap();
        let reading = WeatherReading::from(conditions);

        assert_eq!(reading.temperature, 70.0);
        assert!(reading.description.is_empty());
    }
}
