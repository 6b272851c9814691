//! Loading collaborators that produce the canonical [`WeatherData`].

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{fmt::Debug, path::PathBuf};
use tracing::debug;

use crate::{
    Config,
    model::{AirPollution, CurrentWeather, Forecast, WeatherData},
};

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn load(&self) -> Result<WeatherData>;
}

/// Reads a saved payload (the `WeatherData` JSON shape) from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WeatherSource for FileSource {
    async fn load(&self) -> Result<WeatherData> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read weather data file: {}", self.path.display()))?;

        let data: WeatherData = serde_json::from_str(&body).with_context(|| {
            format!("Failed to parse weather data file: {}", self.path.display())
        })?;

        debug!(
            path = %self.path.display(),
            forecast_entries = data.forecast.list.len(),
            "loaded weather data from file"
        );
        Ok(data)
    }
}

/// Fetches current weather, forecast and air pollution from OpenWeather,
/// always in metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    location: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String, location: String) -> Self {
        Self::with_base_url(api_key, location, OPENWEATHER_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, location: String, base_url: String) -> Self {
        Self {
            api_key,
            location,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        debug!(endpoint, %status, bytes = body.len(), "OpenWeather response");

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn load(&self) -> Result<WeatherData> {
        let by_name = [("q", self.location.clone()), ("units", "metric".to_string())];

        let current_weather: CurrentWeather =
            self.get_json("current weather", "weather", &by_name).await?;
        let forecast: Forecast = self.get_json("forecast", "forecast", &by_name).await?;

        let coord = current_weather.coord;
        let air_pollution: AirPollution = self
            .get_json(
                "air pollution",
                "air_pollution",
                &[("lat", coord.lat.to_string()), ("lon", coord.lon.to_string())],
            )
            .await?;

        Ok(WeatherData { current_weather, forecast, air_pollution })
    }
}

/// Construct an OpenWeather source from config for `location`.
pub fn source_from_config(config: &Config, location: &str) -> Result<Box<dyn WeatherSource>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-dashboard configure` and enter your API key, \
                 or pass `--file` with a saved payload."
        )
    })?;

    Ok(Box::new(OpenWeatherSource::new(api_key.to_owned(), location.to_owned())))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    #[test]
    fn source_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = source_from_config(&cfg, "Berlin").unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn source_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        assert!(source_from_config(&cfg, "Berlin").is_ok());
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[tokio::test]
    async fn file_source_reads_payload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("weather.json");
        let data = sample(4);
        std::fs::write(&file, serde_json::to_string(&data).unwrap()).unwrap();

        let loaded = FileSource::new(&file).load().await.unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn file_source_reports_missing_file() {
        let err = FileSource::new("/definitely/not/here.json").load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read weather data file"));
    }

    #[tokio::test]
    async fn openweather_source_combines_three_endpoints() {
        let server = MockServer::start().await;
        let data = sample(3);

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Berlin"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&data.current_weather))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&data.forecast))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .and(query_param("lat", "52.52"))
            .and(query_param("lon", "13.405"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&data.air_pollution))
            .mount(&server)
            .await;

        let source = OpenWeatherSource::with_base_url("KEY".into(), "Berlin".into(), server.uri());
        let loaded = source.load().await.unwrap();

        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn openweather_source_surfaces_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let source = OpenWeatherSource::with_base_url("BAD".into(), "Berlin".into(), server.uri());
        let err = source.load().await.unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("current weather request failed with status 401"));
        assert!(msg.contains("Invalid API key"));
    }
}
