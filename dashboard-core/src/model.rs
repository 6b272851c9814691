//! Canonical weather payload. All values are metric: °C, hPa, m/s.
//!
//! Field names follow the OpenWeather JSON so the same types deserialize
//! both the API responses and saved payload files.

use serde::{Deserialize, Serialize};

/// The complete payload rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub current_weather: CurrentWeather,
    pub forecast: Forecast,
    pub air_pollution: AirPollution,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// One weather condition, e.g. `{ main: "Rain", description: "light rain" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: i64,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    pub pressure: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    /// Meteorological direction in degrees.
    #[serde(default)]
    pub deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub wind: Wind,
    /// Meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Clouds>,
    pub dt: i64,
    pub sys: Sys,
    /// Shift in seconds from UTC for the location.
    #[serde(default)]
    pub timezone: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainReadings,
    pub wind: Wind,
    pub weather: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    /// Probability of precipitation, 0.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coord>,
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub list: Vec<ForecastEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AqiIndex {
    /// 1 = Good .. 5 = Very Poor.
    pub aqi: u8,
}

/// Pollutant concentrations in μg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub nh3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionReading {
    pub dt: i64,
    pub main: AqiIndex,
    pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirPollution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coord>,
    pub list: Vec<PollutionReading>,
}
