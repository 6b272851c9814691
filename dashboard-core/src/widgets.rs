//! Per-widget projections of a [`ViewModel`].
//!
//! Each widget takes the converted substructure it displays plus the active
//! unit for labelling. Rendering itself lives in the binary.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde::Serialize;
use std::fmt;

use crate::{
    model::{Components, CurrentWeather, ForecastEntry},
    units::{Unit, convert_speed, convert_temperature},
    view::ViewModel,
};

const DAY_SECS: i64 = 24 * 3600;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    pub unit: Unit,
    pub location: String,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub description: String,
    /// Current observed range.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Forecast extremes over the next 24 hours.
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl CurrentCard {
    pub fn from_view(view: &ViewModel) -> Self {
        let current = &view.data.current_weather;
        let horizon = current.dt + DAY_SECS;
        let temps = view
            .data
            .forecast
            .list
            .iter()
            .filter(|e| e.dt < horizon)
            .map(|e| e.main.temp);

        let (high, low) = temps.fold((None, None), |(hi, lo): (Option<f64>, Option<f64>), t| {
            (Some(hi.map_or(t, |h| h.max(t))), Some(lo.map_or(t, |l| l.min(t))))
        });

        Self {
            unit: view.unit,
            location: location_label(current),
            temp: current.main.temp,
            feels_like: current.main.feels_like,
            humidity: current.main.humidity,
            description: current
                .weather
                .first()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            // min/max pass through the view model in metric
            min: current.main.temp_min.map(|t| convert_temperature(t, view.unit)),
            max: current.main.temp_max.map(|t| convert_temperature(t, view.unit)),
            high,
            low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindPressureCard {
    pub unit: Unit,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub wind_direction: &'static str,
    pub gust: Option<f64>,
    pub pressure: f64,
    pub visibility_km: Option<f64>,
}

impl WindPressureCard {
    pub fn from_view(view: &ViewModel) -> Self {
        let current = &view.data.current_weather;
        Self {
            unit: view.unit,
            wind_speed: current.wind.speed,
            wind_deg: current.wind.deg,
            wind_direction: compass_point(current.wind.deg),
            // gust passes through the view model in m/s
            gust: current.wind.gust.map(|g| convert_speed(g, view.unit)),
            pressure: current.main.pressure,
            visibility_km: current.visibility.map(|m| f64::from(m) / 1000.0),
        }
    }
}

/// 16-point compass name for a meteorological bearing.
pub fn compass_point(deg: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = deg.rem_euclid(360.0);
    let index = ((normalized / 22.5) + 0.5).floor() as usize % POINTS.len();
    POINTS[index]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutionChart {
    pub aqi: u8,
    pub label: &'static str,
    pub components: Vec<(&'static str, f64)>,
}

impl PollutionChart {
    /// Latest reading, or `None` if the payload holds none.
    pub fn from_view(view: &ViewModel) -> Option<Self> {
        let reading = view.data.air_pollution.list.first()?;
        Some(Self {
            aqi: reading.main.aqi,
            label: aqi_label(reading.main.aqi),
            components: component_series(&reading.components),
        })
    }
}

pub fn aqi_label(aqi: u8) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

fn component_series(c: &Components) -> Vec<(&'static str, f64)> {
    vec![
        ("CO", c.co),
        ("NO", c.no),
        ("NO2", c.no2),
        ("O3", c.o3),
        ("SO2", c.so2),
        ("PM2.5", c.pm2_5),
        ("PM10", c.pm10),
        ("NH3", c.nh3),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempHumidityPoint {
    pub time: String,
    pub temperature: f64,
    pub humidity: u8,
}

/// One point per converted forecast entry. Entries with unrepresentable
/// timestamps are skipped.
pub fn temp_humidity_series<Tz>(view: &ViewModel, tz: &Tz) -> Vec<TempHumidityPoint>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    view.data
        .forecast
        .list
        .iter()
        .filter_map(|entry: &ForecastEntry| {
            let at = DateTime::from_timestamp(entry.dt, 0)?.with_timezone(tz);
            Some(TempHumidityPoint {
                time: at.format("%a %H:%M").to_string(),
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Daylight {
    /// `HH:MM` in the location's own time zone.
    pub sunrise: String,
    pub sunset: String,
    pub length: Duration,
}

impl Daylight {
    /// Unit independent, so it reads the canonical current weather.
    pub fn from_current(current: &CurrentWeather) -> Option<Self> {
        let offset = FixedOffset::east_opt(current.timezone)?;
        let sunrise = DateTime::from_timestamp(current.sys.sunrise, 0)?.with_timezone(&offset);
        let sunset = DateTime::from_timestamp(current.sys.sunset, 0)?.with_timezone(&offset);
        let length = sunset.signed_duration_since(sunrise);
        if length < Duration::zero() {
            return None;
        }

        Some(Self {
            sunrise: sunrise.format("%H:%M").to_string(),
            sunset: sunset.format("%H:%M").to_string(),
            length,
        })
    }

    pub fn length_label(&self) -> String {
        let minutes = self.length.num_minutes();
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    pub marker: (f64, f64),
    pub popup: String,
}

impl MapView {
    pub const DEFAULT_ZOOM: u8 = 10;

    pub fn from_current(current: &CurrentWeather) -> Self {
        let point = (current.coord.lat, current.coord.lon);
        Self {
            center: point,
            zoom: Self::DEFAULT_ZOOM,
            marker: point,
            popup: location_label(current),
        }
    }

    pub fn link(&self) -> String {
        let (lat, lon) = self.marker;
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.4}&mlon={lon:.4}#map={}/{:.4}/{:.4}",
            self.zoom, self.center.0, self.center.1
        )
    }
}

fn location_label(current: &CurrentWeather) -> String {
    format!("{}, {}", current.name, current.sys.country)
}
