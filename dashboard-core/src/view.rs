//! Derivation of render-ready view models from canonical metric data.
//!
//! The canonical [`WeatherData`] is only ever borrowed here; every unit
//! dependent field is recomputed into a freshly allocated copy.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::{
    model::{CurrentWeather, Forecast, ForecastEntry, MainReadings, WeatherData, Wind},
    units::{Unit, convert_pressure, convert_speed, convert_temperature},
};

/// Number of forecast entries shown in the hourly strip.
pub const HOURLY_ENTRIES: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Forecast entry {index} has no weather condition")]
    MissingCondition { index: usize },

    #[error("Forecast entry {index} has an out-of-range timestamp: {dt}")]
    InvalidTimestamp { index: usize, dt: i64 },
}

/// One slot of the condensed hourly projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecastEntry {
    /// Local `HH:MM`.
    pub time: String,
    /// Rounded temperature in the selected unit; `None` when the value is
    /// not finite or does not fit an `i32`.
    pub temperature: Option<i32>,
    pub weather: String,
}

/// Everything the widgets need for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub unit: Unit,
    pub data: WeatherData,
    pub hourly: Vec<HourlyForecastEntry>,
}

/// Build a view model with hourly times in the viewer's local time zone.
pub fn build_view_model(data: &WeatherData, unit: Unit) -> Result<ViewModel, ViewError> {
    build_view_model_in(data, unit, &Local)
}

/// Build a view model with hourly times formatted in `tz`.
pub fn build_view_model_in<Tz>(
    data: &WeatherData,
    unit: Unit,
    tz: &Tz,
) -> Result<ViewModel, ViewError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let hourly = hourly_forecast(&data.forecast.list, unit, tz)?;
    let converted = convert_weather_data(data, unit);

    debug!(
        %unit,
        forecast_entries = converted.forecast.list.len(),
        hourly_entries = hourly.len(),
        "built view model"
    );

    Ok(ViewModel { unit, data: converted, hourly })
}

/// Converted copy of the whole payload. Air pollution is passed through.
pub fn convert_weather_data(data: &WeatherData, unit: Unit) -> WeatherData {
    WeatherData {
        current_weather: convert_current(&data.current_weather, unit),
        forecast: Forecast {
            list: data.forecast.list.iter().map(|e| convert_entry(e, unit)).collect(),
            city: data.forecast.city.clone(),
        },
        air_pollution: data.air_pollution.clone(),
    }
}

fn convert_current(current: &CurrentWeather, unit: Unit) -> CurrentWeather {
    CurrentWeather {
        main: convert_main(&current.main, unit),
        wind: convert_wind(&current.wind, unit),
        ..current.clone()
    }
}

fn convert_entry(entry: &ForecastEntry, unit: Unit) -> ForecastEntry {
    ForecastEntry {
        main: convert_main(&entry.main, unit),
        wind: convert_wind(&entry.wind, unit),
        ..entry.clone()
    }
}

fn convert_main(main: &MainReadings, unit: Unit) -> MainReadings {
    MainReadings {
        temp: convert_temperature(main.temp, unit),
        feels_like: convert_temperature(main.feels_like, unit),
        pressure: convert_pressure(main.pressure, unit),
        ..main.clone()
    }
}

fn convert_wind(wind: &Wind, unit: Unit) -> Wind {
    Wind { speed: convert_speed(wind.speed, unit), ..wind.clone() }
}

/// First [`HOURLY_ENTRIES`] entries, or fewer if the forecast is shorter.
pub fn hourly_forecast<Tz>(
    list: &[ForecastEntry],
    unit: Unit,
    tz: &Tz,
) -> Result<Vec<HourlyForecastEntry>, ViewError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    list.iter()
        .take(HOURLY_ENTRIES)
        .enumerate()
        .map(|(index, entry)| {
            let time = DateTime::from_timestamp(entry.dt, 0)
                .ok_or(ViewError::InvalidTimestamp { index, dt: entry.dt })?
                .with_timezone(tz)
                .format("%H:%M")
                .to_string();

            let weather = entry
                .weather
                .first()
                .map(|c| c.main.clone())
                .ok_or(ViewError::MissingCondition { index })?;

            Ok(HourlyForecastEntry {
                time,
                temperature: round_half_up(convert_temperature(entry.main.temp, unit)),
                weather,
            })
        })
        .collect()
}

// Halves go toward +inf (-2.5 -> -2), unlike f64::round.
fn round_half_up(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return None;
    }
    Some(rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{entry, sample};
    use chrono::{FixedOffset, Utc};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn converts_current_weather_to_imperial() {
        let data = sample(3);
        let view = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();
        let current = &view.data.current_weather;

        assert!(approx(current.main.temp, 68.0));
        assert!(approx(current.main.feels_like, 66.2));
        assert!(approx(current.main.pressure, 29.53));
        assert!(approx(current.wind.speed, 11.185));
        // untouched fields
        assert_eq!(current.main.humidity, 55);
        assert_eq!(current.wind.deg, 225.0);
        assert_eq!(current.name, "Berlin");
    }

    #[test]
    fn metric_view_equals_canonical_data() {
        let data = sample(6);
        let view = build_view_model_in(&data, Unit::Metric, &Utc).unwrap();

        assert_eq!(view.data, data);
        assert_eq!(view.unit, Unit::Metric);
    }

    #[test]
    fn forecast_count_and_order_preserved() {
        let data = sample(8);
        let view = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();

        assert_eq!(view.data.forecast.list.len(), 8);
        let before: Vec<i64> = data.forecast.list.iter().map(|e| e.dt).collect();
        let after: Vec<i64> = view.data.forecast.list.iter().map(|e| e.dt).collect();
        assert_eq!(before, after);

        for (src, dst) in data.forecast.list.iter().zip(&view.data.forecast.list) {
            assert!(approx(dst.main.temp, src.main.temp * 9.0 / 5.0 + 32.0));
            assert!(approx(dst.wind.speed, src.wind.speed * 2.237));
            assert!(approx(dst.main.pressure, src.main.pressure * 0.02953));
        }
    }

    #[test]
    fn hourly_projection_is_capped_at_five() {
        for (len, expected) in [(0, 0), (3, 3), (5, 5), (12, 5)] {
            let data = sample(len);
            let view = build_view_model_in(&data, Unit::Metric, &Utc).unwrap();
            assert_eq!(view.hourly.len(), expected, "forecast of {len} entries");
        }
    }

    #[test]
    fn hourly_entries_are_formatted_and_rounded() {
        let data = sample(2);
        let view = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();

        // 1_700_000_000 is 2023-11-14 22:13:20 UTC; entries are 3h apart.
        assert_eq!(
            view.hourly,
            vec![
                HourlyForecastEntry {
                    time: "22:13".to_string(),
                    temperature: Some(50),
                    weather: "Clear".to_string(),
                },
                HourlyForecastEntry {
                    time: "01:13".to_string(),
                    temperature: Some(52),
                    weather: "Clear".to_string(),
                },
            ]
        );
    }

    #[test]
    fn hourly_time_follows_time_zone() {
        let data = sample(1);
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let view = build_view_model_in(&data, Unit::Metric, &tz).unwrap();

        assert_eq!(view.hourly[0].time, "00:13");
    }

    #[test]
    fn rounding_sends_halves_up() {
        assert_eq!(round_half_up(2.5), Some(3));
        assert_eq!(round_half_up(-2.5), Some(-2));
        assert_eq!(round_half_up(-2.6), Some(-3));
        assert_eq!(round_half_up(53.6), Some(54));
        assert_eq!(round_half_up(0.49999999999999994), Some(0));
        assert_eq!(round_half_up(-0.5), Some(0));
    }

    #[test]
    fn rounding_rejects_unrepresentable_values() {
        assert_eq!(round_half_up(f64::NAN), None);
        assert_eq!(round_half_up(f64::INFINITY), None);
        assert_eq!(round_half_up(1e10), None);
        assert_eq!(round_half_up(-1e10), None);
    }

    #[test]
    fn nan_temperature_leaves_hourly_slot_empty() {
        let mut data = sample(2);
        data.forecast.list[0].main.temp = f64::NAN;

        let view = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();

        assert_eq!(view.hourly[0].temperature, None);
        assert_eq!(view.hourly[0].weather, "Clear");
        assert_eq!(view.hourly[1].temperature, Some(52));
        assert!(view.data.forecast.list[0].main.temp.is_nan());
    }

    #[test]
    fn input_is_not_mutated() {
        let data = sample(7);
        let snapshot = data.clone();

        let _ = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();

        assert_eq!(data, snapshot);
    }

    #[test]
    fn air_pollution_passes_through() {
        let data = sample(1);
        let view = build_view_model_in(&data, Unit::Imperial, &Utc).unwrap();

        assert_eq!(view.data.air_pollution, data.air_pollution);
    }

    #[test]
    fn missing_condition_is_an_error() {
        let mut data = sample(0);
        let mut bare = entry(1_700_000_000, 10.0, "Rain");
        bare.weather.clear();
        data.forecast.list = vec![entry(1_700_000_000, 10.0, "Rain"), bare];

        let err = build_view_model_in(&data, Unit::Metric, &Utc).unwrap_err();
        assert_eq!(err, ViewError::MissingCondition { index: 1 });
    }

    #[test]
    fn missing_condition_past_the_strip_is_ignored() {
        let mut data = sample(5);
        let mut bare = entry(1_700_100_000, 10.0, "Rain");
        bare.weather.clear();
        data.forecast.list.push(bare);

        assert!(build_view_model_in(&data, Unit::Metric, &Utc).is_ok());
    }

    #[test]
    fn out_of_range_timestamp_is_an_error() {
        let mut data = sample(1);
        data.forecast.list[0].dt = i64::MAX;

        let err = build_view_model_in(&data, Unit::Metric, &Utc).unwrap_err();
        assert!(matches!(err, ViewError::InvalidTimestamp { index: 0, .. }));
    }
}
