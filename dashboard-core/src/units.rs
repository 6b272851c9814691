use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Display unit system. Canonical data is always metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Unit] {
        &[Unit::Metric, Unit::Imperial]
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }

    pub fn pressure_label(&self) -> &'static str {
        match self {
            Unit::Metric => "hPa",
            Unit::Imperial => "inHg",
        }
    }

    /// Label shown in the unit select control.
    pub fn control_label(&self) -> &'static str {
        match self {
            Unit::Metric => "Metric (°C, m/s)",
            Unit::Imperial => "Imperial (°F, mph)",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Unit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::try_from(s)
    }
}

const MPS_TO_MPH: f64 = 2.237;
const HPA_TO_INHG: f64 = 0.02953;

/// Celsius to the selected unit.
pub fn convert_temperature(celsius: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Metric => celsius,
        Unit::Imperial => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Meters per second to the selected unit (mph for imperial).
pub fn convert_speed(meters_per_second: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Metric => meters_per_second,
        Unit::Imperial => meters_per_second * MPS_TO_MPH,
    }
}

/// Hectopascals to the selected unit (inHg for imperial).
pub fn convert_pressure(hpa: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Metric => hpa,
        Unit::Imperial => hpa * HPA_TO_INHG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn metric_is_identity() {
        for v in [-40.0, -0.5, 0.0, 12.34, 1013.0, f64::MAX] {
            assert_eq!(convert_temperature(v, Unit::Metric), v);
            assert_eq!(convert_speed(v, Unit::Metric), v);
            assert_eq!(convert_pressure(v, Unit::Metric), v);
        }
    }

    #[test]
    fn repeated_metric_pass_through_is_stable() {
        let mut t = 21.7;
        for _ in 0..10 {
            t = convert_temperature(t, Unit::Metric);
        }
        assert_eq!(t, 21.7);
    }

    #[test]
    fn temperature_to_fahrenheit() {
        assert!(approx(convert_temperature(0.0, Unit::Imperial), 32.0));
        assert!(approx(convert_temperature(100.0, Unit::Imperial), 212.0));
        assert!(approx(convert_temperature(-40.0, Unit::Imperial), -40.0));
    }

    #[test]
    fn speed_to_mph() {
        assert!(approx(convert_speed(10.0, Unit::Imperial), 22.37));
        assert!(approx(convert_speed(0.0, Unit::Imperial), 0.0));
    }

    #[test]
    fn pressure_to_inhg() {
        assert!(approx(convert_pressure(1000.0, Unit::Imperial), 29.53));
        assert!(approx(convert_pressure(1013.0, Unit::Imperial), 1013.0 * 0.02953));
    }

    #[test]
    fn nan_propagates() {
        assert!(convert_temperature(f64::NAN, Unit::Imperial).is_nan());
        assert!(convert_speed(f64::NAN, Unit::Imperial).is_nan());
        assert!(convert_pressure(f64::NAN, Unit::Metric).is_nan());
    }

    #[test]
    fn unit_as_str_roundtrip() {
        for unit in Unit::all() {
            let parsed = Unit::try_from(unit.as_str()).expect("roundtrip should succeed");
            assert_eq!(*unit, parsed);
        }
        assert_eq!("IMPERIAL".parse::<Unit>().unwrap(), Unit::Imperial);
    }

    #[test]
    fn unknown_unit_error() {
        let err = Unit::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn labels_follow_unit() {
        assert_eq!(Unit::Metric.temperature_label(), "°C");
        assert_eq!(Unit::Imperial.speed_label(), "mph");
        assert_eq!(Unit::Imperial.pressure_label(), "inHg");
        assert_eq!(Unit::default(), Unit::Metric);
    }
}
