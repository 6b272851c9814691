//! Plain-text rendering of the dashboard widgets.

use chrono::Local;
use dashboard_core::{
    FooterConfig, HourlyForecastEntry, Unit, ViewModel,
    model::CurrentWeather,
    widgets::{
        CurrentCard, Daylight, MapView, PollutionChart, TempHumidityPoint, WindPressureCard,
        temp_humidity_series,
    },
};

const BAR_WIDTH: f64 = 30.0;

/// Full dashboard for one render. Daylight and map read the canonical
/// current weather since they do not depend on the unit.
pub fn dashboard(
    view: &ViewModel,
    canonical: &CurrentWeather,
    footer_cfg: &FooterConfig,
    year: i32,
) -> String {
    let sections = [
        header(view.unit),
        current_card(&CurrentCard::from_view(view)),
        wind_card(&WindPressureCard::from_view(view)),
        hourly_strip(&view.hourly, view.unit),
        pollution_chart(PollutionChart::from_view(view).as_ref()),
        temp_humidity_chart(&temp_humidity_series(view, &Local), view.unit),
        daylight(Daylight::from_current(canonical).as_ref()),
        map(&MapView::from_current(canonical)),
        footer(footer_cfg, year),
    ];

    sections.join("\n")
}

fn title(name: &str) -> String {
    format!("── {name} ──\n")
}

pub fn header(unit: Unit) -> String {
    format!("Units: {}\n", unit.control_label())
}

pub fn current_card(card: &CurrentCard) -> String {
    let t = card.unit.temperature_label();
    let mut out = title(&format!("Current weather · {}", card.location));
    out.push_str(&format!("  {:.1}{t}  {}\n", card.temp, card.description));
    out.push_str(&format!(
        "  Feels like {:.1}{t} · Humidity {}%\n",
        card.feels_like, card.humidity
    ));
    if let (Some(min), Some(max)) = (card.min, card.max) {
        out.push_str(&format!("  Min {min:.1}{t} · Max {max:.1}{t}\n"));
    }
    if let (Some(high), Some(low)) = (card.high, card.low) {
        out.push_str(&format!("  Next 24h: high {high:.1}{t} · low {low:.1}{t}\n"));
    }
    out
}

pub fn wind_card(card: &WindPressureCard) -> String {
    let mut out = title("Wind & pressure");
    out.push_str(&format!(
        "  Wind {:.1} {} from {} ({:.0}°)\n",
        card.wind_speed,
        card.unit.speed_label(),
        card.wind_direction,
        card.wind_deg
    ));
    if let Some(gust) = card.gust {
        out.push_str(&format!("  Gusts {gust:.1} {}\n", card.unit.speed_label()));
    }
    let pressure = match card.unit {
        Unit::Metric => format!("{:.0}", card.pressure),
        Unit::Imperial => format!("{:.2}", card.pressure),
    };
    out.push_str(&format!("  Pressure {pressure} {}\n", card.unit.pressure_label()));
    if let Some(km) = card.visibility_km {
        out.push_str(&format!("  Visibility {km:.1} km\n"));
    }
    out
}

pub fn hourly_strip(hourly: &[HourlyForecastEntry], unit: Unit) -> String {
    let mut out = title("Hourly forecast");
    if hourly.is_empty() {
        out.push_str("  No forecast available\n");
    }
    for entry in hourly {
        let temperature = match entry.temperature {
            Some(t) => format!("{t:>4}{}", unit.temperature_label()),
            None => format!("{:>4}", "--"),
        };
        out.push_str(&format!("  {}  {temperature}  {}\n", entry.time, entry.weather));
    }
    out
}

pub fn pollution_chart(chart: Option<&PollutionChart>) -> String {
    let mut out = title("Air pollution");
    let Some(chart) = chart else {
        out.push_str("  No readings\n");
        return out;
    };

    out.push_str(&format!("  AQI {} ({})\n", chart.aqi, chart.label));
    let max = chart.components.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    for (name, value) in &chart.components {
        out.push_str(&format!("  {name:<6}{value:>8.2} μg/m³ {}\n", bar(*value, max)));
    }
    out
}

pub fn temp_humidity_chart(points: &[TempHumidityPoint], unit: Unit) -> String {
    let mut out = title("Temperature & humidity");
    for point in points {
        out.push_str(&format!(
            "  {:<10} {:>6.1}{}  {:>3}% {}\n",
            point.time,
            point.temperature,
            unit.temperature_label(),
            point.humidity,
            bar(f64::from(point.humidity), 100.0)
        ));
    }
    out
}

pub fn daylight(daylight: Option<&Daylight>) -> String {
    let mut out = title("Daylight");
    match daylight {
        Some(d) => out.push_str(&format!(
            "  Sunrise {} · Sunset {} · {} of daylight\n",
            d.sunrise,
            d.sunset,
            d.length_label()
        )),
        None => out.push_str("  Unavailable\n"),
    }
    out
}

pub fn map(map: &MapView) -> String {
    let mut out = title("Map");
    out.push_str(&format!(
        "  {} at [{:.4}, {:.4}] (zoom {})\n",
        map.popup, map.marker.0, map.marker.1, map.zoom
    ));
    out.push_str(&format!("  {}\n", map.link()));
    out
}

pub fn footer(cfg: &FooterConfig, year: i32) -> String {
    format!(
        "Made with 💙 by {} © {year}\n{}\n{}\n",
        cfg.author(),
        cfg.github_url(),
        cfg.repo_url()
    )
}

fn bar(value: f64, max: f64) -> String {
    if max.is_nan() || max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH).round() as usize;
    "█".repeat(len.max(1))
}
