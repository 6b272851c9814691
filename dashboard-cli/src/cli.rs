use anyhow::anyhow;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, Dashboard, FileSource, Unit, WeatherSource, source::source_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{fmt, path::PathBuf};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, default unit and default location.
    Configure,

    /// Render the dashboard for a location or a saved payload.
    Show {
        /// Location name; falls back to the configured default location.
        location: Option<String>,

        /// Read the weather payload from a JSON file instead of OpenWeather.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Initial unit, "metric" or "imperial".
        #[arg(long)]
        unit: Option<Unit>,

        /// Print the view model as JSON.
        #[arg(long, conflicts_with = "interactive")]
        json: bool,

        /// Offer the unit selector after every render.
        #[arg(long, short)]
        interactive: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, file, unit, json, interactive } => {
                show(location, file, unit, json, interactive).await
            }
        }
    }
}

/// Select-control entry.
enum UnitChoice {
    Select(Unit),
    Quit,
}

impl fmt::Display for UnitChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitChoice::Select(unit) => f.write_str(unit.control_label()),
            UnitChoice::Quit => f.write_str("Quit"),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let current = config.default_unit()?.unwrap_or_default();
    let options: Vec<Unit> = Unit::all().to_vec();
    let cursor = options.iter().position(|u| *u == current).unwrap_or(0);
    let labels: Vec<&str> = options.iter().map(|u| u.control_label()).collect();
    let picked = Select::new("Default unit:", labels).with_starting_cursor(cursor).raw_prompt()?;
    config.set_default_unit(options[picked.index]);

    let existing = config.default_location.clone().unwrap_or_default();
    let location = Text::new("Default location:").with_default(&existing).prompt()?;
    config.default_location = match location.trim() {
        "" => None,
        loc => Some(loc.to_string()),
    };

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(
    location: Option<String>,
    file: Option<PathBuf>,
    unit: Option<Unit>,
    json: bool,
    interactive: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let source: Box<dyn WeatherSource> = match (file, location) {
        (Some(path), _) => Box::new(FileSource::new(path)),
        (None, Some(location)) => source_from_config(&config, &location)?,
        (None, None) => {
            let location = config.default_location.as_deref().ok_or_else(|| {
                anyhow!(
                    "No location given and no default location configured.\n\
                     Hint: pass a location, use `--file`, or run `weather-dashboard configure`."
                )
            })?;
            source_from_config(&config, location)?
        }
    };

    let data = source.load().await?;
    let mut dashboard = Dashboard::new(data, Some(config.initial_unit(unit)?));

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard.view()?)?);
        return Ok(());
    }

    let year = Local::now().year();
    loop {
        let view = dashboard.view()?;
        println!(
            "{}",
            render::dashboard(&view, &dashboard.data().current_weather, &config.footer, year)
        );

        if !interactive {
            return Ok(());
        }

        match prompt_unit(dashboard.unit())? {
            UnitChoice::Select(unit) => dashboard.select_unit(unit),
            UnitChoice::Quit => return Ok(()),
        }
    }
}

fn prompt_unit(current: Unit) -> anyhow::Result<UnitChoice> {
    let mut options: Vec<UnitChoice> =
        Unit::all().iter().copied().map(UnitChoice::Select).collect();
    options.push(UnitChoice::Quit);
    let cursor = Unit::all().iter().position(|u| *u == current).unwrap_or(0);

    match Select::new("Units:", options).with_starting_cursor(cursor).prompt() {
        Ok(choice) => Ok(choice),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Ok(UnitChoice::Quit)
        }
        Err(err) => Err(err.into()),
    }
}
