use chrono::{Local, TimeZone};
use std::fmt;
use tracing::debug;

use crate::{
    model::WeatherData,
    units::Unit,
    view::{ViewError, ViewModel, build_view_model_in},
};

/// Owns the canonical payload and the selected unit.
///
/// Every call to [`Dashboard::view`] rebuilds the view model from scratch for
/// the current unit; nothing is cached between renders.
#[derive(Debug, Clone)]
pub struct Dashboard {
    data: WeatherData,
    unit: Unit,
}

impl Dashboard {
    /// `initial_unit` defaults to metric when absent.
    pub fn new(data: WeatherData, initial_unit: Option<Unit>) -> Self {
        Self { data, unit: initial_unit.unwrap_or_default() }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn data(&self) -> &WeatherData {
        &self.data
    }

    pub fn select_unit(&mut self, unit: Unit) {
        if unit != self.unit {
            debug!(from = %self.unit, to = %unit, "unit selected");
        }
        self.unit = unit;
    }

    /// View model for the current unit, hourly times in local time.
    pub fn view(&self) -> Result<ViewModel, ViewError> {
        self.view_in(&Local)
    }

    pub fn view_in<Tz>(&self, tz: &Tz) -> Result<ViewModel, ViewError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        build_view_model_in(&self.data, self.unit, tz)
    }
}
