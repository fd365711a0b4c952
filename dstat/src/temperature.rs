//! Hottest sensor reading.

use dstat_common::{Error, Result};

use crate::source::{SensorReading, ThermalSource};

/// Highest valid temperature across all sensors, in degrees Celsius.
pub fn sample(source: &mut dyn ThermalSource) -> Result<f64> {
    hottest(&source.sensors()?)
}

/// Highest valid reading, [`Error::NoSensor`] when there is none.
pub fn hottest(readings: &[SensorReading]) -> Result<f64> {
    readings
        .iter()
        .filter(|r| r.valid && r.celsius.is_finite())
        .map(|r| r.celsius)
        .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
        .ok_or(Error::NoSensor)
}
