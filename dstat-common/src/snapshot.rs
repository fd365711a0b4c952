use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Interface throughput over the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRates {
    /// Bytes transmitted since the previous sample.
    pub tx_bytes: u64,
    /// Bytes received since the previous sample.
    pub rx_bytes: u64,
    /// Wireless signal quality (0-100), absent for wired interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

/// CPU utilisation over the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuLoad {
    pub percent: u8,
}

/// CPU clock and performance scaling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuPerf {
    /// Current clock in MHz.
    pub mhz: u64,
    /// Performance level as a percentage of the maximum.
    pub setperf: u8,
}

/// Battery readings for a host that has a battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub on_ac: bool,
    pub percent: u8,
    /// Estimated minutes of charge left, `None` when the source cannot tell.
    pub minutes_remaining: Option<u32>,
}

/// Power source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PowerReading {
    /// No battery present, or its state is unknown.
    Absent,
    Battery(BatteryStatus),
}

/// Aggregate audio output volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volume {
    Muted,
    Level(u8),
}

/// One tick worth of readings, serialised for the JSON output mode.
///
/// Fields of samplers that failed this tick are left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Unix epoch milliseconds when the tick was taken.
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkRates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuLoad>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf: Option<CpuPerf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerReading>,

    /// Hottest valid sensor in degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveDateTime>,

    /// The composed status line.
    pub line: String,
}

impl SnapshotRecord {
    /// Encode as a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_skips_failed_readings() {
        let record = SnapshotRecord {
            timestamp: 1_700_000_000_000,
            network: None,
            cpu: Some(CpuLoad { percent: 12 }),
            perf: None,
            power: Some(PowerReading::Absent),
            temperature: None,
            volume: Some(Volume::Muted),
            time: None,
            line: "CPU 12%".to_string(),
        };

        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["cpu"]["percent"], 12);
        assert_eq!(json["power"]["state"], "absent");
        assert_eq!(json["volume"], "muted");
        assert!(json.get("network").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_battery_reading_json() {
        let reading = PowerReading::Battery(BatteryStatus {
            on_ac: false,
            percent: 82,
            minutes_remaining: Some(194),
        });

        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["state"], "battery");
        assert_eq!(json["percent"], 82);
        assert_eq!(json["minutes_remaining"], 194);

        let back: PowerReading = serde_json::from_value(json).unwrap();
        assert_eq!(back, reading);
    }

    #[test]
    fn test_current_timestamp() {
        let ts = current_timestamp_millis();
        // Should be after 2020-01-01
        assert!(ts > 1577836800000);
    }
}
