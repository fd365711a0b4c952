//! Status line composition.

use chrono::NaiveDateTime;
use dstat_common::{
    CpuLoad, CpuPerf, Error, LINE_CAPACITY, NetworkRates, PowerReading, Result, SnapshotRecord,
    Volume, bar, bounded, dots, fragment, scaled,
};
use tracing::warn;

/// Fragment separator.
pub const DELIMITER: &str = " ";

/// Replacement for a line that does not fit [`LINE_CAPACITY`].
pub const LINE_FAILED: &str = "format failed";

/// strftime layout of the time fragment.
pub const TIME_FORMAT: &str = "%a %b %d %I:%M %p";

/// Everything sampled during one tick.
#[derive(Debug)]
pub struct MetricSnapshot {
    /// Unix epoch milliseconds when the tick started.
    pub timestamp: i64,
    pub network: Result<NetworkRates>,
    pub cpu: Result<CpuLoad>,
    pub perf: Result<CpuPerf>,
    pub power: Result<PowerReading>,
    pub temperature: Result<f64>,
    pub volume: Result<Volume>,
    pub time: Result<NaiveDateTime>,
}

impl MetricSnapshot {
    /// Serialisable form of the snapshot alongside its composed line.
    pub fn to_record(&self, line: &str) -> SnapshotRecord {
        SnapshotRecord {
            timestamp: self.timestamp,
            network: self.network.as_ref().ok().copied(),
            cpu: self.cpu.as_ref().ok().copied(),
            perf: self.perf.as_ref().ok().copied(),
            power: self.power.as_ref().ok().copied(),
            temperature: self.temperature.as_ref().ok().copied(),
            volume: self.volume.as_ref().ok().copied(),
            time: self.time.as_ref().ok().copied(),
            line: line.to_string(),
        }
    }
}

/// Join all fragments of a snapshot into one status line.
///
/// Fragment order is network, CPU with performance, power, temperature,
/// volume and time.
pub fn compose(snapshot: &MetricSnapshot) -> String {
    let fragments = [
        render(&snapshot.network, network, network_failure),
        render(&snapshot.cpu, |load| cpu(load, &snapshot.perf), |_| "cpu failed"),
        render(&snapshot.power, power, |_| "power failed"),
        render(&snapshot.temperature, temperature, |_| "temperature failed"),
        render(&snapshot.volume, volume, |_| "volume failed"),
        render(&snapshot.time, time, |_| "time failed"),
    ];

    match bounded(fragments.join(DELIMITER), LINE_CAPACITY) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "Status line dropped");
            LINE_FAILED.to_string()
        }
    }
}

/// Format a reading, or its diagnostic literal when sampling or
/// formatting failed.
///
/// Sampler failures are logged where they happen; only formatting
/// overflows are reported here.
fn render<T>(
    reading: &Result<T>,
    format: impl Fn(&T) -> Result<String>,
    literal: fn(&Error) -> &'static str,
) -> String {
    let value = match reading {
        Ok(value) => value,
        Err(e) => return literal(e).to_string(),
    };
    format(value).unwrap_or_else(|e| {
        warn!(error = %e, "Fragment dropped");
        literal(&e).to_string()
    })
}

fn network_failure(e: &Error) -> &'static str {
    match e {
        Error::SourceUnavailable(_) => "interface failed",
        _ => "network failed",
    }
}

/// `↑ 12.3K/s ↓ 45.6K/s [..]`, without brackets on wired interfaces.
pub fn network(rates: &NetworkRates) -> Result<String> {
    let tx = scaled(rates.tx_bytes);
    let rx = scaled(rates.rx_bytes);
    let text = match rates.quality {
        Some(q) => format!("↑ {}/s ↓ {}/s [{}]", tx, rx, dots(q)),
        None => format!("↑ {}/s ↓ {}/s", tx, rx),
    };
    fragment(text)
}

/// `CPU 7% ▁ 2.4GHz [50%]`.
pub fn cpu(load: &CpuLoad, perf: &Result<CpuPerf>) -> Result<String> {
    let perf = match perf {
        Ok(perf) => cpu_perf(perf)?,
        Err(_) => "perf failed".to_string(),
    };
    fragment(format!("CPU {}% {} {}", load.percent, bar(load.percent), perf))
}

/// `2.4GHz [50%]`.
pub fn cpu_perf(perf: &CpuPerf) -> Result<String> {
    fragment(format!(
        "{:.1}GHz [{}%]",
        perf.mhz as f64 / 1000.0,
        perf.setperf
    ))
}

/// `⚡ 82% ▇ [3:14]`, `⚡ 82% ▇ [A/C]` or `⚡ A/C` without a battery.
pub fn power(reading: &PowerReading) -> Result<String> {
    let status = match reading {
        PowerReading::Absent => return fragment("⚡ A/C".to_string()),
        PowerReading::Battery(status) => status,
    };

    let percent = status.percent.min(100);
    let remaining = if status.on_ac {
        "A/C".to_string()
    } else {
        match status.minutes_remaining {
            Some(minutes) => format!("{}:{:02}", minutes / 60, minutes % 60),
            None => "-:--".to_string(),
        }
    };
    fragment(format!("⚡ {}% {} [{}]", percent, bar(percent), remaining))
}

/// `T 54.2°C`.
pub fn temperature(celsius: &f64) -> Result<String> {
    fragment(format!("T {:.1}°C", celsius))
}

/// `♫ 63% ▆` or `♫ mute`.
pub fn volume(volume: &Volume) -> Result<String> {
    match volume {
        Volume::Muted => fragment("♫ mute".to_string()),
        Volume::Level(percent) => fragment(format!("♫ {}% {}", percent, bar(*percent))),
    }
}

/// `Wed Jan 01 12:00 PM`.
pub fn time(time: &NaiveDateTime) -> Result<String> {
    fragment(time.format(TIME_FORMAT).to_string())
}
