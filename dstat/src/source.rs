//! Metric source interfaces.
//!
//! Each trait is one external collaborator consulted once per tick. The
//! samplers only interpret what these return; how the numbers are obtained
//! from the kernel is up to the implementation (see `linux.rs`).

use chrono::NaiveDateTime;
use dstat_common::{CpuPerf, PowerReading, Result};

use crate::controls::ControlSource;

/// Cumulative byte counters of one interface record.
///
/// A source may report several records under the same name, one per
/// address family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Per-interface cumulative byte counters.
pub trait NetworkSource {
    fn interfaces(&mut self) -> Result<Vec<InterfaceCounters>>;
}

/// Cumulative CPU time spent per scheduler state, in ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

/// Aggregate CPU tick buckets.
pub trait CpuTickSource {
    fn ticks(&mut self) -> Result<CpuTicks>;
}

/// CPU clock and performance scaling state.
pub trait PerfSource {
    fn perf(&mut self) -> Result<CpuPerf>;
}

/// One temperature sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub celsius: f64,
    /// Cleared when the sensor flags its value as invalid.
    pub valid: bool,
}

/// Enumeration of all temperature sensors.
pub trait ThermalSource {
    fn sensors(&mut self) -> Result<Vec<SensorReading>>;
}

/// Received signal strength of the associated access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalReading {
    /// Signal strength in dBm, or in adapter units when `max_rssi` is set.
    pub rssi: i32,
    /// Adapter specific full scale of `rssi`, when it reports one.
    pub max_rssi: Option<i32>,
}

/// Wireless signal quality keyed by interface name.
///
/// Returns [`dstat_common::Error::NotWireless`] for interfaces without
/// wireless capability.
pub trait WirelessSource {
    fn signal(&mut self, interface: &str) -> Result<SignalReading>;
}

/// AC and battery state.
pub trait PowerSource {
    fn power(&mut self) -> Result<PowerReading>;
}

/// Wall clock in local time.
pub trait Clock {
    fn now(&mut self) -> Result<NaiveDateTime>;
}

/// The system clock.
#[derive(Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&mut self) -> Result<NaiveDateTime> {
        Ok(chrono::Local::now().naive_local())
    }
}

/// Every metric source the poll loop reads from.
pub struct Sources {
    pub network: Box<dyn NetworkSource>,
    pub cpu: Box<dyn CpuTickSource>,
    pub perf: Box<dyn PerfSource>,
    pub thermal: Box<dyn ThermalSource>,
    pub wireless: Box<dyn WirelessSource>,
    pub power: Box<dyn PowerSource>,
    pub controls: Box<dyn ControlSource>,
    pub clock: Box<dyn Clock>,
}
