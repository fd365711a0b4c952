//! Linux metric sources.
//!
//! - Interface byte counters and CPU clock (via sysinfo)
//! - CPU tick buckets (via procfs)
//! - Temperature sensors (via hwmon)
//! - Battery and AC state (via power_supply)
//! - Wireless signal level (via /proc/net/wireless)
//! - Output volume and mute (via amixer)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use dstat_common::{BatteryStatus, CpuPerf, Error, PowerReading, Result};
use procfs::CurrentSI;
use sysinfo::{Networks, System};
use tracing::debug;

use crate::controls::{ControlDescriptor, ControlHandler, ControlSource, ControlType};
use crate::source::{
    CpuTickSource, CpuTicks, InterfaceCounters, LocalClock, NetworkSource, PerfSource,
    PowerSource, SensorReading, SignalReading, Sources, ThermalSource, WirelessSource,
};

const HWMON_ROOT: &str = "/sys/class/hwmon";
const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";
const CPUFREQ_ROOT: &str = "/sys/devices/system/cpu/cpu0/cpufreq";
const WIRELESS_PATH: &str = "/proc/net/wireless";

/// Open every Linux metric source.
///
/// Fails when the power supply class or the mixer control cannot be read.
pub fn sources(mixer_control: &str) -> Result<Sources> {
    Ok(Sources {
        network: Box::new(SysinfoNetwork::new()),
        cpu: Box::new(ProcStat),
        perf: Box::new(CpuFreq::new()),
        thermal: Box::new(Hwmon::new(HWMON_ROOT)),
        wireless: Box::new(ProcWireless::new(WIRELESS_PATH)),
        power: Box::new(SysfsPower::open(POWER_SUPPLY_ROOT)?),
        controls: Box::new(AmixerControls::open(mixer_control)?),
        clock: Box::new(LocalClock),
    })
}

/// Lower the scheduling priority of this process by `nice` steps.
pub fn lower_priority(nice: i32) -> Result<()> {
    if nice == 0 {
        return Ok(());
    }
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if rc == -1 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}

/// Interface counters from sysinfo.
pub struct SysinfoNetwork {
    networks: Networks,
}

impl SysinfoNetwork {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSource for SysinfoNetwork {
    fn interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.networks.refresh(true);
        Ok(self
            .networks
            .list()
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.clone(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
            })
            .collect())
    }
}

/// Aggregate CPU ticks from /proc/stat.
#[derive(Debug, Default)]
pub struct ProcStat;

impl CpuTickSource for ProcStat {
    fn ticks(&mut self) -> Result<CpuTicks> {
        let stat = procfs::KernelStats::current().map_err(|e| Error::source("/proc/stat", e))?;
        let total = &stat.total;
        Ok(CpuTicks {
            user: total.user,
            nice: total.nice,
            system: total.system,
            idle: total.idle,
        })
    }
}

/// CPU clock from sysinfo, scaling limit from cpufreq.
pub struct CpuFreq {
    system: System,
    cpufreq: PathBuf,
}

impl CpuFreq {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_frequency();
        Self {
            system,
            cpufreq: PathBuf::from(CPUFREQ_ROOT),
        }
    }

    /// Scaling ceiling as a percentage of the hardware maximum, 100 when
    /// the kernel has no cpufreq driver.
    fn setperf(&self) -> u8 {
        let limit = read_u64(&self.cpufreq.join("scaling_max_freq"));
        let max = read_u64(&self.cpufreq.join("cpuinfo_max_freq"));
        match (limit, max) {
            (Some(limit), Some(max)) if max > 0 => (limit * 100 / max).min(100) as u8,
            _ => 100,
        }
    }
}

impl Default for CpuFreq {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfSource for CpuFreq {
    fn perf(&mut self) -> Result<CpuPerf> {
        self.system.refresh_cpu_frequency();
        let mhz = self
            .system
            .cpus()
            .first()
            .map(|cpu| cpu.frequency())
            .ok_or_else(|| Error::source("cpu frequency", "no CPU reported"))?;
        Ok(CpuPerf {
            mhz,
            setperf: self.setperf(),
        })
    }
}

/// Temperature sensors under /sys/class/hwmon.
pub struct Hwmon {
    root: PathBuf,
}

impl Hwmon {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ThermalSource for Hwmon {
    fn sensors(&mut self) -> Result<Vec<SensorReading>> {
        let mut readings = Vec::new();

        let Ok(entries) = fs::read_dir(&self.root) else {
            return Ok(readings);
        };

        for entry in entries.flatten() {
            let hwmon_path = entry.path();

            let Ok(files) = fs::read_dir(&hwmon_path) else {
                continue;
            };

            for file in files.flatten() {
                let file_name = file.file_name().to_string_lossy().to_string();
                let Some(sensor) = file_name
                    .strip_prefix("temp")
                    .and_then(|s| s.strip_suffix("_input"))
                else {
                    continue;
                };

                // millidegrees Celsius
                let milli = read_trimmed(&hwmon_path.join(&file_name))
                    .and_then(|s| s.parse::<i64>().ok());
                let faulted =
                    read_u64(&hwmon_path.join(format!("temp{}_fault", sensor))) == Some(1);

                readings.push(match milli {
                    Some(milli) => SensorReading {
                        celsius: milli as f64 / 1000.0,
                        valid: !faulted,
                    },
                    None => SensorReading {
                        celsius: 0.0,
                        valid: false,
                    },
                });
            }
        }

        Ok(readings)
    }
}

/// Signal level from the wireless extensions table.
pub struct ProcWireless {
    path: PathBuf,
}

impl ProcWireless {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WirelessSource for ProcWireless {
    fn signal(&mut self, interface: &str) -> Result<SignalReading> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotWireless),
            Err(e) => return Err(e.into()),
        };
        parse_wireless(&content, interface)
    }
}

/// Signal level of `interface` from /proc/net/wireless content.
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
///  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
///  wlan0: 0000   54.  -56.  -256        0      0      0      0      0        0
/// ```
pub fn parse_wireless(content: &str, interface: &str) -> Result<SignalReading> {
    for line in content.lines().skip(2) {
        let Some((name, fields)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != interface {
            continue;
        }

        let level = fields
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| Error::source("wireless", "missing signal level"))?;
        let rssi = level
            .trim_end_matches('.')
            .parse::<i32>()
            .map_err(|e| Error::source("wireless", format!("bad level '{}': {}", level, e)))?;

        return Ok(SignalReading {
            rssi,
            max_rssi: None,
        });
    }

    Err(Error::NotWireless)
}

/// Battery and AC state under /sys/class/power_supply.
pub struct SysfsPower {
    root: PathBuf,
}

impl SysfsPower {
    /// Fails when the power supply class is not readable.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::read_dir(&root).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("{}: {}", root.display(), e),
            ))
        })?;
        Ok(Self { root })
    }
}

impl PowerSource for SysfsPower {
    fn power(&mut self) -> Result<PowerReading> {
        let mut ac_online = None;
        let mut battery = None;

        for entry in fs::read_dir(&self.root)?.flatten() {
            let path = entry.path();
            match read_trimmed(&path.join("type")).as_deref() {
                Some("Mains") | Some("USB") => {
                    let online = read_u64(&path.join("online")) == Some(1);
                    ac_online = Some(ac_online.unwrap_or(false) || online);
                }
                Some("Battery") if battery.is_none() => {
                    battery = read_battery(&path);
                }
                _ => {}
            }
        }

        let Some(battery) = battery else {
            debug!("No battery present");
            return Ok(PowerReading::Absent);
        };

        let on_ac = ac_online.unwrap_or(!battery.discharging);
        Ok(PowerReading::Battery(BatteryStatus {
            on_ac,
            percent: battery.percent,
            minutes_remaining: battery.minutes_remaining,
        }))
    }
}

struct RawBattery {
    percent: u8,
    discharging: bool,
    minutes_remaining: Option<u32>,
}

fn read_battery(path: &Path) -> Option<RawBattery> {
    if read_u64(&path.join("present")) == Some(0) {
        return None;
    }
    let percent = read_u64(&path.join("capacity"))?.min(100) as u8;
    let discharging = read_trimmed(&path.join("status")).as_deref() == Some("Discharging");

    let minutes_remaining = if discharging {
        minutes_left(
            read_u64(&path.join("energy_now")),
            read_u64(&path.join("power_now")),
        )
        .or_else(|| {
            minutes_left(
                read_u64(&path.join("charge_now")),
                read_u64(&path.join("current_now")),
            )
        })
    } else {
        None
    };

    Some(RawBattery {
        percent,
        discharging,
        minutes_remaining,
    })
}

/// Minutes until `remaining` is drained at `rate` (same unit per hour).
fn minutes_left(remaining: Option<u64>, rate: Option<u64>) -> Option<u32> {
    match (remaining, rate) {
        (Some(remaining), Some(rate)) if rate > 0 => {
            Some((remaining.saturating_mul(60) / rate).min(u64::from(u32::MAX)) as u32)
        }
        _ => None,
    }
}

/// One playback channel of a simple mixer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerChannel {
    pub value: u32,
    pub max: u32,
    /// `None` when the control has no playback switch.
    pub muted: Option<bool>,
}

/// Output level and mute of an ALSA simple mixer control, read with
/// `amixer get <control>`.
///
/// Channel `i` is announced as level control `2 * i` and, when it has a
/// playback switch, mute control `2 * i + 1`.
pub struct AmixerControls {
    control: String,
    channels: Vec<MixerChannel>,
    pending: Option<Vec<MixerChannel>>,
}

impl AmixerControls {
    /// Fails when the control cannot be read or has no playback channel.
    pub fn open(control: impl Into<String>) -> Result<Self> {
        let control = control.into();
        let channels = read_mixer(&control)?;
        debug!(control = %control, channels = channels.len(), "Opened mixer control");
        Ok(Self {
            control,
            channels: Vec::new(),
            pending: Some(channels),
        })
    }
}

impl ControlSource for AmixerControls {
    fn event_sources(&self) -> usize {
        1
    }

    fn dispatch(&mut self, handler: &mut dyn ControlHandler) -> Result<()> {
        let current = match self.pending.take() {
            Some(channels) => channels,
            None => read_mixer(&self.control)?,
        };
        notify(&self.channels, &current, handler);
        self.channels = current;
        Ok(())
    }
}

fn read_mixer(control: &str) -> Result<Vec<MixerChannel>> {
    let output = Command::new("amixer")
        .args(["get", control])
        .output()
        .map_err(|e| Error::source("amixer", e))?;
    if !output.status.success() {
        return Err(Error::SourceUnavailable(format!("mixer control '{}'", control)));
    }

    let channels = parse_amixer(&String::from_utf8_lossy(&output.stdout))?;
    if channels.is_empty() {
        return Err(Error::SourceUnavailable(format!(
            "playback channel of mixer control '{}'",
            control
        )));
    }
    Ok(channels)
}

/// Playback channels from `amixer get` output.
///
/// ```text
/// Simple mixer control 'Master',0
///   Capabilities: pvolume pswitch
///   Playback channels: Front Left - Front Right
///   Limits: Playback 0 - 65536
///   Mono:
///   Front Left: Playback 32768 [50%] [on]
///   Front Right: Playback 32768 [50%] [on]
/// ```
pub fn parse_amixer(content: &str) -> Result<Vec<MixerChannel>> {
    let mut max = None;
    let mut readings = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if let Some(limits) = line.strip_prefix("Limits:") {
            max = limits
                .rsplit('-')
                .next()
                .and_then(|s| s.trim().parse::<u32>().ok());
            continue;
        }

        let Some((_, rest)) = line.split_once(": Playback ") else {
            continue;
        };
        let Some(value) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u32>().ok())
        else {
            continue;
        };
        let muted = if rest.contains("[off]") {
            Some(true)
        } else if rest.contains("[on]") {
            Some(false)
        } else {
            None
        };
        readings.push((value, muted));
    }

    if readings.is_empty() {
        return Ok(Vec::new());
    }
    let max = max.ok_or_else(|| Error::source("amixer", "missing playback limits"))?;

    Ok(readings
        .into_iter()
        .map(|(value, muted)| MixerChannel { value, max, muted })
        .collect())
}

/// Deliver the difference between two channel readings as control
/// notifications. A changed channel layout re-announces every control.
fn notify(
    previous: &[MixerChannel],
    current: &[MixerChannel],
    handler: &mut dyn ControlHandler,
) {
    let same_layout = previous.len() == current.len()
        && previous
            .iter()
            .zip(current)
            .all(|(p, c)| p.max == c.max && p.muted.is_some() == c.muted.is_some());

    if !same_layout {
        for (i, channel) in current.iter().enumerate() {
            let (level, mute) = channel_addrs(i);
            handler.on_descriptor(
                &output_descriptor(level, "level", ControlType::Number { max: channel.max }),
                channel.value,
            );
            if let Some(muted) = channel.muted {
                handler.on_descriptor(
                    &output_descriptor(mute, "mute", ControlType::Switch),
                    u32::from(muted),
                );
            }
        }
        return;
    }

    for (i, (old, new)) in previous.iter().zip(current).enumerate() {
        let (level, mute) = channel_addrs(i);
        if old.value != new.value {
            handler.on_value(level, new.value);
        }
        if old.muted != new.muted {
            if let Some(muted) = new.muted {
                handler.on_value(mute, u32::from(muted));
            }
        }
    }
}

fn channel_addrs(channel: usize) -> (u32, u32) {
    let level = (channel as u32) * 2;
    (level, level + 1)
}

fn output_descriptor(addr: u32, func: &str, kind: ControlType) -> ControlDescriptor {
    ControlDescriptor {
        addr,
        group: String::new(),
        node: "output".to_string(),
        func: func.to_string(),
        kind,
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path).and_then(|s| s.parse().ok())
}
