//! The once-per-tick sampling loop.

use std::io::Write;
use std::time::Duration;

use dstat_common::{PowerReading, Result, Volume, current_timestamp_millis};
use tracing::{debug, info, warn};

use crate::battery::{AlertDisplay, BatteryAlertStateMachine};
use crate::compose::{MetricSnapshot, compose};
use crate::config::DstatConfig;
use crate::controls::ControlRegistry;
use crate::cpu::CpuLoadSampler;
use crate::display::LineOutput;
use crate::network::NetworkRateSampler;
use crate::source::Sources;
use crate::temperature;

/// Owns every sampler and source and drives them once per tick.
pub struct PollLoop {
    network: NetworkRateSampler,
    cpu: CpuLoadSampler,
    controls: ControlRegistry,
    battery: BatteryAlertStateMachine,
    sources: Sources,
    alert: Box<dyn AlertDisplay>,
    interval: Duration,
}

impl PollLoop {
    pub fn new(
        interface: impl Into<String>,
        config: &DstatConfig,
        sources: Sources,
        alert: Box<dyn AlertDisplay>,
    ) -> Self {
        Self {
            network: NetworkRateSampler::new(interface),
            cpu: CpuLoadSampler::new(),
            controls: ControlRegistry::new(config.audio.max_controls),
            battery: BatteryAlertStateMachine::new(
                config.battery.alert_minutes,
                config.battery.message.clone(),
            ),
            sources,
            alert,
            interval: Duration::from_secs(config.poll_interval_secs),
        }
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn battery(&self) -> &BatteryAlertStateMachine {
        &self.battery
    }

    /// Sample every source once.
    ///
    /// A failing source only affects its own reading. The alert display
    /// may block this call while it is shown.
    pub fn tick(&mut self) -> MetricSnapshot {
        let timestamp = current_timestamp_millis();

        let network = self
            .network
            .sample(self.sources.network.as_mut(), self.sources.wireless.as_mut());
        log_failure("network", &network);

        let cpu = self.cpu.sample(self.sources.cpu.as_mut());
        log_failure("cpu", &cpu);

        let perf = self.sources.perf.perf();
        log_failure("perf", &perf);

        let power = self.sample_power();
        log_failure("power", &power);

        let temperature = temperature::sample(self.sources.thermal.as_mut());
        log_failure("temperature", &temperature);

        let volume = self.sample_volume();
        log_failure("volume", &volume);

        let time = self.sources.clock.now();
        log_failure("time", &time);

        MetricSnapshot {
            timestamp,
            network,
            cpu,
            perf,
            power,
            temperature,
            volume,
            time,
        }
    }

    /// Read the power source and run the alert latch on battery readings.
    fn sample_power(&mut self) -> Result<PowerReading> {
        let reading = self.sources.power.power()?;
        if let PowerReading::Battery(status) = &reading {
            self.battery.evaluate(status, self.alert.as_mut());
        }
        Ok(reading)
    }

    /// Refresh the control registry, then read the aggregate volume.
    fn sample_volume(&mut self) -> Result<Volume> {
        self.controls.refresh(self.sources.controls.as_mut())?;
        Ok(self.controls.volume())
    }

    /// Sample, compose and emit one line.
    pub fn step<W: Write>(&mut self, output: &mut LineOutput<W>) -> Result<String> {
        let snapshot = self.tick();
        let line = compose(&snapshot);
        output.emit(&snapshot, &line)?;
        Ok(line)
    }

    /// Run until Ctrl+C or until the output stream fails.
    ///
    /// Ctrl+C is only observed between ticks. While a modal alert blocks
    /// [`PollLoop::tick`], the signal stays pending and the loop exits
    /// right after the alert is dismissed.
    pub async fn run<W: Write>(mut self, mut output: LineOutput<W>) -> Result<()> {
        info!(
            interface = self.network.interface(),
            interval_secs = self.interval.as_secs(),
            "Starting status loop"
        );

        let mut shutdown = std::pin::pin!(tokio::signal::ctrl_c());

        loop {
            self.step(&mut output)?;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for Ctrl+C");
                    }
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Log a sampler failure; expected absences only at debug level.
fn log_failure<T>(sampler: &'static str, result: &Result<T>) {
    match result {
        Err(e) if e.is_expected_absence() => debug!(sampler, reason = %e, "Reading not available"),
        Err(e) => warn!(sampler, error = %e, "Sampling failed"),
        Ok(_) => {}
    }
}
