//! Interface throughput.

use dstat_common::{Error, NetworkRates, Result};

use crate::rate::RateTracker;
use crate::source::{NetworkSource, WirelessSource};
use crate::wifi::WifiQualitySampler;

/// Reports bytes moved by one interface since the previous tick.
#[derive(Debug)]
pub struct NetworkRateSampler {
    interface: String,
    tx: RateTracker,
    rx: RateTracker,
    wifi: WifiQualitySampler,
}

impl NetworkRateSampler {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            tx: RateTracker::new(),
            rx: RateTracker::new(),
            wifi: WifiQualitySampler::new(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Sample the interface counters and its wireless quality.
    ///
    /// Fails with [`Error::SourceUnavailable`] when no record of the
    /// interface is reported. Records sharing the interface name are summed.
    pub fn sample(
        &mut self,
        network: &mut dyn NetworkSource,
        wireless: &mut dyn WirelessSource,
    ) -> Result<NetworkRates> {
        let records = network.interfaces()?;

        let (rx_total, tx_total, found) = records
            .iter()
            .filter(|r| r.name == self.interface)
            .fold((0u64, 0u64, false), |(rx, tx, _), r| {
                (rx.wrapping_add(r.rx_bytes), tx.wrapping_add(r.tx_bytes), true)
            });

        if !found {
            return Err(Error::SourceUnavailable(format!(
                "interface {}",
                self.interface
            )));
        }

        let tx_bytes = primed_delta(&mut self.tx, tx_total);
        let rx_bytes = primed_delta(&mut self.rx, rx_total);
        let quality = self.wifi.sample(wireless, &self.interface);

        Ok(NetworkRates {
            tx_bytes,
            rx_bytes,
            quality,
        })
    }
}

/// Delta of a byte counter, reporting zero until a previous value exists.
fn primed_delta(tracker: &mut RateTracker, current: u64) -> u64 {
    let primed = tracker.previous() != 0;
    let delta = tracker.sample(current);
    if primed { delta } else { 0 }
}
