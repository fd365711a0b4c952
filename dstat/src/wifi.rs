//! Wireless signal quality.

use dstat_common::{Error, Result};
use tracing::{debug, warn};

use crate::source::{SignalReading, WirelessSource};

/// Signal at or above this strength counts as full quality.
const RSSI_FULL_DBM: i32 = -50;

/// Signal at or below this strength counts as no quality.
const RSSI_NONE_DBM: i32 = -100;

/// Maps wireless signal readings onto a 0-100 quality scale.
#[derive(Debug, Default)]
pub struct WifiQualitySampler;

impl WifiQualitySampler {
    pub fn new() -> Self {
        Self
    }

    /// Signal quality of `interface`.
    ///
    /// `None` when the interface is not wireless. Read failures are logged
    /// and reported as `None` as well, the network fragment carries on
    /// without the quality dots.
    pub fn sample(&self, source: &mut dyn WirelessSource, interface: &str) -> Option<u8> {
        match self.quality(source, interface) {
            Ok(quality) => quality,
            Err(e) => {
                warn!(interface, error = %e, "Failed to read wireless signal");
                None
            }
        }
    }

    /// Like [`sample`](Self::sample) but passes read failures through.
    pub fn quality(&self, source: &mut dyn WirelessSource, interface: &str) -> Result<Option<u8>> {
        match source.signal(interface) {
            Ok(reading) => Ok(Some(signal_quality(reading))),
            Err(Error::NotWireless) => {
                debug!(interface, "Interface is not wireless");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Quality percentage of a signal reading.
///
/// Readings with an adapter full scale use the adapter's own ratio;
/// plain dBm readings are mapped linearly between -100 dBm and -50 dBm.
pub fn signal_quality(reading: SignalReading) -> u8 {
    let quality = match reading.max_rssi {
        Some(max) if max > 0 => reading.rssi.saturating_mul(100) / max,
        _ if reading.rssi >= RSSI_FULL_DBM => 100,
        _ if reading.rssi <= RSSI_NONE_DBM => 0,
        _ => 2 * (reading.rssi - RSSI_NONE_DBM),
    };
    quality.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dbm(rssi: i32) -> SignalReading {
        SignalReading {
            rssi,
            max_rssi: None,
        }
    }

    struct FixedSignal(Result<SignalReading>);

    impl WirelessSource for FixedSignal {
        fn signal(&mut self, _interface: &str) -> Result<SignalReading> {
            match &self.0 {
                Ok(reading) => Ok(*reading),
                Err(Error::NotWireless) => Err(Error::NotWireless),
                Err(e) => Err(Error::source("wireless", e)),
            }
        }
    }

    #[test]
    fn test_linear_dbm_mapping() {
        assert_eq!(signal_quality(dbm(-50)), 100);
        assert_eq!(signal_quality(dbm(-30)), 100);
        assert_eq!(signal_quality(dbm(-100)), 0);
        assert_eq!(signal_quality(dbm(-110)), 0);
        assert_eq!(signal_quality(dbm(-75)), 50);
        assert_eq!(signal_quality(dbm(-99)), 2);
    }

    #[test]
    fn test_adapter_ratio_wins() {
        let reading = SignalReading {
            rssi: 30,
            max_rssi: Some(60),
        };
        assert_eq!(signal_quality(reading), 50);

        let reading = SignalReading {
            rssi: 80,
            max_rssi: Some(60),
        };
        assert_eq!(signal_quality(reading), 100);
    }

    #[test]
    fn test_zero_full_scale_falls_back_to_dbm() {
        let reading = SignalReading {
            rssi: -75,
            max_rssi: Some(0),
        };
        assert_eq!(signal_quality(reading), 50);
    }

    #[test]
    fn test_not_wireless_is_absent() {
        let sampler = WifiQualitySampler::new();
        let mut source = FixedSignal(Err(Error::NotWireless));

        assert_eq!(sampler.quality(&mut source, "em0").unwrap(), None);
        assert_eq!(sampler.sample(&mut source, "em0"), None);
    }

    #[test]
    fn test_read_failure_is_distinct_from_absence() {
        let sampler = WifiQualitySampler::new();
        let mut source = FixedSignal(Err(Error::source("wireless", "ioctl")));

        assert!(sampler.quality(&mut source, "iwm0").is_err());
        assert_eq!(sampler.sample(&mut source, "iwm0"), None);
    }

    #[test]
    fn test_sample_quality() {
        let sampler = WifiQualitySampler::new();
        let mut source = FixedSignal(Ok(dbm(-75)));

        assert_eq!(sampler.sample(&mut source, "iwm0"), Some(50));
    }
}
