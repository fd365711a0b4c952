//! CPU utilisation from scheduler tick counters.

use dstat_common::{CpuLoad, Result};

use crate::rate::RateTracker;
use crate::source::{CpuTickSource, CpuTicks};

/// Computes busy time as a share of all time elapsed since the last tick.
#[derive(Debug, Default)]
pub struct CpuLoadSampler {
    user: RateTracker,
    nice: RateTracker,
    system: RateTracker,
    idle: RateTracker,
}

impl CpuLoadSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the tick counters and compute utilisation.
    pub fn sample(&mut self, source: &mut dyn CpuTickSource) -> Result<CpuLoad> {
        let ticks = source.ticks()?;
        Ok(self.load(ticks))
    }

    /// Utilisation between the previous tick vector and `ticks`.
    ///
    /// The first call measures against an all-zero baseline, so it reports
    /// the average load since boot.
    pub fn load(&mut self, ticks: CpuTicks) -> CpuLoad {
        let busy = self.user.sample(ticks.user)
            + self.system.sample(ticks.system)
            + self.nice.sample(ticks.nice);
        let total = busy + self.idle.sample(ticks.idle);

        let percent = if total == 0 {
            0
        } else {
            (busy as f64 / total as f64 * 100.0) as u8
        };

        CpuLoad { percent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(user: u64, nice: u64, system: u64, idle: u64) -> CpuTicks {
        CpuTicks {
            user,
            nice,
            system,
            idle,
        }
    }

    #[test]
    fn test_fully_busy() {
        let mut sampler = CpuLoadSampler::new();
        sampler.load(ticks(500, 10, 200, 1000));

        let load = sampler.load(ticks(600, 10, 200, 1000));
        assert_eq!(load.percent, 100);
    }

    #[test]
    fn test_partial_load() {
        let mut sampler = CpuLoadSampler::new();
        sampler.load(ticks(1000, 0, 500, 8000));

        // 6 user + 4 system + 2 nice busy, 88 idle
        let load = sampler.load(ticks(1006, 2, 504, 8088));
        assert_eq!(load.percent, 12);
    }

    #[test]
    fn test_cold_start_uses_zero_baseline() {
        let mut sampler = CpuLoadSampler::new();

        let load = sampler.load(ticks(100, 0, 0, 300));
        assert_eq!(load.percent, 25);
    }

    #[test]
    fn test_no_elapsed_ticks() {
        let mut sampler = CpuLoadSampler::new();
        sampler.load(ticks(100, 0, 0, 300));

        let load = sampler.load(ticks(100, 0, 0, 300));
        assert_eq!(load.percent, 0);
    }

    #[test]
    fn test_idle() {
        let mut sampler = CpuLoadSampler::new();
        sampler.load(ticks(100, 0, 0, 300));

        let load = sampler.load(ticks(100, 0, 0, 400));
        assert_eq!(load.percent, 0);
    }
}
