//! Low battery alerting.

use dstat_common::{BatteryStatus, Result};
use tracing::{info, warn};

/// Default minutes of charge left at which the alert fires.
pub const DEFAULT_ALERT_MINUTES: u32 = 10;

/// Surface that shows the low battery alert.
///
/// `show_alert` may block until the user dismisses the alert.
pub trait AlertDisplay {
    fn show_alert(&mut self, message: &str) -> Result<()>;
}

/// Alert latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Normal,
    Alerted,
}

/// Fires the alert once per discharge below the threshold.
///
/// The latch is released only when AC power comes back; staying on battery
/// keeps it set however long the charge keeps dropping.
#[derive(Debug)]
pub struct BatteryAlertStateMachine {
    state: AlertState,
    threshold_minutes: u32,
    message: String,
}

impl BatteryAlertStateMachine {
    pub fn new(threshold_minutes: u32, message: impl Into<String>) -> Self {
        Self {
            state: AlertState::Normal,
            threshold_minutes,
            message: message.into(),
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Advance the latch with a fresh battery reading.
    ///
    /// Returns whether the alert display was invoked.
    pub fn evaluate(&mut self, status: &BatteryStatus, display: &mut dyn AlertDisplay) -> bool {
        let mut fired = false;

        if self.state == AlertState::Normal && !status.on_ac && self.is_low(status) {
            info!(
                percent = status.percent,
                minutes = ?status.minutes_remaining,
                "Battery low, showing alert"
            );
            if let Err(e) = display.show_alert(&self.message) {
                warn!(error = %e, "Failed to show battery alert");
            }
            self.state = AlertState::Alerted;
            fired = true;
        }

        if status.on_ac {
            self.state = AlertState::Normal;
        }

        fired
    }

    fn is_low(&self, status: &BatteryStatus) -> bool {
        status
            .minutes_remaining
            .is_some_and(|minutes| minutes <= self.threshold_minutes)
    }
}

impl Default for BatteryAlertStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_MINUTES, "Battery is low.")
    }
}
