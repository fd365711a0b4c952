//! Audio control tracking.
//!
//! The audio subsystem announces its controls through descriptor
//! notifications and reports later changes through value notifications.
//! [`ControlRegistry`] keeps the output level and mute controls it has been
//! told about and folds them into a single [`Volume`] reading.

use std::collections::HashMap;

use dstat_common::{Result, Volume};
use tracing::{debug, trace};

/// Default number of controls (and poll descriptors) tracked.
pub const DEFAULT_CAPACITY: usize = 64;

/// Value type of an audio control as announced by its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    /// Numeric control ranging over `0..=max`.
    Number { max: u32 },
    /// On/off switch.
    Switch,
    /// Any other control type.
    Other,
}

/// Description of one audio control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    /// Identity of the control within the audio subsystem.
    pub addr: u32,
    /// Control group, empty for the default group.
    pub group: String,
    /// Name of the node the control acts on, e.g. "output".
    pub node: String,
    /// Function of the control, e.g. "level" or "mute".
    pub func: String,
    pub kind: ControlType,
}

/// Receiver of audio control notifications.
pub trait ControlHandler {
    /// A control was announced (or re-announced) with its current value.
    fn on_descriptor(&mut self, descriptor: &ControlDescriptor, value: u32);

    /// The value of a previously announced control changed.
    fn on_value(&mut self, addr: u32, value: u32);
}

/// Audio control source with poll driven notification delivery.
pub trait ControlSource {
    /// Number of event sources (poll descriptors) the handle exposes.
    fn event_sources(&self) -> usize;

    /// Deliver pending notifications to `handler` without blocking.
    fn dispatch(&mut self, handler: &mut dyn ControlHandler) -> Result<()>;
}

/// What an entry controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Level { max: u32 },
    Mute,
}

/// One tracked control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry {
    pub addr: u32,
    pub kind: ControlKind,
    pub value: u32,
}

/// Insertion ordered set of output level and mute controls.
#[derive(Debug)]
pub struct ControlRegistry {
    entries: Vec<ControlEntry>,
    index: HashMap<u32, usize>,
    capacity: usize,
}

impl ControlRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tracked controls in registration order.
    pub fn entries(&self) -> &[ControlEntry] {
        &self.entries
    }

    pub fn get(&self, addr: u32) -> Option<&ControlEntry> {
        self.index.get(&addr).map(|&i| &self.entries[i])
    }

    /// Apply pending notifications from `source`.
    ///
    /// Skipped when the source exposes more event sources than the
    /// registry can poll.
    pub fn refresh(&mut self, source: &mut dyn ControlSource) -> Result<()> {
        let sources = source.event_sources();
        if sources > self.capacity {
            debug!(
                sources,
                capacity = self.capacity,
                "Too many control event sources, skipping refresh"
            );
            return Ok(());
        }
        source.dispatch(self)
    }

    /// Aggregate output volume.
    ///
    /// An engaged mute control anywhere in the registry reads as muted.
    /// Otherwise the loudest level control wins, 0 without any.
    pub fn volume(&self) -> Volume {
        let mut loudest = 0u8;
        for entry in &self.entries {
            match entry.kind {
                ControlKind::Mute if entry.value == 1 => return Volume::Muted,
                ControlKind::Mute => {}
                ControlKind::Level { max } if max > 0 => {
                    let percent = (u64::from(entry.value) * 100 / u64::from(max)).min(100);
                    loudest = loudest.max(percent as u8);
                }
                ControlKind::Level { .. } => {}
            }
        }
        Volume::Level(loudest)
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Kind of entry a descriptor maps to, if it is an output level or mute.
fn admitted_kind(descriptor: &ControlDescriptor) -> Option<ControlKind> {
    if !descriptor.group.is_empty() || descriptor.node != "output" {
        return None;
    }
    match (descriptor.kind, descriptor.func.as_str()) {
        (ControlType::Number { max }, "level") => Some(ControlKind::Level { max }),
        (ControlType::Switch, "mute") => Some(ControlKind::Mute),
        _ => None,
    }
}

impl ControlHandler for ControlRegistry {
    fn on_descriptor(&mut self, descriptor: &ControlDescriptor, value: u32) {
        let Some(kind) = admitted_kind(descriptor) else {
            trace!(addr = descriptor.addr, func = %descriptor.func, "Ignoring control");
            return;
        };

        let entry = ControlEntry {
            addr: descriptor.addr,
            kind,
            value,
        };

        if let Some(&i) = self.index.get(&descriptor.addr) {
            self.entries[i] = entry;
        } else if self.entries.len() < self.capacity {
            debug!(addr = descriptor.addr, ?kind, value, "Tracking control");
            self.index.insert(descriptor.addr, self.entries.len());
            self.entries.push(entry);
        } else {
            debug!(addr = descriptor.addr, "Control registry full, ignoring control");
        }
    }

    fn on_value(&mut self, addr: u32, value: u32) {
        if let Some(&i) = self.index.get(&addr) {
            self.entries[i].value = value;
        }
    }
}
