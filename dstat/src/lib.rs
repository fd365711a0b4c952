//! Status line generator.
//!
//! Once per tick every metric source is sampled and the readings are
//! composed into one line of space separated fragments:
//!
//! ```text
//! ↑ 12.3K/s ↓ 45.6K/s [..] CPU 7% ▁ 2.4GHz [50%] ⚡ 82% ▇ [3:14] T 54.2°C ♫ 63% ▆ Wed Jan 01 12:00 PM
//! ```
//!
//! A source that fails only replaces its own fragment with a short
//! failure literal such as `cpu failed`.

pub mod args;
pub mod battery;
pub mod compose;
pub mod config;
pub mod controls;
pub mod cpu;
pub mod display;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod network;
pub mod poller;
pub mod rate;
pub mod source;
pub mod temperature;
pub mod wifi;
