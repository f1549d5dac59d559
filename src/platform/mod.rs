//! Hardware platform contracts consumed by the reporter core.
//!
//! The reporter never talks to drivers directly; everything it needs from
//! the device — the battery and charger subsystems, the hardware address,
//! output pins, the uptime clock and the output sink — comes through the
//! traits in this module. `sim` provides an in-process implementation of
//! all of them.

pub mod battery;
pub mod charger;
pub mod sim;

pub use battery::{
    BatteryDevice, BatteryProperty, PropertyKind, PropertyListener, PropertyValue,
};
pub use charger::{ChargeControlKind, ChargeController, ChargeListener, ChargerStatus};

use crate::error::Result;

/// Fixed-function output pins the reporter drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFunction {
    /// Blinking liveness indicator, toggled once per report.
    HeartbeatLed,
    /// Backlight enable line, driven high once at startup.
    BacklightHigh,
}

/// A claimed binary output pin.
pub trait OutputPin: Send {
    fn set(&mut self, high: bool) -> Result<()>;
    fn toggle(&mut self) -> Result<()>;
}

/// Monotonic uptime source.
pub trait UptimeClock: Send {
    /// Microseconds since process start. May exceed 32-bit range.
    fn uptime_usec(&self) -> i64;
}

/// Line-oriented sink for rendered reports. Writes are best-effort and
/// assumed unbounded; there is no failure path.
pub trait ReportSink: Send {
    fn write_line(&mut self, line: &str);
}

/// Access to the device registry and the fixed hardware capabilities.
pub trait Platform {
    /// Look up the named battery device in the registry.
    fn open_battery(&mut self, name: &str) -> Result<Box<dyn BatteryDevice>>;

    /// Locate the charge controller by type.
    fn find_charge_controller(&mut self) -> Result<Box<dyn ChargeController>>;

    /// Read the fixed 6-byte hardware address.
    fn hardware_address(&mut self) -> Result<[u8; 6]>;

    /// Claim an output pin, driving it to the given initial level.
    fn claim_output_pin(&mut self, pin: PinFunction, initial_high: bool)
        -> Result<Box<dyn OutputPin>>;

    /// Monotonic uptime clock.
    fn uptime_clock(&mut self) -> Box<dyn UptimeClock>;

    /// Sink for rendered status lines.
    fn report_sink(&mut self) -> Box<dyn ReportSink>;
}

/// Default clock: microseconds elapsed since construction.
pub struct MonotonicClock {
    start: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock for MonotonicClock {
    fn uptime_usec(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Sink that prints each report line to stdout.
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}
