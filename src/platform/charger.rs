//! Charge controller contract.
//!
//! The charge controller is located by type rather than by name. Besides the
//! polled subscription it supports an immediate read, used at startup to get
//! a first status without waiting for the first poll tick.

use crate::error::Result;

/// Report kinds a charge controller can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeControlKind {
    /// Charge source / charge cycle status.
    Status,
    /// Fault condition report.
    Fault,
}

/// Charger status as reported by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChargerStatus {
    /// No charge source connected.
    NoSource,
    /// Actively charging.
    Charging,
    /// Charge cycle finished.
    ChargeComplete,
    /// Status unknown or not reported.
    #[default]
    Other,
}

/// Change-notification capability registered against a charge controller.
pub trait ChargeListener: Send {
    fn on_value_changed(&mut self, kind: ChargeControlKind, status: ChargerStatus);
}

/// A charge controller located by type from the platform.
pub trait ChargeController: Send {
    /// Set the cadence at which the controller samples its status.
    fn set_poll_rate_ms(&mut self, interval_ms: u32) -> Result<()>;

    /// Register a listener invoked whenever the status changes.
    fn subscribe(&mut self, listener: Box<dyn ChargeListener>) -> Result<()>;

    /// Read the current status immediately, delivering it through the
    /// registered listener. Blocks without a timeout.
    fn read_now(&mut self) -> Result<()>;
}
