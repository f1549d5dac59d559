//! Battery subsystem contract.
//!
//! A battery device exposes typed properties that it samples internally at a
//! configurable poll rate; subscribers are notified whenever a property's
//! value changes.

use crate::error::Result;

/// Property kinds a battery device can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Instantaneous battery voltage, millivolts.
    VoltageNow,
    /// Relative state of charge, percent.
    StateOfCharge,
    /// Battery temperature, tenths of a degree Celsius.
    Temperature,
}

/// A change-notification payload, tagged with the property it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    VoltageNow(i32),
    StateOfCharge(u8),
    Temperature(i32),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::VoltageNow(_) => PropertyKind::VoltageNow,
            PropertyValue::StateOfCharge(_) => PropertyKind::StateOfCharge,
            PropertyValue::Temperature(_) => PropertyKind::Temperature,
        }
    }
}

/// Reference to a property located on a battery device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryProperty {
    kind: PropertyKind,
}

impl BatteryProperty {
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }
}

/// Change-notification capability registered against a battery property.
pub trait PropertyListener: Send {
    fn on_value_changed(&mut self, value: PropertyValue);
}

/// A battery device obtained from the platform registry.
pub trait BatteryDevice: Send {
    /// Locate a property by kind.
    fn find_property(&mut self, kind: PropertyKind) -> Result<BatteryProperty>;

    /// Register a listener invoked whenever the property's value changes.
    fn subscribe(
        &mut self,
        property: &BatteryProperty,
        listener: Box<dyn PropertyListener>,
    ) -> Result<()>;

    /// Set the cadence at which the device samples its properties.
    fn set_poll_rate_ms(&mut self, interval_ms: u32) -> Result<()>;
}
