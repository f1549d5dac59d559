use std::io;
use thiserror::Error;

/// Custom error type for the battstat reporter
#[derive(Error, Debug)]
pub enum BattstatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Subscription failed: {0}")]
    Subscribe(String),

    #[error("Poll rate configuration failed: {0}")]
    PollRate(String),

    #[error("Hardware fault: {0}")]
    Hardware(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Identity error: {0}")]
    Identity(String),
}

/// Result type alias for the battstat reporter
pub type Result<T> = std::result::Result<T, BattstatError>;

impl BattstatError {
    /// Create a device-not-found error
    pub fn device_not_found<S: Into<String>>(msg: S) -> Self {
        BattstatError::DeviceNotFound(msg.into())
    }

    /// Create a property-not-found error
    pub fn property_not_found<S: Into<String>>(msg: S) -> Self {
        BattstatError::PropertyNotFound(msg.into())
    }

    /// Create a subscription error
    pub fn subscribe<S: Into<String>>(msg: S) -> Self {
        BattstatError::Subscribe(msg.into())
    }

    /// Create a poll-rate configuration error
    pub fn poll_rate<S: Into<String>>(msg: S) -> Self {
        BattstatError::PollRate(msg.into())
    }

    /// Create a hardware fault error
    pub fn hardware<S: Into<String>>(msg: S) -> Self {
        BattstatError::Hardware(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        BattstatError::Scheduler(msg.into())
    }

    pub fn identity<S: Into<String>>(msg: S) -> Self {
        BattstatError::Identity(msg.into())
    }
}
