// Battstat Library - Public API

// Re-export error types
pub mod error;
pub use error::{BattstatError, Result};

// Module declarations
pub mod config;
pub mod core;
pub mod platform;

// Re-export commonly used types
pub use crate::config::ReporterConfig;
pub use crate::core::reporter::Reporter;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
