use std::time::Duration;

/// Configuration for the periodic status reporter.
///
/// All cadences are fixed at startup; there is no rate adaptation.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Registry name of the battery device.
    pub battery_device: String,
    /// Sampling cadence requested from both subsystems, in milliseconds.
    pub poll_rate_ms: u32,
    /// Delay before the first report fires.
    pub startup_delay: Duration,
    /// Steady-state reporting period.
    pub report_period: Duration,
    /// Backlight descriptor rendered into every report. Constant for now,
    /// not wired to any real backlight state.
    pub backlight_level: &'static str,
    pub backlight_percent: i32,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            battery_device: "battery".to_string(),
            poll_rate_ms: 1000,
            startup_delay: Duration::from_millis(800),
            report_period: Duration::from_secs(1),
            backlight_level: "high",
            backlight_percent: 50,
        }
    }
}
