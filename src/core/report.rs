//! Snapshot composition and rendering.

use serde::Serialize;

use crate::core::identity::HardwareIdentity;
use crate::core::status::StatusState;
use crate::platform::ChargerStatus;

/// Point-in-time report record, rendered to a single JSON line.
///
/// Ephemeral: composed at emit time, never stored. Field declaration order
/// is the output contract; serde preserves it.
#[derive(Debug, Serialize)]
pub struct ReportSnapshot<'a> {
    pub mac_addr: &'a str,
    pub uptime_usec: i64,
    pub charger_state: &'static str,
    pub battery_voltage_mv: i32,
    pub backlight: BacklightReport,
}

/// Backlight descriptor carried in every report. Constant for now, not
/// wired to any real backlight state.
#[derive(Debug, Serialize)]
pub struct BacklightReport {
    pub level: &'static str,
    pub percent: i32,
}

/// Output label for a charger status.
pub fn charger_state_label(status: ChargerStatus) -> &'static str {
    match status {
        ChargerStatus::NoSource => "no_source",
        ChargerStatus::Charging => "charging",
        ChargerStatus::ChargeComplete => "completed",
        ChargerStatus::Other => "unknown",
    }
}

impl<'a> ReportSnapshot<'a> {
    /// Compose a snapshot from the current state.
    pub fn compose(
        identity: &'a HardwareIdentity,
        uptime_usec: i64,
        status: &StatusState,
        backlight: BacklightReport,
    ) -> Self {
        Self {
            mac_addr: identity.display(),
            uptime_usec,
            charger_state: charger_state_label(status.charger),
            battery_voltage_mv: status.battery_voltage_mv,
            backlight,
        }
    }

    /// Render as a single JSON line (no trailing newline).
    pub fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backlight_stub() -> BacklightReport {
        BacklightReport {
            level: "high",
            percent: 50,
        }
    }

    #[test]
    fn labels_cover_all_statuses() {
        assert_eq!(charger_state_label(ChargerStatus::NoSource), "no_source");
        assert_eq!(charger_state_label(ChargerStatus::Charging), "charging");
        assert_eq!(charger_state_label(ChargerStatus::ChargeComplete), "completed");
        assert_eq!(charger_state_label(ChargerStatus::Other), "unknown");
    }

    #[test]
    fn renders_sentinels_before_any_delivery() {
        let identity = HardwareIdentity::from_address([0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33]);
        let snapshot =
            ReportSnapshot::compose(&identity, 1234, &StatusState::default(), backlight_stub());
        assert_eq!(
            snapshot.render().unwrap(),
            "{\"mac_addr\":\"aa:bb:cc:11:22:33\",\"uptime_usec\":1234,\
             \"charger_state\":\"unknown\",\"battery_voltage_mv\":0,\
             \"backlight\":{\"level\":\"high\",\"percent\":50}}"
        );
    }

    #[test]
    fn renders_delivered_values_in_fixed_field_order() {
        let identity = HardwareIdentity::from_address([0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33]);
        let status = StatusState {
            battery_voltage_mv: 3950,
            charger: ChargerStatus::Charging,
        };
        let line = ReportSnapshot::compose(&identity, 5_000_000_000, &status, backlight_stub())
            .render()
            .unwrap();

        // Uptime is emitted as a 64-bit quantity.
        assert!(line.contains("\"uptime_usec\":5000000000"));
        assert!(line.contains("\"battery_voltage_mv\":3950"));
        assert!(line.contains("\"charger_state\":\"charging\""));

        let order: Vec<usize> = [
            "\"mac_addr\"",
            "\"uptime_usec\"",
            "\"charger_state\"",
            "\"battery_voltage_mv\"",
            "\"backlight\"",
        ]
        .iter()
        .map(|key| line.find(key).unwrap())
        .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["backlight"]["level"], "high");
        assert_eq!(parsed["backlight"]["percent"], 50);
    }
}
