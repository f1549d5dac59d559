//! Simulated hardware platform.
//!
//! Stands in for the real drivers so the reporter can run on a host
//! machine. The battery and charger drivers poll an injectable value at the
//! configured rate and notify their listener when it changes; pins record
//! their level and toggle count; the sink can be replaced to capture
//! rendered lines. Control handles expose the injectable values to the CLI
//! and to tests.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::{BattstatError, Result};

use super::battery::{
    BatteryDevice, BatteryProperty, PropertyKind, PropertyListener, PropertyValue,
};
use super::charger::{ChargeControlKind, ChargeController, ChargeListener, ChargerStatus};
use super::{
    ConsoleSink, MonotonicClock, OutputPin, PinFunction, Platform, ReportSink, UptimeClock,
};

/// Default simulated hardware address.
pub const DEFAULT_ADDRESS: [u8; 6] = [0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33];

/// Default simulated battery voltage, millivolts.
pub const DEFAULT_VOLTAGE_MV: i32 = 4050;

type SharedListener<L> = Arc<Mutex<Option<Box<L>>>>;

fn with_listener<L: ?Sized>(slot: &SharedListener<L>, op: impl FnOnce(&mut L)) {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(listener) = guard.as_mut() {
        op(listener);
    }
}

/// Simulated battery device.
///
/// Exposes a single `VoltageNow` property. Once a poll rate is configured, a
/// driver task samples the shared voltage at that cadence and notifies the
/// registered listener on change.
pub struct SimBattery {
    voltage_mv: Arc<AtomicI32>,
    listener: SharedListener<dyn PropertyListener>,
    poll_rate_ms: Option<u32>,
}

impl SimBattery {
    fn new(voltage_mv: Arc<AtomicI32>) -> Self {
        Self {
            voltage_mv,
            listener: Arc::new(Mutex::new(None)),
            poll_rate_ms: None,
        }
    }
}

impl BatteryDevice for SimBattery {
    fn find_property(&mut self, kind: PropertyKind) -> Result<BatteryProperty> {
        match kind {
            PropertyKind::VoltageNow => Ok(BatteryProperty::new(kind)),
            other => Err(BattstatError::property_not_found(format!(
                "battery does not expose {other:?}"
            ))),
        }
    }

    fn subscribe(
        &mut self,
        property: &BatteryProperty,
        listener: Box<dyn PropertyListener>,
    ) -> Result<()> {
        if property.kind() != PropertyKind::VoltageNow {
            return Err(BattstatError::subscribe(format!(
                "no subscription point for {:?}",
                property.kind()
            )));
        }
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(listener);
        Ok(())
    }

    fn set_poll_rate_ms(&mut self, interval_ms: u32) -> Result<()> {
        if interval_ms == 0 {
            return Err(BattstatError::poll_rate("poll rate must be nonzero"));
        }
        if self.poll_rate_ms.replace(interval_ms).is_some() {
            return Err(BattstatError::poll_rate("poll rate already configured"));
        }

        let voltage = Arc::clone(&self.voltage_mv);
        let listener = Arc::clone(&self.listener);
        let period = Duration::from_millis(u64::from(interval_ms));
        tokio::spawn(async move {
            // First sample one full period after arming, like the hardware.
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<i32> = None;
            loop {
                ticker.tick().await;
                let mv = voltage.load(Ordering::Relaxed);
                if last != Some(mv) {
                    last = Some(mv);
                    with_listener(&listener, |l| {
                        l.on_value_changed(PropertyValue::VoltageNow(mv));
                    });
                }
            }
        });
        Ok(())
    }
}

/// Simulated charge controller.
pub struct SimChargeController {
    status: Arc<Mutex<ChargerStatus>>,
    listener: SharedListener<dyn ChargeListener>,
    poll_rate_ms: Option<u32>,
}

impl SimChargeController {
    fn new(status: Arc<Mutex<ChargerStatus>>) -> Self {
        Self {
            status,
            listener: Arc::new(Mutex::new(None)),
            poll_rate_ms: None,
        }
    }

    fn current_status(&self) -> ChargerStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChargeController for SimChargeController {
    fn set_poll_rate_ms(&mut self, interval_ms: u32) -> Result<()> {
        if interval_ms == 0 {
            return Err(BattstatError::poll_rate("poll rate must be nonzero"));
        }
        if self.poll_rate_ms.replace(interval_ms).is_some() {
            return Err(BattstatError::poll_rate("poll rate already configured"));
        }

        let status = Arc::clone(&self.status);
        let listener = Arc::clone(&self.listener);
        let period = Duration::from_millis(u64::from(interval_ms));
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<ChargerStatus> = None;
            loop {
                ticker.tick().await;
                let current = *status.lock().unwrap_or_else(PoisonError::into_inner);
                if last != Some(current) {
                    last = Some(current);
                    with_listener(&listener, |l| {
                        l.on_value_changed(ChargeControlKind::Status, current);
                    });
                }
            }
        });
        Ok(())
    }

    fn subscribe(&mut self, listener: Box<dyn ChargeListener>) -> Result<()> {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(listener);
        Ok(())
    }

    fn read_now(&mut self) -> Result<()> {
        let current = self.current_status();
        with_listener(&self.listener, |l| {
            l.on_value_changed(ChargeControlKind::Status, current);
        });
        Ok(())
    }
}

#[derive(Default)]
struct SimPinState {
    level: AtomicBool,
    toggles: AtomicU32,
}

/// Observer handle for a simulated pin.
#[derive(Clone, Default)]
pub struct SimPinHandle {
    state: Arc<SimPinState>,
}

impl SimPinHandle {
    pub fn is_high(&self) -> bool {
        self.state.level.load(Ordering::Relaxed)
    }

    pub fn toggle_count(&self) -> u32 {
        self.state.toggles.load(Ordering::Relaxed)
    }
}

struct SimPin {
    state: Arc<SimPinState>,
    fail: bool,
}

impl OutputPin for SimPin {
    fn set(&mut self, high: bool) -> Result<()> {
        if self.fail {
            return Err(BattstatError::hardware("simulated pin fault"));
        }
        self.state.level.store(high, Ordering::Relaxed);
        Ok(())
    }

    fn toggle(&mut self) -> Result<()> {
        if self.fail {
            return Err(BattstatError::hardware("simulated pin fault"));
        }
        self.state.level.fetch_xor(true, Ordering::Relaxed);
        self.state.toggles.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Control handle for the simulated battery.
#[derive(Clone)]
pub struct SimBatteryHandle {
    voltage_mv: Arc<AtomicI32>,
}

impl SimBatteryHandle {
    pub fn set_voltage_mv(&self, mv: i32) {
        self.voltage_mv.store(mv, Ordering::Relaxed);
    }

    pub fn voltage_mv(&self) -> i32 {
        self.voltage_mv.load(Ordering::Relaxed)
    }
}

/// Control handle for the simulated charger.
#[derive(Clone)]
pub struct SimChargerHandle {
    status: Arc<Mutex<ChargerStatus>>,
}

impl SimChargerHandle {
    pub fn set_status(&self, status: ChargerStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    pub fn status(&self) -> ChargerStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sink that records each rendered line.
#[derive(Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for CaptureSink {
    fn write_line(&mut self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Simulated platform: one battery, one charge controller, two pins, a
/// monotonic clock and a console (or injected) sink.
pub struct SimPlatform {
    address: [u8; 6],
    voltage_mv: Arc<AtomicI32>,
    charger_status: Arc<Mutex<ChargerStatus>>,
    battery: Option<SimBattery>,
    charger: Option<SimChargeController>,
    heartbeat: SimPinHandle,
    backlight: SimPinHandle,
    heartbeat_fault: bool,
    sink: Option<Box<dyn ReportSink>>,
}

impl SimPlatform {
    pub fn new() -> Self {
        let voltage_mv = Arc::new(AtomicI32::new(DEFAULT_VOLTAGE_MV));
        let charger_status = Arc::new(Mutex::new(ChargerStatus::Other));
        Self {
            address: DEFAULT_ADDRESS,
            battery: Some(SimBattery::new(Arc::clone(&voltage_mv))),
            charger: Some(SimChargeController::new(Arc::clone(&charger_status))),
            voltage_mv,
            charger_status,
            heartbeat: SimPinHandle::default(),
            backlight: SimPinHandle::default(),
            heartbeat_fault: false,
            sink: None,
        }
    }

    pub fn with_address(mut self, address: [u8; 6]) -> Self {
        self.address = address;
        self
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Make every heartbeat pin operation fail, for fault-path tests.
    pub fn with_heartbeat_fault(mut self) -> Self {
        self.heartbeat_fault = true;
        self
    }

    pub fn battery(&self) -> SimBatteryHandle {
        SimBatteryHandle {
            voltage_mv: Arc::clone(&self.voltage_mv),
        }
    }

    pub fn charger(&self) -> SimChargerHandle {
        SimChargerHandle {
            status: Arc::clone(&self.charger_status),
        }
    }

    pub fn heartbeat_pin(&self) -> SimPinHandle {
        self.heartbeat.clone()
    }

    pub fn backlight_pin(&self) -> SimPinHandle {
        self.backlight.clone()
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    fn open_battery(&mut self, name: &str) -> Result<Box<dyn BatteryDevice>> {
        if name != "battery" {
            return Err(BattstatError::device_not_found(name));
        }
        match self.battery.take() {
            Some(battery) => Ok(Box::new(battery)),
            None => Err(BattstatError::device_not_found("battery already open")),
        }
    }

    fn find_charge_controller(&mut self) -> Result<Box<dyn ChargeController>> {
        match self.charger.take() {
            Some(charger) => Ok(Box::new(charger)),
            None => Err(BattstatError::device_not_found(
                "charge controller already open",
            )),
        }
    }

    fn hardware_address(&mut self) -> Result<[u8; 6]> {
        Ok(self.address)
    }

    fn claim_output_pin(
        &mut self,
        pin: PinFunction,
        initial_high: bool,
    ) -> Result<Box<dyn OutputPin>> {
        let (handle, fail) = match pin {
            PinFunction::HeartbeatLed => (&self.heartbeat, self.heartbeat_fault),
            PinFunction::BacklightHigh => (&self.backlight, false),
        };
        handle.state.level.store(initial_high, Ordering::Relaxed);
        Ok(Box::new(SimPin {
            state: Arc::clone(&handle.state),
            fail,
        }))
    }

    fn uptime_clock(&mut self) -> Box<dyn UptimeClock> {
        Box::new(MonotonicClock::new())
    }

    fn report_sink(&mut self) -> Box<dyn ReportSink> {
        match self.sink.take() {
            Some(sink) => sink,
            None => Box::new(ConsoleSink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingListener {
        values: Arc<Mutex<Vec<i32>>>,
    }

    impl PropertyListener for RecordingListener {
        fn on_value_changed(&mut self, value: PropertyValue) {
            if let PropertyValue::VoltageNow(mv) = value {
                self.values.lock().unwrap().push(mv);
            }
        }
    }

    struct RecordingChargeListener {
        reports: Arc<Mutex<Vec<(ChargeControlKind, ChargerStatus)>>>,
    }

    impl ChargeListener for RecordingChargeListener {
        fn on_value_changed(&mut self, kind: ChargeControlKind, status: ChargerStatus) {
            self.reports.lock().unwrap().push((kind, status));
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn battery_notifies_only_on_change() {
        let mut platform = SimPlatform::new();
        let handle = platform.battery();
        handle.set_voltage_mv(3700);

        let mut battery = platform.open_battery("battery").unwrap();
        let prop = battery.find_property(PropertyKind::VoltageNow).unwrap();
        let values = Arc::new(Mutex::new(Vec::new()));
        battery
            .subscribe(
                &prop,
                Box::new(RecordingListener {
                    values: Arc::clone(&values),
                }),
            )
            .unwrap();
        battery.set_poll_rate_ms(1000).unwrap();

        settle().await;
        assert!(values.lock().unwrap().is_empty());

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(*values.lock().unwrap(), vec![3700]);

        // Unchanged value, no notification on the next poll.
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(*values.lock().unwrap(), vec![3700]);

        handle.set_voltage_mv(3650);
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(*values.lock().unwrap(), vec![3700, 3650]);
    }

    #[tokio::test(start_paused = true)]
    async fn charger_read_now_delivers_synchronously() {
        let mut platform = SimPlatform::new();
        platform.charger().set_status(ChargerStatus::Charging);

        let mut charger = platform.find_charge_controller().unwrap();
        charger.set_poll_rate_ms(1000).unwrap();
        let reports = Arc::new(Mutex::new(Vec::new()));
        charger
            .subscribe(Box::new(RecordingChargeListener {
                reports: Arc::clone(&reports),
            }))
            .unwrap();

        charger.read_now().unwrap();
        assert_eq!(
            *reports.lock().unwrap(),
            vec![(ChargeControlKind::Status, ChargerStatus::Charging)]
        );
    }

    #[test]
    fn registry_rejects_unknown_names_and_properties() {
        let mut platform = SimPlatform::new();
        assert!(matches!(
            platform.open_battery("thermometer"),
            Err(BattstatError::DeviceNotFound(_))
        ));

        let mut battery = platform.open_battery("battery").unwrap();
        assert!(matches!(
            battery.find_property(PropertyKind::StateOfCharge),
            Err(BattstatError::PropertyNotFound(_))
        ));
    }
}
