//! The reporter: subscriptions in, one status line out per timer firing.
//!
//! Everything runs on a single cooperative event-processing loop. Subsystem
//! listeners and the report timer only enqueue events; all state mutation
//! and emission happen inside `run`'s dispatch, one event at a time, so the
//! status state needs no locking.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::ReporterConfig;
use crate::core::identity::HardwareIdentity;
use crate::core::report::{BacklightReport, ReportSnapshot};
use crate::core::status::StatusState;
use crate::error::{BattstatError, Result};
use crate::platform::{
    BatteryDevice, ChargeControlKind, ChargeController, ChargeListener, ChargerStatus, OutputPin,
    PinFunction, Platform, PropertyKind, PropertyListener, PropertyValue, ReportSink, UptimeClock,
};

/// Events dispatched by the reporter loop.
#[derive(Debug)]
enum Event {
    /// The report timer fired.
    ReportDue,
    /// The battery subscription delivered a property change.
    BatteryProperty(PropertyValue),
    /// The charger subscription delivered a report.
    ChargerUpdate {
        kind: ChargeControlKind,
        status: ChargerStatus,
    },
}

/// Forwards battery change notifications onto the event queue.
struct BatteryForwarder {
    events: mpsc::UnboundedSender<Event>,
}

impl PropertyListener for BatteryForwarder {
    fn on_value_changed(&mut self, value: PropertyValue) {
        let _ = self.events.send(Event::BatteryProperty(value));
    }
}

/// Forwards charger reports onto the event queue.
struct ChargerForwarder {
    events: mpsc::UnboundedSender<Event>,
}

impl ChargeListener for ChargerForwarder {
    fn on_value_changed(&mut self, kind: ChargeControlKind, status: ChargerStatus) {
        let _ = self.events.send(Event::ChargerUpdate { kind, status });
    }
}

/// One-shot report timer. Posts `ReportDue` after the given delay and must
/// be re-armed for each subsequent firing.
struct ReportTimer {
    events: mpsc::UnboundedSender<Event>,
}

impl ReportTimer {
    fn arm(&self, delay: Duration) -> Result<()> {
        if self.events.is_closed() {
            return Err(BattstatError::scheduler("event queue is gone"));
        }
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::ReportDue);
        });
        Ok(())
    }
}

/// The status reporter. Owns the shared status state, the event queue fed
/// by both subscriptions and the timer, and the report cycle.
pub struct Reporter {
    config: ReporterConfig,
    identity: HardwareIdentity,
    status: StatusState,
    events: mpsc::UnboundedReceiver<Event>,
    timer: ReportTimer,
    heartbeat: Box<dyn OutputPin>,
    clock: Box<dyn UptimeClock>,
    sink: Box<dyn ReportSink>,
    // Held for the life of the process: the backlight pin keeps its level,
    // the device handles keep the subscriptions live.
    _backlight: Box<dyn OutputPin>,
    _battery: Box<dyn BatteryDevice>,
    _charger: Box<dyn ChargeController>,
}

impl Reporter {
    /// Wire the reporter against the platform: claim the output pins,
    /// resolve the hardware identity, arm the first report and register
    /// both subscriptions. Any failure here is a fatal startup error.
    pub fn new(config: ReporterConfig, platform: &mut dyn Platform) -> Result<Self> {
        let backlight = platform.claim_output_pin(PinFunction::BacklightHigh, true)?;
        let heartbeat = platform.claim_output_pin(PinFunction::HeartbeatLed, false)?;

        let identity = HardwareIdentity::resolve(platform)?;
        log::info!("hardware identity resolved: {}", identity.display());

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let timer = ReportTimer {
            events: events_tx.clone(),
        };
        timer.arm(config.startup_delay)?;

        let mut charger = platform.find_charge_controller()?;
        charger.set_poll_rate_ms(config.poll_rate_ms)?;
        charger.subscribe(Box::new(ChargerForwarder {
            events: events_tx.clone(),
        }))?;
        if let Err(err) = charger.read_now() {
            log::warn!("initial charger read failed: {err}");
        }
        log::info!("charger subscription registered");

        let mut battery = platform.open_battery(&config.battery_device)?;
        let prop_voltage = battery.find_property(PropertyKind::VoltageNow)?;
        battery.subscribe(
            &prop_voltage,
            Box::new(BatteryForwarder { events: events_tx }),
        )?;
        battery.set_poll_rate_ms(config.poll_rate_ms)?;
        log::info!("battery subscription registered");

        Ok(Self {
            identity,
            status: StatusState::default(),
            events: events_rx,
            timer,
            heartbeat,
            clock: platform.uptime_clock(),
            sink: platform.report_sink(),
            config,
            _backlight: backlight,
            _battery: battery,
            _charger: charger,
        })
    }

    /// Run the cooperative event loop. Never returns under normal
    /// operation; an `Err` is a fatal scheduling or hardware fault.
    pub async fn run(mut self) -> Result<()> {
        log::info!("reporter running");
        loop {
            let event = match self.events.recv().await {
                Some(event) => event,
                // The reporter itself holds a sender through the timer, so
                // an empty-and-closed queue means the invariant broke.
                None => return Err(BattstatError::scheduler("event queue drained")),
            };
            self.dispatch(event)?;
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::ReportDue => self.on_report_due(),
            Event::BatteryProperty(value) => {
                self.on_battery_changed(value);
                Ok(())
            }
            Event::ChargerUpdate { kind, status } => {
                self.on_charger_changed(kind, status);
                Ok(())
            }
        }
    }

    /// Battery change handler. Only `VoltageNow` is subscribed; any other
    /// tag means the subscription wiring is broken.
    fn on_battery_changed(&mut self, value: PropertyValue) {
        match value {
            PropertyValue::VoltageNow(mv) => self.status.battery_voltage_mv = mv,
            other => panic!("battery subscription delivered {other:?}"),
        }
    }

    /// Charger report handler; only status reports are subscribed.
    fn on_charger_changed(&mut self, kind: ChargeControlKind, status: ChargerStatus) {
        match kind {
            ChargeControlKind::Status => self.status.charger = status,
            other => panic!("charger subscription delivered {other:?}"),
        }
    }

    /// One firing of the report cycle: heartbeat, emit, re-arm.
    fn on_report_due(&mut self) -> Result<()> {
        self.heartbeat.toggle()?;
        self.emit_report();
        self.timer.arm(self.config.report_period)
    }

    /// Render and write one report line. Must not abort the report cycle:
    /// a render failure is logged and the line dropped.
    fn emit_report(&mut self) {
        let snapshot = ReportSnapshot::compose(
            &self.identity,
            self.clock.uptime_usec(),
            &self.status,
            BacklightReport {
                level: self.config.backlight_level,
                percent: self.config.backlight_percent,
            },
        );
        match snapshot.render() {
            Ok(line) => self.sink.write_line(&line),
            Err(err) => log::error!("failed to render status report: {err}"),
        }
    }
}
