use anyhow::{Context, Result};
use clap::{Arg, Command};

use battstat::platform::sim::SimPlatform;
use battstat::platform::ChargerStatus;
use battstat::{Reporter, ReporterConfig};

fn main() -> Result<()> {
    battstat::init_logging();

    let matches = Command::new("battstat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Periodic device-status reporter running against a simulated platform")
        .arg(
            Arg::new("address")
                .long("address")
                .value_name("MAC")
                .help("Simulated hardware address, six colon-separated hex bytes"),
        )
        .arg(
            Arg::new("voltage-mv")
                .long("voltage-mv")
                .value_name("MV")
                .value_parser(clap::value_parser!(i32))
                .help("Initial simulated battery voltage in millivolts"),
        )
        .arg(
            Arg::new("charger")
                .long("charger")
                .value_name("STATE")
                .value_parser(["no_source", "charging", "completed"])
                .help("Initial simulated charger state"),
        )
        .get_matches();

    let mut platform = SimPlatform::new();

    if let Some(text) = matches.get_one::<String>("address") {
        platform = platform.with_address(parse_address(text)?);
    }
    if let Some(mv) = matches.get_one::<i32>("voltage-mv") {
        platform.battery().set_voltage_mv(*mv);
    }
    if let Some(state) = matches.get_one::<String>("charger") {
        platform.charger().set_status(match state.as_str() {
            "no_source" => ChargerStatus::NoSource,
            "charging" => ChargerStatus::Charging,
            "completed" => ChargerStatus::ChargeComplete,
            _ => ChargerStatus::Other,
        });
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build the reporter runtime")?;

    runtime.block_on(async move {
        let reporter = Reporter::new(ReporterConfig::default(), &mut platform)
            .context("Failed to initialize the reporter")?;
        reporter.run().await.context("Reporter terminated")
    })
}

fn parse_address(text: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = text.split(':').collect();
    anyhow::ensure!(
        parts.len() == 6,
        "expected six colon-separated bytes, got {text:?}"
    );
    let mut address = [0u8; 6];
    for (slot, part) in address.iter_mut().zip(parts) {
        *slot = u8::from_str_radix(part, 16)
            .with_context(|| format!("invalid address byte {part:?}"))?;
    }
    Ok(address)
}
