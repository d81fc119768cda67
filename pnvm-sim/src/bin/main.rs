use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use iwl_pnvm::{LoadStrategy, LoaderConfig, SkuId};
use pnvm_sim::{Error, Firmware, SimDevice, parse_sku_id};
use strum::IntoEnumIterator;

#[derive(Parser)]
#[command(name = "pnvm-sim")]
#[command(about = "Runs the PNVM load handshake against a simulated device", long_about = None)]
struct Cli {
    /// SKU id of the device, e.g. 01:00:00. All zero skips the PNVM step.
    #[arg(long, value_parser = parse_sku, default_value = "01:00:00")]
    sku: SkuId,

    /// What the first load does: skip or file-based
    #[arg(long, value_parser = parse_strategy, default_value = "skip")]
    strategy: LoadStrategy,

    /// Directory to request firmware files from
    #[arg(long)]
    firmware_dir: Option<PathBuf>,

    /// Firmware name prefix including the trailing hyphen
    #[arg(long, default_value = "iwlwifi-ty-a0-gf-a0-")]
    fw_name_pre: String,

    /// How long to wait for the firmware, in milliseconds
    #[arg(long, default_value_t = 250)]
    timeout_ms: u64,

    /// Delay before the firmware answers the doorbell, in milliseconds
    #[arg(long, default_value_t = 10)]
    reply_delay_ms: u64,

    /// Status reported in the completion notification
    #[arg(long, default_value_t = 0)]
    status: u32,

    /// The firmware never answers
    #[arg(long)]
    no_reply: bool,

    /// Re-applying the kept PNVM fails
    #[arg(long)]
    fail_reapply: bool,

    /// Number of loads to run on the same device
    #[arg(long, default_value_t = 1)]
    calls: usize,
}

fn parse_sku(s: &str) -> Result<SkuId, String> {
    parse_sku_id(s).map_err(|e| e.to_string())
}

fn parse_strategy(s: &str) -> Result<LoadStrategy, String> {
    LoadStrategy::from_str(s).map_err(|_| {
        let names: Vec<&'static str> = LoadStrategy::iter().map(Into::into).collect();
        format!("{} (expected one of: {})", Error::InvalidStrategy(s.to_string()), names.join(", "))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let firmware = if cli.no_reply {
        Firmware::Silent
    } else {
        Firmware::Reply {
            delay: Duration::from_millis(cli.reply_delay_ms),
            status: cli.status,
        }
    };

    let mut device = SimDevice::new(cli.sku, &cli.fw_name_pre, firmware);
    if let Some(dir) = cli.firmware_dir {
        if !dir.is_dir() {
            return Err(Error::IoError(std::io::ErrorKind::NotFound.into()).into());
        }
        device = device.with_firmware_dir(dir);
    }
    if cli.fail_reapply {
        device = device.with_failing_reapply();
    }

    let config = LoaderConfig::new()
        .with_strategy(cli.strategy)
        .with_timeout(Duration::from_millis(cli.timeout_ms));

    println!("Device {:?}, strategy {}", cli.sku, cli.strategy);

    let outcomes = pnvm_sim::run(&mut device, config, cli.calls);
    let mut failed = false;
    for (call, outcome) in outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(()) => println!(
                "load #{call}: ok after {:?}, state {:?}",
                outcome.elapsed, outcome.state
            ),
            Err(e) => {
                failed = true;
                println!(
                    "load #{call}: {e} after {:?}, state {:?}",
                    outcome.elapsed, outcome.state
                );
            }
        }
    }

    if let Some(pnvm) = device.pnvm() {
        println!("Transport holds a {} byte PNVM", pnvm.len());
    }
    println!("Doorbells rung: {}", device.doorbells());

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
