use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use diffbot_motion_runtime::config::{SYSTICK_FREQUENCY_HZ, TELEMETRY_DIVIDER};
use diffbot_motion_runtime::runtime::{self, RuntimeError, RuntimeOptions};
use diffbot_motion_runtime::tuning::StaticTuning;

/// Closed-loop motion control runtime (simulated base)
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with control gains and speed profile limits
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Control tick frequency in Hz
    #[arg(long, default_value_t = SYSTICK_FREQUENCY_HZ)]
    frequency: f32,

    /// Publish telemetry once every N ticks
    #[arg(long, default_value_t = TELEMETRY_DIVIDER)]
    telemetry_divider: u32,
}

impl Args {
    fn into_options(self) -> Result<RuntimeOptions, RuntimeError> {
        let tuning = match self.tuning {
            Some(path) => StaticTuning::from_json_file(path)?,
            None => StaticTuning::default(),
        };
        let options = RuntimeOptions {
            frequency_hz: self.frequency,
            telemetry_divider: self.telemetry_divider,
            tuning,
        };
        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let result = match Args::parse().into_options() {
        Ok(options) => runtime::run(options).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
