//! Task Distance - minimum, maximum and achieved distance of a built-in task.
//!
//! Usage:
//!   cargo run -p xctask-cli --bin task_distance -- --scenario triangle
//!   cargo run -p xctask-cli --bin task_distance -- --scenario equator --active 1 --lat 0 --lon 0.5 --json
//!
//! XCTASK_PRECISION_M and XCTASK_ARC_POINTS set defaults for the optimizer.

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xctask_cli::{build_report, scenario_by_name, Config, Fix, SCENARIO_NAMES};
use xctask_core::GeoPoint;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in task: equator, triangle or racing
    #[arg(short, long, default_value = "triangle")]
    scenario: String,

    /// Active turnpoint index for the achieved distance
    #[arg(long, default_value_t = 0)]
    active: usize,

    /// Aircraft latitude in degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Aircraft longitude in degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Meters per optimizer unit (overrides XCTASK_PRECISION_M)
    #[arg(long)]
    precision: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("xctask_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(precision) = args.precision {
        config.precision_m = precision;
    }

    let Some(scenario) = scenario_by_name(&args.scenario) else {
        bail!(
            "unknown scenario '{}', expected one of: {}",
            args.scenario,
            SCENARIO_NAMES.join(", ")
        );
    };

    let fix = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(Fix {
            active: args.active,
            location: GeoPoint::new(lat, lon),
        }),
        _ => None,
    };

    let report = build_report(scenario, &config, fix)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        print!("{report}");
    }
    Ok(())
}
