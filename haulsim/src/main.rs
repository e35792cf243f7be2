//! Haul truck simulation application.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;

use haulsim::{metrics, minutes, whole_minutes, Controller, EventLog, StationMetrics, TruckMetrics};

/// Simulates a fleet of haul trucks cycling between a mining site and a
/// shared bank of unload stations.
#[derive(Parser)]
#[clap(version)]
struct Opt {
    /// Number of haul trucks in the fleet.
    num_trucks: usize,

    /// Number of unload stations shared by the fleet.
    num_stations: usize,

    /// Length of the simulated horizon, in minutes.
    #[clap(long, default_value = "4320")]
    sim_minutes: u64,

    /// Seed for the mining duration stream. Runs with the same seed and
    /// configuration produce identical event logs.
    #[clap(long)]
    seed: Option<u64>,

    /// Write the event log to this file in JSON Lines format.
    #[clap(long)]
    events_output: Option<PathBuf>,

    /// Write the full metrics report to this file as JSON.
    #[clap(long)]
    metrics_output: Option<PathBuf>,

    /// Verbosity.
    #[clap(short, long, parse(from_occurrences))]
    verbose: i32,

    /// Store the logs in this file.
    #[clap(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[clap(long)]
    no_stderr: bool,
}

/// Set up a logger based on the given user options.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let log_level = match opt.verbose {
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        3 => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log_level);
    let dispatch = if let Some(path) = &opt.log_output {
        let _ = std::fs::remove_file(path);
        dispatch.chain(
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .append(false)
                .open(path)?,
        )
    } else {
        dispatch
    };
    let dispatch = if opt.no_stderr {
        dispatch
    } else {
        dispatch.chain(std::io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let count = count as f64;
        sum / count
    }
}

fn print_summary(sim_time: Duration, trucks: &[TruckMetrics], stations: &[StationMetrics]) {
    println!("=== Simulation Summary ===");
    println!("Simulation Time: {} minutes", whole_minutes(sim_time));
    println!("Trucks: {}", trucks.len());
    println!("Stations: {}", stations.len());
    println!(
        "Average Truck Utilization: {:.2}%",
        mean(trucks.iter().map(|t| t.utilization))
    );
    println!(
        "Average Station Utilization: {:.2}%",
        mean(stations.iter().map(|s| s.utilization))
    );
    let unloaded: usize = stations.iter().map(|s| s.throughput).sum();
    println!("Trucks Unloaded: {}", unloaded);
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();
    set_up_logger(&opt)?;

    let sim_time = minutes(opt.sim_minutes);
    let mut controller = match opt.seed {
        Some(seed) => Controller::with_seed(opt.num_trucks, opt.num_stations, seed),
        None => Controller::new(opt.num_trucks, opt.num_stations),
    };

    let mut log = EventLog::new();
    controller
        .run(sim_time, &mut log)
        .wrap_err("simulation aborted on a broken scheduling invariant")?;

    if let Some(path) = &opt.events_output {
        let file = File::create(path)
            .wrap_err_with(|| format!("unable to create event log file: {}", path.display()))?;
        haulsim::write_events(BufWriter::new(file), log.events())
            .wrap_err("unable to write event log")?;
        log::info!("event log written to {}", path.display());
    }

    let (trucks, stations) = metrics::compute(sim_time, &log, opt.num_trucks, opt.num_stations);
    if let Some(path) = &opt.metrics_output {
        let file = File::create(path)
            .wrap_err_with(|| format!("unable to create metrics file: {}", path.display()))?;
        let report = metrics::Report::new(sim_time, &trucks, &stations);
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .wrap_err("unable to write metrics report")?;
        log::info!("metrics report written to {}", path.display());
    }

    print_summary(sim_time, &trucks, &stations);
    Ok(())
}
