//! # Corona Tracker
//!
//! Fetch step of the corona tracker pipeline: scrape the daily COVID-19
//! bulletins from the Rospotrebnadzor news listing, validate the numbers
//! out of their prose, and print the dataset as a JSON array on stdout.
//!
//! ## Usage
//!
//! ```sh
//! corona_tracker 10 > corona.json
//! RUST_LOG=debug corona_tracker 10 > corona.json
//! ```
//!
//! Logs go to stderr so the JSON on stdout stays clean. Listing pages are
//! scanned newest first; pages that are not bulletins, or bulletins whose
//! numbers do not add up, are skipped with a warning.

use std::error::Error;

use clap::Parser;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use corona_tracker::cli::FetchArgs;
use corona_tracker::collector;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Everything goes to stderr: stdout carries the dataset
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("corona_tracker starting up");

    let args = FetchArgs::parse();
    debug!(?args.pages, "Parsed CLI arguments");

    let records = collector::collect_daily_records(args.pages).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);

    let elapsed = start_time.elapsed();
    info!(?elapsed, records = records.len(), "Execution complete");
    Ok(())
}
