//! Plot step of the corona tracker pipeline: load the dataset collected by
//! the fetch step and write the tables and charts next to each other.
//!
//! ## Usage
//!
//! ```sh
//! plot
//! plot --input data/corona.json --output-dir out --trend
//! ```
//!
//! Produces `corona.csv`, `corona.xls`, `plot.html` and `plot.svg` in the
//! output directory. With `--trend`, the headline curves get a dashed
//! log-linear projection fitted on the week before the newest four days.

use std::error::Error;
use std::path::Path;

use clap::Parser;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use corona_tracker::cli::PlotArgs;
use corona_tracker::dataset::Dataset;
use corona_tracker::outputs::{chart, tables};
use corona_tracker::series;

#[instrument]
fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = PlotArgs::parse();
    debug!(?args.input, ?args.output_dir, trend = args.trend, "Parsed CLI arguments");

    let dataset = Dataset::load(&args.input)?;
    let output_dir = Path::new(&args.output_dir);

    tables::write_csv_file(&dataset, output_dir.join("corona.csv"))?;
    tables::write_excel_file(&dataset, output_dir.join("corona.xls"))?;

    let collection = series::build_series(&dataset, args.trend)?;
    chart::write_html(&collection, output_dir.join("plot.html"))?;
    chart::write_svg(&collection, output_dir.join("plot.svg"))?;

    info!(rows = dataset.len(), series = collection.series.len(), "Plot outputs written");
    Ok(())
}
