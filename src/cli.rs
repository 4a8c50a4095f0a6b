//! Command-line interface definitions for the corona tracker binaries.
//!
//! This module defines the CLI arguments for both entry points using the
//! `clap` crate: [`FetchArgs`] for the default `corona_tracker` binary and
//! [`PlotArgs`] for the `plot` binary.

use clap::Parser;

/// Command-line arguments for the fetch step.
///
/// The fetch step scans news listing pages, collects every daily bulletin
/// they link to, and prints the validated records as a JSON array on stdout.
/// Logs go to stderr, so the output can be redirected straight into a file.
///
/// # Examples
///
/// ```sh
/// # Collect bulletins from the first 10 listing pages
/// corona_tracker 10 > corona.json
///
/// # A deep run over the whole archive
/// corona_tracker 120 > corona.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about = "Collect daily COVID-19 bulletins into a JSON dataset on stdout")]
pub struct FetchArgs {
    /// Number of news listing pages to scan, starting from the freshest
    pub pages: u32,
}

/// Command-line arguments for the plot step.
///
/// The plot step loads the dataset written by the fetch step and produces
/// the tables (`corona.csv`, `corona.xls`) and charts (`plot.html`,
/// `plot.svg`) next to each other in the output directory.
///
/// # Examples
///
/// ```sh
/// # Default filenames in the current directory
/// plot
///
/// # Explicit dataset and output directory, with trend projections
/// plot --input data/corona.json --output-dir out --trend
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about = "Render tables and charts from a collected dataset")]
pub struct PlotArgs {
    /// Path of the dataset produced by the fetch step
    #[arg(short, long, default_value = "corona.json")]
    pub input: String,

    /// Directory the tables and charts are written into
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Add dashed log-linear trend projections for the headline series
    #[arg(long)]
    pub trend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_args_positional_pages() {
        let args = FetchArgs::parse_from(&["corona_tracker", "10"]);
        assert_eq!(args.pages, 10);
    }

    #[test]
    fn test_fetch_args_reject_non_numeric() {
        assert!(FetchArgs::try_parse_from(&["corona_tracker", "many"]).is_err());
    }

    #[test]
    fn test_plot_args_defaults() {
        let args = PlotArgs::parse_from(&["plot"]);
        assert_eq!(args.input, "corona.json");
        assert_eq!(args.output_dir, ".");
        assert!(!args.trend);
    }

    #[test]
    fn test_plot_args_explicit() {
        let args = PlotArgs::parse_from(&[
            "plot",
            "--input",
            "data/corona.json",
            "-o",
            "out",
            "--trend",
        ]);
        assert_eq!(args.input, "data/corona.json");
        assert_eq!(args.output_dir, "out");
        assert!(args.trend);
    }
}
