//! Output generation modules for tables and charts.
//!
//! This module contains submodules responsible for writing the collected
//! dataset to the formats consumers actually open:
//!
//! # Submodules
//!
//! - [`tables`]: Flat exports of the dataset (`corona.csv`, `corona.xls`)
//! - [`chart`]: The cumulative-cases chart (`plot.svg`, `plot.html`)
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── corona.csv   # one row per day, one column per counter and region
//! ├── corona.xls   # the same table as an Excel-readable worksheet
//! ├── plot.svg     # standalone chart image
//! └── plot.html    # the chart wrapped in a minimal page
//! ```
//!
//! Writers are generic over `io::Write` where practical so tests can render
//! into memory; the `*_file` wrappers add paths and logging.

pub mod chart;
pub mod tables;
