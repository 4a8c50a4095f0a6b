//! # Corona Tracker
//!
//! Library behind the `corona_tracker` and `plot` binaries: scrapes the
//! daily COVID-19 bulletins published by Rospotrebnadzor, validates the
//! numbers out of their Russian prose, and turns the resulting dataset
//! into tables and charts.
//!
//! ## Pipeline
//!
//! 1. **Indexing**: [`scrapers`] walks the paginated news listing and picks
//!    out bulletin links by their title prefix
//! 2. **Fetching**: each bulletin page is downloaded sequentially
//! 3. **Parsing**: [`parser`] extracts date, per-region counts, and the
//!    nationwide counters, then cross-checks them against each other
//! 4. **Collection**: [`collector`] batches the above per listing page and
//!    sorts the surviving records newest first
//! 5. **Derivation**: [`dataset`] and [`series`] pivot the records into
//!    date-indexed columns and cumulative curves
//! 6. **Output**: [`outputs`] renders CSV and Excel tables plus SVG and
//!    HTML charts

pub mod cli;
pub mod collector;
pub mod dataset;
pub mod models;
pub mod outputs;
pub mod parser;
pub mod scrapers;
pub mod series;
pub mod utils;
