//! Date-indexed view over a collection of daily records.
//!
//! The fetch step produces a JSON array of [`DailyRecord`]s; the plot step
//! needs columns. A [`Dataset`] pivots the records into per-name columns
//! aligned on a shared, newest-first date axis. Fixed counters (`new`,
//! `total`, ...) become columns under their own names, and every region name
//! seen in any record becomes a column too. Days where a region does not
//! appear hold `None`: on those days the bulletin simply did not mention it.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::models::DailyRecord;

/// Columns every record carries; every other column is a region.
pub const FIXED_COLUMNS: [&str; 5] = ["new", "new_reg", "total", "total_healthy", "total_reg"];

/// Records pivoted into columns on a newest-first date axis.
#[derive(Debug, Clone)]
pub struct Dataset {
    dates: Vec<NaiveDate>,
    links: Vec<String>,
    columns: BTreeMap<String, Vec<Option<u64>>>,
}

impl Dataset {
    /// Pivot records into a dataset, sorting them newest first.
    pub fn from_records(mut records: Vec<DailyRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        let n = records.len();
        let mut columns: BTreeMap<String, Vec<Option<u64>>> = BTreeMap::new();
        let mut set = |name: &str, row: usize, value: u64| {
            columns.entry(name.to_string()).or_insert_with(|| vec![None; n])[row] = Some(value);
        };

        for (row, record) in records.iter().enumerate() {
            set("new", row, record.new);
            set("new_reg", row, record.new_reg);
            set("total", row, record.total);
            set("total_healthy", row, record.total_healthy);
            set("total_reg", row, record.total_reg);
            for (region, &cases) in &record.regions {
                set(region, row, cases);
            }
        }

        Dataset {
            dates: records.iter().map(|r| r.date).collect(),
            links: records.iter().map(|r| r.link.clone()).collect(),
            columns,
        }
    }

    /// Build a dataset from the JSON array the fetch step prints.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<DailyRecord> = serde_json::from_str(raw)?;
        Ok(Self::from_records(records))
    }

    /// Load a dataset from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let dataset = Self::from_json(&raw)?;
        info!(path = %path.display(), rows = dataset.len(), "Loaded dataset");
        Ok(dataset)
    }

    /// The date axis, newest first.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Source bulletin URL for each row, aligned with [`dates`](Self::dates).
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Number of rows (days).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// One column by name, aligned with the date axis.
    pub fn column(&self, name: &str) -> Option<&[Option<u64>]> {
        self.columns.get(name).map(|column| column.as_slice())
    }

    /// Region columns only, in lexicographic order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .keys()
            .map(String::as_str)
            .filter(|name| !FIXED_COLUMNS.contains(name))
    }

    /// All column names in table order: fixed counters, then regions.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = FIXED_COLUMNS.iter().map(|s| s.to_string()).collect();
        names.extend(self.region_names().map(str::to_string));
        names
    }
}
