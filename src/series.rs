//! Derivation of named plot series from a dataset.
//!
//! The dataset stores daily new cases; the chart shows cumulative curves.
//! This module turns columns into [`Series`] values carrying everything the
//! renderer needs (points plus styling hints), in a fixed order:
//!
//! 1. nationwide cumulative total
//! 2. the two metro aggregates (city plus surrounding oblast)
//! 3. the top regions by case count, minus the metro constituents
//! 4. the rest of the country as a residual
//! 5. cumulative recoveries
//! 6. optional log-linear trend projections for the headline series
//!
//! Missing days in a region column count as zero new cases when summing:
//! a bulletin that does not mention a region reported nothing for it.

use std::error::Error;

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::dataset::Dataset;

/// Constituents of the Moscow metropolitan aggregate.
const MOSCOW_METRO: [&str; 2] = ["Москва", "Московская область"];

/// Constituents of the Saint Petersburg metropolitan aggregate.
const PETERSBURG_METRO: [&str; 2] = ["Санкт-Петербург", "Ленинградская область"];

/// Regions hidden from the top list because their aggregate is plotted instead.
const METRO_CONSTITUENTS: [&str; 4] = [
    "Москва",
    "Московская область",
    "Санкт-Петербург",
    "Ленинградская область",
];

/// How many top regions to consider for individual curves.
pub const TOP_REGION_COUNT: usize = 10;

/// Rows (days back from the newest) the trend line is fitted on.
const TREND_FIT_ROWS: std::ops::Range<usize> = 4..11;

/// Rows the fitted trend is projected onto.
const TREND_PREDICT_ROWS: std::ops::Range<usize> = 0..11;

/// One named curve plus its styling hints.
///
/// `values` is aligned with the collection's newest-first date axis. `None`
/// cells are simply not drawn.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
    /// Fixed color; series without one get a palette color at render time.
    pub color: Option<&'static str>,
    pub dashed: bool,
    pub markers_only: bool,
    pub annotate: bool,
}

impl Series {
    fn solid(name: impl Into<String>, values: Vec<Option<f64>>, color: Option<&'static str>) -> Self {
        Series {
            name: name.into(),
            values,
            color,
            dashed: false,
            markers_only: false,
            annotate: true,
        }
    }

    /// The newest plotted value, used for the curve's margin label.
    pub fn newest_value(&self) -> Option<f64> {
        self.values.iter().find_map(|v| *v)
    }
}

/// Everything the chart renderer consumes: the date axis and the curves.
#[derive(Debug, Clone)]
pub struct SeriesCollection {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<Series>,
}

/// Derive the standard set of curves from a dataset.
///
/// # Arguments
///
/// * `dataset` - The loaded dataset, newest first
/// * `with_trend` - Also project a dashed trend for each headline series
///
/// # Returns
///
/// The curves in plot order, or an error for a dataset with no rows.
pub fn build_series(dataset: &Dataset, with_trend: bool) -> Result<SeriesCollection, Box<dyn Error>> {
    if dataset.is_empty() {
        return Err("dataset contains no records".into());
    }
    let total = numeric_column(dataset, "total")
        .ok_or("dataset has no `total` column")?;

    let moscow = cumulative(dataset, &MOSCOW_METRO);
    let petersburg = cumulative(dataset, &PETERSBURG_METRO);
    let residual: Vec<Option<f64>> = total
        .iter()
        .zip(&moscow)
        .zip(&petersburg)
        .map(|((t, m), p)| match (t, m, p) {
            (Some(t), Some(m), Some(p)) => Some(t - m - p),
            _ => None,
        })
        .collect();

    let mut series = vec![
        Series::solid("total", total, Some("blue")),
        Series::solid("Москва и МО", moscow, Some("orange")),
        Series::solid("Санкт-Петербург и ЛО", petersburg, Some("green")),
    ];

    for region in top_regions(dataset, TOP_REGION_COUNT) {
        if METRO_CONSTITUENTS.contains(&region.as_str()) {
            continue;
        }
        let values = cumulative(dataset, &[region.as_str()]);
        series.push(Series::solid(region, values, None));
    }

    series.push(Series::solid("Россия без МО и ЛО", residual, Some("magenta")));

    match numeric_column(dataset, "total_healthy") {
        Some(healthy) => series.push(Series {
            name: "total_healthy".to_string(),
            values: healthy,
            color: Some("red"),
            dashed: false,
            markers_only: true,
            annotate: true,
        }),
        None => warn!("dataset has no `total_healthy` column, skipping recoveries"),
    }

    if with_trend {
        let headline: Vec<(String, Vec<Option<f64>>, &'static str)> = series
            .iter()
            .filter(|s| matches!(s.color, Some("blue" | "orange" | "green" | "magenta")))
            .map(|s| (s.name.clone(), s.values.clone(), s.color.unwrap_or("blue")))
            .collect();
        for (name, values, color) in headline {
            if let Some(trend) = trend_series(dataset.dates(), &name, &values, color) {
                series.push(trend);
            }
        }
    }

    debug!(count = series.len(), "Built series collection");
    Ok(SeriesCollection { dates: dataset.dates().to_vec(), series })
}

/// Regions with the highest summed daily counts, ties broken by name.
pub fn top_regions(dataset: &Dataset, count: usize) -> Vec<String> {
    dataset
        .region_names()
        .map(|name| {
            let cases: u64 = dataset
                .column(name)
                .map(|column| column.iter().flatten().sum())
                .unwrap_or(0);
            (name, cases)
        })
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(count)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// One dataset column widened to `f64`, `None` cells preserved.
fn numeric_column(dataset: &Dataset, name: &str) -> Option<Vec<Option<f64>>> {
    dataset
        .column(name)
        .map(|column| column.iter().map(|cell| cell.map(|v| v as f64)).collect())
}

/// Cumulative sum of one or more daily columns, oldest day first in time.
///
/// Rows are newest first, so the running sum is accumulated from the back.
/// Missing cells contribute zero.
fn cumulative(dataset: &Dataset, names: &[&str]) -> Vec<Option<f64>> {
    let n = dataset.len();
    let mut daily = vec![0.0; n];
    for name in names {
        if let Some(column) = dataset.column(name) {
            for (cell, value) in daily.iter_mut().zip(column) {
                *cell += value.unwrap_or(0) as f64;
            }
        }
    }

    let mut out = vec![None; n];
    let mut acc = 0.0;
    for row in (0..n).rev() {
        acc += daily[row];
        out[row] = Some(acc);
    }
    out
}

/// Fit a line to `log2(value)` over the fit window and project it forward.
///
/// The fit deliberately excludes the newest days: comparing the projection
/// against what actually happened shows whether growth is still on its
/// earlier doubling pace. Returns `None` when the window holds fewer than
/// two usable points.
fn trend_series(
    dates: &[NaiveDate],
    name: &str,
    values: &[Option<f64>],
    color: &'static str,
) -> Option<Series> {
    let points: Vec<(f64, f64)> = TREND_FIT_ROWS
        .filter(|&row| row < values.len())
        .filter_map(|row| match values[row] {
            Some(v) if v > 0.0 && v.is_finite() => Some((day_number(dates[row]), v.log2())),
            _ => None,
        })
        .collect();
    if points.len() < 2 {
        warn!(series = name, points = points.len(), "Not enough points to fit a trend");
        return None;
    }

    let (slope, intercept) = least_squares(&points)?;
    let mut projected = vec![None; values.len()];
    for row in TREND_PREDICT_ROWS {
        if row < projected.len() {
            projected[row] = Some((slope * day_number(dates[row]) + intercept).exp2());
        }
    }

    Some(Series {
        name: format!("{name} (тренд 4 дня назад)"),
        values: projected,
        color: Some(color),
        dashed: true,
        markers_only: false,
        annotate: false,
    })
}

/// Days since the common era. Used as the x coordinate both for fitting
/// trends and for laying out the chart's time axis.
pub(crate) fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Least-squares line through mean-centered points: `(slope, intercept)`.
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let variance: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if variance == 0.0 {
        return None;
    }
    let covariance: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = covariance / variance;
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyRecord;
    use std::collections::BTreeMap;

    fn record(day: u32, total: u64, regions: &[(&str, u64)]) -> DailyRecord {
        let regions: BTreeMap<String, u64> =
            regions.iter().map(|(name, cases)| (name.to_string(), *cases)).collect();
        let new = regions.values().sum();
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2020, 4, day).unwrap(),
            link: format!("https://example.com/b{day}"),
            new,
            new_reg: regions.len() as u64,
            total,
            total_healthy: 3,
            total_reg: 85,
            regions,
        }
    }

    fn series_by_name<'a>(collection: &'a SeriesCollection, name: &str) -> &'a Series {
        collection
            .series
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no series named {name}"))
    }

    #[test]
    fn test_cumulative_runs_oldest_to_newest() {
        let dataset = Dataset::from_records(vec![
            record(5, 100, &[("Москва", 5)]),
            record(4, 90, &[("Москва", 3)]),
            record(3, 80, &[("Тыва", 2)]),
        ]);
        // Москва missing on the oldest day counts as zero
        assert_eq!(cumulative(&dataset, &["Москва"]), vec![Some(8.0), Some(3.0), Some(0.0)]);
    }

    #[test]
    fn test_residual_subtracts_metro_aggregates() {
        let dataset = Dataset::from_records(vec![record(
            5,
            100,
            &[
                ("Москва", 60),
                ("Московская область", 10),
                ("Санкт-Петербург", 5),
                ("Ленинградская область", 5),
            ],
        )]);

        let collection = build_series(&dataset, false).unwrap();
        assert_eq!(series_by_name(&collection, "total").values, vec![Some(100.0)]);
        assert_eq!(series_by_name(&collection, "Москва и МО").values, vec![Some(70.0)]);
        assert_eq!(series_by_name(&collection, "Санкт-Петербург и ЛО").values, vec![Some(10.0)]);
        assert_eq!(series_by_name(&collection, "Россия без МО и ЛО").values, vec![Some(20.0)]);
    }

    #[test]
    fn test_metro_constituents_not_plotted_individually() {
        let dataset = Dataset::from_records(vec![record(
            5,
            100,
            &[("Москва", 60), ("Московская область", 10), ("Санкт-Петербург", 8), ("Ленинградская область", 2)],
        )]);

        let collection = build_series(&dataset, false).unwrap();
        let names: Vec<&str> = collection.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["total", "Москва и МО", "Санкт-Петербург и ЛО", "Россия без МО и ЛО", "total_healthy"]
        );
    }

    #[test]
    fn test_top_regions_order_and_ties() {
        let dataset = Dataset::from_records(vec![
            record(5, 100, &[("Москва", 50), ("Тыва", 7), ("Карелия", 7), ("Якутия", 2)]),
            record(4, 50, &[("Москва", 30), ("Якутия", 10)]),
        ]);

        // Москва 80, Якутия 12, then the 7-7 tie alphabetically
        assert_eq!(top_regions(&dataset, 3), vec!["Москва", "Якутия", "Карелия"]);
        assert_eq!(top_regions(&dataset, 10), vec!["Москва", "Якутия", "Карелия", "Тыва"]);
    }

    #[test]
    fn test_trend_projects_doubling() {
        let records: Vec<DailyRecord> = (0..11)
            .map(|row| record(11 - row as u32, 1u64 << (10 - row), &[("Москва", 1)]))
            .collect();
        let dataset = Dataset::from_records(records);

        let collection = build_series(&dataset, true).unwrap();
        let trend = series_by_name(&collection, "total (тренд 4 дня назад)");
        assert!(trend.dashed);
        assert!(!trend.annotate);
        assert_eq!(trend.color, Some("blue"));

        // Perfect doubling in the fit window projects straight to the newest day
        let newest = trend.values[0].expect("projection covers the newest day");
        assert!((newest - 1024.0).abs() < 1e-6, "projected {newest}");
        let mid = trend.values[6].expect("projection covers the fit window");
        assert!((mid - 16.0).abs() < 1e-6, "projected {mid}");
    }

    #[test]
    fn test_no_trend_without_flag() {
        let dataset = Dataset::from_records(vec![
            record(5, 100, &[("Москва", 5)]),
            record(4, 90, &[("Москва", 3)]),
        ]);
        let collection = build_series(&dataset, false).unwrap();
        assert!(collection.series.iter().all(|s| !s.dashed));
    }

    #[test]
    fn test_short_dataset_gets_no_trend() {
        // Two rows leave at most one point inside the fit window
        let dataset = Dataset::from_records(vec![
            record(5, 100, &[("Москва", 5)]),
            record(4, 90, &[("Москва", 3)]),
        ]);
        let collection = build_series(&dataset, true).unwrap();
        assert!(collection.series.iter().all(|s| !s.dashed));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let dataset = Dataset::from_records(Vec::new());
        assert!(build_series(&dataset, false).is_err());
    }

    #[test]
    fn test_newest_value_skips_missing_cells() {
        let series = Series::solid("x", vec![None, Some(4.0), Some(2.0)], None);
        assert_eq!(series.newest_value(), Some(4.0));
    }
}
