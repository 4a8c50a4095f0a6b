//! Free-text extraction of one bulletin page into a validated [`DailyRecord`].
//!
//! Bulletins are prose, not data. Each page repeats the same handful of
//! sentences ("выявлено N новых случаев ... в M регионах", "всего ... N
//! случаев ... в 85 регионах", "выписано N человек") around a list of
//! `Регион - количество` lines, and this module matches each fact with its
//! own dedicated pattern:
//!
//! - the publication date marker `ДД.ММ.ГГГГ г.`
//! - the per-region case lines
//! - the daily new-case sentence (count + number of reporting regions)
//! - the cumulative totals sentence (count + total regions with cases)
//! - the cumulative recoveries sentence
//!
//! The patterns allow bounded stretches of filler between their anchor
//! words, so minor rewording survives while a page about something else
//! entirely fails fast. Two cross-checks back the patterns up: the region
//! lines must sum to the daily new-case count, and the totals sentence must
//! report exactly [`EXPECTED_REGION_COUNT`] regions. A page that fails any
//! step yields a [`ParseError`] and is skipped by the collector.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::models::{DailyRecord, EXPECTED_REGION_COUNT};
use crate::utils::smart_parse_int;

/// Longest rendered `<div>` text, in characters, still considered a region
/// line. The per-region list sits in short dedicated divs; anything longer
/// containing a hyphen is surrounding prose.
const REGION_FRAGMENT_MAX_CHARS: usize = 100;

/// Publication date marker, `05.04.2020 г.` style.
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})\s*г\.").unwrap());

/// One `Регион - количество` line.
static REGION_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-\w ()]+) ?- ?([0-9]+)").unwrap());

/// Daily sentence: "...выявлено <new> новых случаев ... в <new_reg> регионах".
static NEW_CASES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)выявлен(.{1,64}?)нов.{1,160}?случ.{1,160}?в(.{1,64}?)регио").unwrap());

/// Totals sentence: "...на сегодняшний день ... выявлено <total> случаев ...
/// в <total_reg> регионах". Groups 2 and 4 carry the numbers.
static TOTALS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)сегод(.{1,64}?)выявлен(.{1,64}?)случ(.{1,160}?)в(.{1,64}?) рег").unwrap());

/// Recoveries sentence: "...выписано <total_healthy> человек".
static HEALTHY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)выписан(.{1,64}?) челов").unwrap());

/// Why a bulletin page could not be turned into a [`DailyRecord`].
///
/// The first four variants are extraction failures (a required pattern was
/// absent), the last two are validation failures (everything matched but the
/// numbers disagree with each other). Both kinds mean the page is dropped;
/// the distinction only matters for the log line explaining why.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no `ДД.ММ.ГГГГ г.` date marker found on the page")]
    DateNotFound,
    #[error("date marker `{raw}` is not a calendar date")]
    BadDate { raw: String },
    #[error("no region line matched on the page")]
    NoRegions,
    #[error("phrase `{phrase}` not found on the page")]
    PhraseNotFound { phrase: &'static str },
    #[error("capture `{capture}` contains no usable number")]
    NumberMissing { capture: String },
    #[error("region lines sum to {region_sum} but the bulletin reports {new} new cases")]
    RegionSumMismatch { region_sum: u64, new: u64 },
    #[error("bulletin reports {found} regions with cases, expected {expected}")]
    TotalRegionsMismatch { found: u64, expected: u64 },
}

/// Parse one bulletin page into a validated [`DailyRecord`].
///
/// `link` is carried into the record untouched so every row of the dataset
/// stays traceable to its source page.
///
/// # Arguments
///
/// * `html` - The raw HTML of the bulletin page
/// * `link` - The URL the page was fetched from
///
/// # Returns
///
/// The validated record, or the first [`ParseError`] encountered. Extraction
/// runs in a fixed order (date, regions, daily sentence, totals sentence,
/// recoveries sentence) followed by the two cross-checks.
pub fn parse_bulletin(html: &str, link: &str) -> Result<DailyRecord, ParseError> {
    debug!(url = %link, "Parsing bulletin page");
    let document = Html::parse_document(html);
    let text = rendered_text(&document);

    let date = extract_date(&text)?;
    let regions = extract_regions(&document)?;
    let (new, new_reg) = extract_new_cases(&text)?;
    let (total, total_reg) = extract_totals(&text)?;
    let total_healthy = extract_total_healthy(&text)?;

    let region_sum: u64 = regions.values().sum();
    if region_sum != new {
        return Err(ParseError::RegionSumMismatch { region_sum, new });
    }
    if total_reg != EXPECTED_REGION_COUNT {
        return Err(ParseError::TotalRegionsMismatch {
            found: total_reg,
            expected: EXPECTED_REGION_COUNT,
        });
    }

    Ok(DailyRecord {
        date,
        link: link.to_string(),
        new,
        new_reg,
        total,
        total_healthy,
        total_reg,
        regions,
    })
}

/// Flatten the whole document to the text a reader would see.
fn rendered_text(document: &Html) -> String {
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Find the `ДД.ММ.ГГГГ г.` marker and reorder it into a [`NaiveDate`].
fn extract_date(text: &str) -> Result<NaiveDate, ParseError> {
    let caps = DATE_RE.captures(text).ok_or(ParseError::DateNotFound)?;
    let (Ok(day), Ok(month), Ok(year)) = (
        caps[1].parse::<u32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<i32>(),
    ) else {
        return Err(ParseError::BadDate { raw: caps[0].to_string() });
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseError::BadDate { raw: caps[0].to_string() })
}

/// Collect the per-region case lines from the page's `<div>` elements.
///
/// A div qualifies as a candidate when its rendered text contains a hyphen
/// and stays under [`REGION_FRAGMENT_MAX_CHARS`] characters. Candidates that
/// still do not look like `Регион - количество` are logged and ignored.
/// A region named twice keeps the value seen last.
fn extract_regions(document: &Html) -> Result<BTreeMap<String, u64>, ParseError> {
    let div = Selector::parse("div").unwrap();
    let mut regions = BTreeMap::new();
    for element in document.select(&div) {
        let fragment = element.text().collect::<Vec<_>>().join(" ");
        let fragment = fragment.trim();
        if !fragment.contains('-') || fragment.chars().count() > REGION_FRAGMENT_MAX_CHARS {
            continue;
        }
        match REGION_LINE_RE.captures(fragment) {
            Some(caps) => {
                if let Ok(cases) = caps[2].parse::<u64>() {
                    regions.insert(caps[1].trim().to_string(), cases);
                }
            }
            None => debug!(%fragment, "Hyphenated fragment is not a region line"),
        }
    }
    if regions.is_empty() {
        return Err(ParseError::NoRegions);
    }
    Ok(regions)
}

/// Extract the daily new-case count and the number of reporting regions.
fn extract_new_cases(text: &str) -> Result<(u64, u64), ParseError> {
    let caps = NEW_CASES_RE.captures(text).ok_or(ParseError::PhraseNotFound {
        phrase: "выявлен … нов… случ… в … регио",
    })?;
    Ok((number_from(&caps, 1)?, number_from(&caps, 2)?))
}

/// Extract the cumulative case count and the total number of affected regions.
fn extract_totals(text: &str) -> Result<(u64, u64), ParseError> {
    let caps = TOTALS_RE.captures(text).ok_or(ParseError::PhraseNotFound {
        phrase: "сегод… выявлен… случ… в … рег",
    })?;
    Ok((number_from(&caps, 2)?, number_from(&caps, 4)?))
}

/// Extract the cumulative recoveries count.
fn extract_total_healthy(text: &str) -> Result<u64, ParseError> {
    let caps = HEALTHY_RE.captures(text).ok_or(ParseError::PhraseNotFound {
        phrase: "выписан… челов",
    })?;
    number_from(&caps, 1)
}

/// Smart-parse one capture group, reporting the raw capture on failure.
///
/// The gap captures deliberately include surrounding prose ("о 4 731 случай"),
/// so the digits are fished out with [`smart_parse_int`] rather than parsed
/// directly.
fn number_from(caps: &Captures<'_>, group: usize) -> Result<u64, ParseError> {
    let capture = caps.get(group).map_or("", |m| m.as_str());
    smart_parse_int(capture).ok_or_else(|| ParseError::NumberMissing {
        capture: capture.trim().to_string(),
    })
}
