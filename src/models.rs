//! Data model for parsed daily bulletins.
//!
//! This module defines the core data structure used throughout the application:
//! - [`DailyRecord`]: One validated day of case numbers, keyed by region
//!
//! Region names are dynamic (they are whatever the bulletin prose contains),
//! so they are flattened into the top level of the JSON object next to the
//! fixed fields rather than nested under a `regions` key.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of federal subjects a nationwide bulletin is expected to cover.
///
/// The totals sentence of every bulletin states how many regions have
/// registered cases overall. Once the outbreak reached the whole country
/// that number stays pinned at 85, and a page reporting anything else is
/// either a different kind of announcement or a misparse.
pub const EXPECTED_REGION_COUNT: u64 = 85;

/// One day of case numbers extracted from a single bulletin page.
///
/// All counts are cross-checked at parse time: the per-region values must
/// sum to `new`, and `total_reg` must equal [`EXPECTED_REGION_COUNT`].
/// A `DailyRecord` that exists is therefore internally consistent.
///
/// # Fields
///
/// * `date` - The bulletin's publication date (serialized as `YYYY-MM-DD`)
/// * `link` - The bulletin page the numbers were extracted from
/// * `new` - New cases confirmed over the last day, nationwide
/// * `new_reg` - Number of regions reporting new cases that day
/// * `total` - Cumulative confirmed cases nationwide
/// * `total_healthy` - Cumulative recoveries (discharged patients)
/// * `total_reg` - Number of regions with registered cases overall
/// * `regions` - New cases per region, flattened into the JSON top level
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub link: String,
    pub new: u64,
    pub new_reg: u64,
    pub total: u64,
    pub total_healthy: u64,
    pub total_reg: u64,
    #[serde(flatten)]
    pub regions: BTreeMap<String, u64>,
}

impl DailyRecord {
    /// Sum of the per-region new case counts.
    ///
    /// Equals `new` for any record produced by the parser; exposed so that
    /// consumers of hand-edited JSON can re-check the invariant.
    pub fn region_sum(&self) -> u64 {
        self.regions.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2020, 4, 5).unwrap(),
            link: "https://www.rospotrebnadzor.ru/about/info/news/news_details.php?ELEMENT_ID=14110".to_string(),
            new: 582,
            new_reg: 17,
            total: 4731,
            total_healthy: 333,
            total_reg: 85,
            regions: BTreeMap::from([
                ("Москва".to_string(), 434),
                ("Московская область".to_string(), 82),
                ("Санкт-Петербург".to_string(), 35),
                ("Ленинградская область".to_string(), 31),
            ]),
        }
    }

    #[test]
    fn test_region_sum() {
        let record = sample_record();
        assert_eq!(record.region_sum(), 582);
        assert_eq!(record.region_sum(), record.new);
    }

    #[test]
    fn test_serialization_flattens_regions() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();

        // Regions live at the top level of the object, not under a key
        assert!(json.contains(r#""Москва":434"#));
        assert!(!json.contains(r#""regions""#));
        // The date is ISO formatted
        assert!(json.contains(r#""date":"2020-04-05""#));
    }

    #[test]
    fn test_deserialization_collects_region_keys() {
        let json = r#"{
            "date": "2020-04-05",
            "link": "https://example.com/bulletin",
            "new": 10,
            "new_reg": 2,
            "total": 100,
            "total_healthy": 5,
            "total_reg": 85,
            "Москва": 7,
            "Санкт-Петербург": 3
        }"#;

        let record: DailyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 4, 5).unwrap());
        assert_eq!(record.regions.len(), 2);
        assert_eq!(record.regions["Москва"], 7);
        assert_eq!(record.region_sum(), record.new);
    }

    #[test]
    fn test_round_trip_preserves_record() {
        let record = sample_record();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: DailyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
