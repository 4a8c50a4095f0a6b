//! Batch collection of daily records across listing pages.
//!
//! The collector walks the news listing page by page, downloads every
//! bulletin it finds, and funnels the pages through the parser. Network
//! failures abort the run (a silently shorter dataset is worse than no
//! dataset), while parse and validation failures only drop the one page
//! with a warning: the listing mixes real bulletins with look-alike
//! announcements that are expected to fail extraction.
//!
//! Records come out sorted by date, newest first, which is the order every
//! downstream consumer (JSON file, tables, charts) relies on.

use std::error::Error;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, instrument, warn};

use crate::models::DailyRecord;
use crate::parser;
use crate::scrapers::rospotrebnadzor;

/// Parse fetched bulletin pages into records, newest first.
///
/// Pages that fail extraction or validation are logged and skipped; the
/// remaining records are sorted by date descending.
///
/// # Arguments
///
/// * `pages` - `(url, body)` pairs in any order
///
/// # Returns
///
/// The validated records, newest first.
pub fn parse_bulletins(pages: impl IntoIterator<Item = (String, String)>) -> Vec<DailyRecord> {
    let mut records: Vec<DailyRecord> = Vec::new();
    for (link, body) in pages {
        match parser::parse_bulletin(&body, &link) {
            Ok(record) => {
                info!(url = %link, date = %record.date, new = record.new, "Parsed bulletin");
                records.push(record);
            }
            Err(e) => warn!(url = %link, error = %e, "Skipping bulletin page"),
        }
    }
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}

/// Collect validated daily records from the first `page_count` listing pages.
///
/// Listing pages are scanned in order starting from page 1 (the freshest),
/// and every bulletin linked from them is downloaded one request at a time.
/// The site serves its news from a single slow box; there is no point in
/// hammering it with parallel requests.
///
/// # Arguments
///
/// * `page_count` - Number of listing pages to scan
///
/// # Returns
///
/// All records that parsed and validated, newest first. Any failed download
/// (listing or bulletin) aborts the whole collection.
#[instrument(level = "info")]
pub async fn collect_daily_records(page_count: u32) -> Result<Vec<DailyRecord>, Box<dyn Error>> {
    let mut pages: Vec<(String, String)> = Vec::new();
    for page in 1..=page_count {
        let listing = rospotrebnadzor::fetch_listing_page(page).await?;
        let links = rospotrebnadzor::bulletin_links(&listing)?;
        info!(page, count = links.len(), "Indexed listing page");

        let fetched: Vec<(String, String)> = stream::iter(links)
            .then(|link: String| async move {
                let body = rospotrebnadzor::fetch_bulletin(&link).await?;
                Ok::<(String, String), Box<dyn Error>>((link, body))
            })
            .try_collect()
            .await?;
        pages.extend(fetched);
    }

    let records = parse_bulletins(pages);
    info!(count = records.len(), "Collected valid daily records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Bulletin page with two region lines. `new` is passed explicitly so a
    /// test can break the sum cross-check on purpose.
    fn bulletin_page(date: &str, moscow: u64, piter: u64, new: u64) -> String {
        format!(
            r#"<html><body><div class="news-detail">
            <div class="news-date">{date} г.</div>
            <p>За последние сутки в России выявлено {new} новых случаев коронавирусной инфекции в 2 регионах.</p>
            <div>Москва - {moscow}</div>
            <div>Санкт-Петербург - {piter}</div>
            <p>Всего на сегодняшний день в России выявлено 1000 случаев коронавирусной инфекции в 85 регионах.</p>
            <p>За весь период выписано по выздоровлении 50 человек.</p>
            </div></body></html>"#
        )
    }

    #[test]
    fn test_parse_bulletins_skips_invalid_and_sorts() {
        let pages = vec![
            ("https://example.com/b1".to_string(), bulletin_page("04.04.2020", 10, 5, 15)),
            // Region lines sum to 12, sentence claims 20: dropped
            ("https://example.com/b2".to_string(), bulletin_page("03.04.2020", 7, 5, 20)),
            ("https://example.com/b3".to_string(), bulletin_page("05.04.2020", 20, 10, 30)),
        ];

        let records = parse_bulletins(pages);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2020, 4, 5).unwrap());
        assert_eq!(records[0].link, "https://example.com/b3");
        assert_eq!(records[0].new, 30);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2020, 4, 4).unwrap());
        assert_eq!(records[1].regions["Москва"], 10);
    }

    #[test]
    fn test_parse_bulletins_empty_input() {
        assert!(parse_bulletins(Vec::new()).is_empty());
    }
}
