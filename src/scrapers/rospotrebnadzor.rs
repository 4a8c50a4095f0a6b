//! Rospotrebnadzor news listing scraper.
//!
//! This module scrapes the news section of
//! [rospotrebnadzor.ru](https://www.rospotrebnadzor.ru), the Russian consumer
//! health watchdog, where the daily COVID-19 bulletins are published between
//! unrelated press releases. Bulletins are recognized by their title prefix
//! ("О подтвержденных случаях..."), which stayed stable across the whole
//! publication run.
//!
//! # URL Pattern
//!
//! Listing pages are paginated as
//! `https://www.rospotrebnadzor.ru/about/info/news/?PAGEN_1=<n>` with `n`
//! starting at 1 (the freshest announcements). Bulletin links on a listing
//! page are relative and resolved against the site root.

use std::error::Error;

use reqwest::get;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Site root, also the base for resolving relative bulletin links.
pub const SITE: &str = "https://www.rospotrebnadzor.ru";

/// Title prefix shared by every daily bulletin.
///
/// Deliberately short of the full title: wording after "О подтвержденных"
/// varied over time while this stem did not.
const BULLETIN_MARKER: &str = "О подтвержд";

/// URL of one news listing page.
fn listing_page_url(page: u32) -> String {
    format!("{SITE}/about/info/news/?PAGEN_1={page}")
}

/// Fetch one news listing page.
///
/// # Arguments
///
/// * `page` - 1-based listing page index
///
/// # Returns
///
/// The page body, or an error if the request fails or the server answers
/// with a non-success status. Listing fetches are load-bearing: a missing
/// listing means an unknown number of missing bulletins, so the error is
/// propagated rather than swallowed.
#[instrument(level = "info")]
pub async fn fetch_listing_page(page: u32) -> Result<String, Box<dyn Error>> {
    let url = listing_page_url(page);
    let body = get(&url).await?.error_for_status()?.text().await?;
    info!(%url, bytes = body.len(), "Fetched listing page");
    Ok(body)
}

/// Extract bulletin URLs from a listing page, newest first.
///
/// Scans every anchor on the page and keeps those whose rendered text starts
/// a daily bulletin title. Relative hrefs are resolved against [`SITE`];
/// anchors that resolve to the same URL twice (title plus "read more" links)
/// are deduplicated while preserving first-seen order.
///
/// # Returns
///
/// Absolute bulletin URLs in listing order.
pub fn bulletin_links(html: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(SITE)?;
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&anchor_selector) {
        let title = element.text().collect::<Vec<_>>().join(" ");
        if !title.contains(BULLETIN_MARKER) {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            if let Ok(resolved) = base.join(href) {
                let resolved = resolved.to_string();
                if !links.contains(&resolved) {
                    links.push(resolved);
                }
            }
        }
    }

    debug!(count = links.len(), "Matched bulletin links on listing page");
    Ok(links)
}

/// Fetch a single bulletin page.
///
/// # Arguments
///
/// * `url` - Absolute bulletin URL from [`bulletin_links`]
///
/// # Returns
///
/// The page body. Like listing fetches, a failed bulletin download aborts
/// the run; only parsing is allowed to fail per page.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_bulletin(url: &str) -> Result<String, Box<dyn Error>> {
    let body = get(url).await?.error_for_status()?.text().await?;
    info!(bytes = body.len(), "Fetched bulletin page");
    Ok(body)
}
