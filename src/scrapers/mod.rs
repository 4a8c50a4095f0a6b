//! Scrapers for sites publishing daily epidemic bulletins.
//!
//! Each scraper follows a consistent two-phase pattern:
//!
//! 1. **Indexing**: Discover bulletin URLs from the source's news listing
//! 2. **Fetching**: Download each bulletin page for the parser
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Rospotrebnadzor | [`rospotrebnadzor`] | HTML scraping | Paginated news listing, bulletins recognized by title prefix |
//!
//! Scrapers return page bodies only. Turning a page into numbers is the
//! parser's job, and listing traversal order is preserved so newer bulletins
//! come first.

pub mod rospotrebnadzor;
