//! Marketplace scrapers.
//!
//! A scraper follows a two-phase pattern:
//!
//! 1. **Loading**: Drive a live page until enough listings are rendered, then
//!    capture one markup snapshot
//! 2. **Extraction**: Parse the snapshot into [`crate::models::Record`]s
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | NBA Top Shot search | [`topshot`] | Headless Chrome + CSS selectors |

pub mod topshot;
