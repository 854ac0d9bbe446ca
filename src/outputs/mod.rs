//! Output generation for the aggregated report.
//!
//! # Submodules
//!
//! - [`html`]: Renders the static HTML page (one card per target)
//! - [`json`]: Writes the report as JSON for other consumers
//!
//! Both consume a finished [`crate::models::Report`]; neither feeds anything
//! back into scraping.

pub mod html;
pub mod json;
