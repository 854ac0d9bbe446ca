//! Fetch a page per configured target, extract fields with CSS selectors and
//! collect one record per target, failures included.
//!
//! - [`extract`]: pure field extraction from an already fetched document
//! - [`aggregate`]: ordered, failure-isolated processing of every target
//! - [`fetch`]: the HTTP fetch collaborator
//! - [`config`]: source profiles (targets, locator rule, extraction rules)
//! - [`outputs`]: HTML and JSON report writers

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod utils;
