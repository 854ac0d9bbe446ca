//! Drives fetch and extraction across every configured target.
//!
//! [`aggregate`] always returns exactly one [`Record`] per [`Target`], in input
//! order. Fetch and extraction failures are converted into sentinel records at
//! the per-target boundary, so one failing target never affects the others and
//! nothing propagates to the caller.
//!
//! # Scheduling
//!
//! With `concurrency = 1` targets are processed strictly one after another.
//! Larger values fan fetches out through a bounded `futures` stream; every
//! result is tagged with its target index and the batch is reassembled in
//! index order, so completion order never leaks into the result set.

use crate::extract::{extract, fallback_record, CompiledRules};
use crate::fetch::Fetch;
use crate::models::{Record, RecordStatus, ResultSet, Target};
use crate::utils::{derive_locator, LocatorRule};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Value written into every field of a failed record.
pub const DEFAULT_SENTINEL: &str = "data not available";

/// Per-run settings for [`aggregate`].
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Nominal source name stamped on every record.
    pub source_label: String,
    /// Placeholder value for failed records.
    pub sentinel: String,
    /// Maximum number of targets in flight; `0` is treated as `1`.
    pub concurrency: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            source_label: String::new(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            concurrency: 1,
        }
    }
}

/// Build the target for a raw identifier, deriving its locator with `rule`.
pub fn target_for(id: &str, rule: &LocatorRule) -> Target {
    Target::new(id, derive_locator(id, rule))
}

/// Fetch and extract one target; never fails.
async fn process_target<F: Fetch>(
    target: &Target,
    fetcher: &F,
    rules: &CompiledRules,
    options: &AggregateOptions,
) -> Record {
    let document = match fetcher.fetch(&target.locator).await {
        Ok(document) => document,
        Err(e) => {
            warn!(target_id = %target.id, locator = %target.locator, error = %e, "Fetch failed; using placeholder record");
            return fallback_record(
                &target.id,
                &options.source_label,
                RecordStatus::FetchError,
                rules,
                &options.sentinel,
                e.to_string(),
            );
        }
    };

    match extract(target, &options.source_label, &document, rules) {
        Ok(record) => {
            info!(target_id = %target.id, "Extracted record");
            record
        }
        Err(e) => {
            warn!(target_id = %target.id, locator = %target.locator, error = %e, "Document could not be processed; using placeholder record");
            fallback_record(
                &target.id,
                &options.source_label,
                RecordStatus::ParseError,
                rules,
                &options.sentinel,
                e.to_string(),
            )
        }
    }
}

/// Process every target and collect one record each, preserving input order.
#[instrument(level = "info", skip_all, fields(targets = targets.len(), concurrency = options.concurrency))]
pub async fn aggregate<F: Fetch>(
    targets: &[Target],
    fetcher: &F,
    rules: &CompiledRules,
    options: &AggregateOptions,
) -> ResultSet {
    let t0 = Instant::now();
    let concurrency = options.concurrency.max(1);

    let mut tagged: Vec<(usize, Record)> = stream::iter(targets.iter().enumerate())
        .map(|(i, target)| async move { (i, process_target(target, fetcher, rules, options).await) })
        .buffer_unordered(concurrency)
        .collect()
        .await;
    tagged.sort_unstable_by_key(|(i, _)| *i);

    let results = ResultSet::from(tagged.into_iter().map(|(_, r)| r).collect::<Vec<_>>());

    info!(
        total = results.len(),
        ok = results.count(RecordStatus::Ok),
        fetch_errors = results.count(RecordStatus::FetchError),
        parse_errors = results.count(RecordStatus::ParseError),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Aggregation complete"
    );
    results
}
