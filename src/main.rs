//! # probable_lineups
//!
//! Fetches one page per configured target (by default the probable
//! formation of every Serie A team on fantacalcio.it), extracts a few fields
//! with CSS selectors and renders a static HTML page.
//!
//! ## Usage
//!
//! ```sh
//! probable_lineups -o index.html
//! probable_lineups -c profiles/news.yaml -o news.html -j ./json --concurrency 4
//! ```
//!
//! ## Pipeline
//!
//! 1. **Profile**: Load the source profile and resolve target locators
//! 2. **Aggregation**: Fetch and extract every target, one record each
//! 3. **Output**: Render the HTML page and optionally a JSON copy

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use probable_lineups::aggregate::aggregate;
use probable_lineups::cli::Cli;
use probable_lineups::config::SourceProfile;
use probable_lineups::fetch::HttpFetcher;
use probable_lineups::models::{RecordStatus, Report};
use probable_lineups::outputs::{html, json};
use probable_lineups::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("probable_lineups starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Profile ----
    let profile = match &args.config {
        Some(path) => SourceProfile::load(path).await?,
        None => {
            info!("No profile given; using built-in Serie A profile");
            SourceProfile::serie_a()
        }
    };
    let targets = profile.targets()?;
    let rules = profile.compile_rules()?;
    info!(
        profile = %profile.name,
        targets = targets.len(),
        rules = rules.len(),
        "Profile ready"
    );

    // Early check: fail before fetching anything if the JSON dir is unusable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    // ---- Aggregation ----
    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs), &args.user_agent)?;
    let options = profile.aggregate_options(args.concurrency);
    let records = aggregate(&targets, &fetcher, &rules, &options).await;

    let now = Local::now();
    let report = Report {
        title: profile.title.clone(),
        source_label: profile.source_label.clone(),
        local_date: now.date_naive().to_string(),
        local_time: now.time().format("%H:%M:%S").to_string(),
        records,
    };

    // ---- Output ----
    let page = html::render_report(&report, &profile.render_options());
    html::write_report(&args.output, &page).await?;
    info!(path = %args.output, "HTML page generated");

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_report(&report, dir, &profile.name).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        ok = report.records.count(RecordStatus::Ok),
        failed = report.records.len() - report.records.count(RecordStatus::Ok),
        "Execution complete"
    );

    Ok(())
}
