//! JSON output of the aggregated report.
//!
//! # Output Structure
//!
//! Files are organized by date, one per profile:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── serie-a-lineups.json
//!     └── calcio-news.json
//! ```
//!
//! A later run on the same day replaces the file for that profile.

use crate::models::Report;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Report`] to `{json_output_dir}/{local_date}/{name}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation, serialization or
/// file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, name = %name))]
pub async fn write_report(
    report: &Report,
    json_output_dir: &str,
    name: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        report.local_date
    );
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{full_json_dir}/{name}.json");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, records = report.records.len(), "Wrote JSON report");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, FieldValue, Record, RecordStatus, ResultSet};

    #[tokio::test]
    async fn test_write_report_layout_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report {
            title: "Probabili Formazioni Serie A".to_string(),
            source_label: "Fantacalcio.it".to_string(),
            local_date: "2025-05-06".to_string(),
            local_time: "20:30:00".to_string(),
            records: ResultSet::from(vec![Record {
                target_id: "Roma".to_string(),
                status: RecordStatus::ParseError,
                fields: vec![Field {
                    name: "modulo".to_string(),
                    value: FieldValue::Single("data not available".to_string()),
                }],
                source_label: "Fantacalcio.it (Error)".to_string(),
                error: Some("document is empty".to_string()),
            }]),
        };

        let base = format!("{}/", dir.path().display());
        let path = write_report(&report, &base, "serie-a-lineups").await.unwrap();
        assert!(path.ends_with("/2025-05-06/serie-a-lineups.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["local_date"], "2025-05-06");
        assert_eq!(written["records"][0]["target_id"], "Roma");
        assert_eq!(written["records"][0]["status"], "ParseError");
        assert_eq!(written["records"][0]["error"], "document is empty");

        let back: Report = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.records.len(), 1);
    }
}
