//! Static HTML page generation.
//!
//! [`render_report`] is a pure function of the [`Report`]: one card per record,
//! in result-set order, styled with the Tailwind CDN and the Inter font.
//! The first single field goes into the card heading; every other field is
//! listed under its rule name. Failed records are rendered too, marked with their status and error label,
//! so missing data is never silently dropped from the page.

use crate::models::{FieldValue, Record, Report};
use crate::utils::escape_html;
use std::fmt::{self, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Presentation settings that are not part of the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// `lang` attribute of the `<html>` element.
    pub lang: String,
    /// Shown in place of an empty list field.
    pub empty_list_message: String,
    /// Footer line.
    pub footer: String,
}

const CHECK_ICON: &str = r#"<svg class="w-4 h-4 text-green-500 mr-2" fill="currentColor" viewBox="0 0 20 20" xmlns="http://www.w3.org/2000/svg"><path fill-rule="evenodd" d="M10 18a8 8 0 100-16 8 8 0 000 16zm3.707-9.293a1 1 0 00-1.414-1.414L9 10.586 7.707 9.293a1 1 0 00-1.414 1.414l2 2a1 1 0 001.414 0l4-4z" clip-rule="evenodd"></path></svg>"#;

/// Placeholder badge showing the first letter of the target.
fn logo_url(target_id: &str) -> String {
    let initial: String = target_id
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "https://placehold.co/40x40/cbd5e1/4b5563?text={}",
        urlencoding::encode(&initial)
    )
}

fn write_head(out: &mut String, report: &Report, opts: &RenderOptions) -> fmt::Result {
    let title = escape_html(&report.title);
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="{}">"#, escape_html(&opts.lang))?;
    writeln!(out, "<head>")?;
    writeln!(out, r#"    <meta charset="utf-8">"#)?;
    writeln!(
        out,
        r#"    <meta name="viewport" content="width=device-width, initial-scale=1.0">"#
    )?;
    writeln!(out, "    <title>{title}</title>")?;
    writeln!(out, r#"    <script src="https://cdn.tailwindcss.com"></script>"#)?;
    writeln!(
        out,
        r#"    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700&display=swap" rel="stylesheet">"#
    )?;
    writeln!(
        out,
        "    <style>body {{ font-family: 'Inter', sans-serif; background-color: #f0f2f5; }}</style>"
    )?;
    writeln!(out, "</head>")?;
    writeln!(
        out,
        r#"<body class="p-4 bg-gray-100 flex flex-col items-center min-h-screen">"#
    )?;
    writeln!(out, r#"    <div class="container mx-auto max-w-4xl">"#)?;
    writeln!(
        out,
        r#"        <h1 class="text-4xl font-bold text-center text-gray-800 mb-8 rounded-lg p-4 bg-white shadow-md">{title}</h1>"#
    )?;
    writeln!(out, r#"        <div class="grid grid-cols-1 md:grid-cols-2 gap-6">"#)
}

fn write_single(out: &mut String, label: &str, value: &str) -> fmt::Result {
    writeln!(
        out,
        r#"                <p class="text-gray-600 mb-2" data-field="{label}"><span class="font-semibold text-gray-700">{label}:</span> {}</p>"#,
        escape_html(value),
        label = escape_html(label)
    )
}

fn write_list(out: &mut String, label: &str, items: &[String], opts: &RenderOptions) -> fmt::Result {
    writeln!(
        out,
        r#"                <h3 class="text-sm font-semibold uppercase tracking-wide text-gray-500 mt-3 mb-1">{}</h3>"#,
        escape_html(label)
    )?;
    writeln!(
        out,
        r#"                <ul class="list-disc list-inside text-gray-600 space-y-2">"#
    )?;
    if items.is_empty() {
        writeln!(
            out,
            r#"                    <li class="italic text-gray-400">{}</li>"#,
            escape_html(&opts.empty_list_message)
        )?;
    }
    for item in items {
        writeln!(
            out,
            r#"                    <li class="flex items-center">{CHECK_ICON}{}</li>"#,
            escape_html(item)
        )?;
    }
    writeln!(out, "                </ul>")
}

/// Position of the field shown in the card heading: the first single value.
fn heading_field(record: &Record) -> Option<usize> {
    record
        .fields
        .iter()
        .position(|f| matches!(f.value, FieldValue::Single(_)))
}

fn write_card(out: &mut String, record: &Record, opts: &RenderOptions) -> fmt::Result {
    let name = escape_html(&record.target_id);
    let heading_idx = heading_field(record);
    let heading = match record.headline() {
        Some(h) => format!("{name} — {}", escape_html(h)),
        None => name.clone(),
    };

    writeln!(
        out,
        r#"            <div class="team bg-white shadow-lg rounded-lg p-6 mb-4 transform transition-transform duration-300 hover:scale-105 hover:shadow-xl" data-status="{}">"#,
        record.status.as_str()
    )?;
    writeln!(out, r#"                <div class="flex items-center mb-4">"#)?;
    writeln!(
        out,
        r#"                    <img src="{}" alt="{name} logo" class="w-10 h-10 rounded-full mr-4 border-2 border-gray-200 object-contain">"#,
        escape_html(&logo_url(&record.target_id))
    )?;
    writeln!(
        out,
        r#"                    <h2 class="text-2xl font-semibold text-gray-700">{heading}</h2>"#
    )?;
    writeln!(out, "                </div>")?;

    if !record.status.is_ok() {
        let cause = record.error.as_deref().unwrap_or_default();
        writeln!(
            out,
            r#"                <p class="text-sm text-red-600 mb-2" title="{}">{} · {}</p>"#,
            escape_html(cause),
            escape_html(&record.source_label),
            record.status.as_str()
        )?;
    }

    for (i, field) in record.fields.iter().enumerate() {
        if Some(i) == heading_idx {
            continue;
        }
        match &field.value {
            FieldValue::Single(value) => write_single(out, &field.name, value)?,
            FieldValue::List(items) => write_list(out, &field.name, items, opts)?,
        }
    }
    writeln!(out, "            </div>")
}

fn write_page(out: &mut String, report: &Report, opts: &RenderOptions) -> fmt::Result {
    write_head(out, report, opts)?;
    for record in &report.records {
        write_card(out, record, opts)?;
    }
    writeln!(out, "        </div>")?;
    writeln!(out, "    </div>")?;
    writeln!(
        out,
        r#"    <footer class="mt-8 text-center text-gray-500 text-sm">{}<br>{} {}</footer>"#,
        escape_html(&opts.footer),
        escape_html(&report.local_date),
        escape_html(&report.local_time)
    )?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

/// Render the full page for `report`.
pub fn render_report(report: &Report, opts: &RenderOptions) -> String {
    let mut html = String::new();
    write_page(&mut html, report, opts).expect("writing to a String cannot fail");
    html
}

/// Write the rendered page to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_report(path: impl AsRef<Path>, html: &str) -> Result<(), std::io::Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, html).await?;
    info!(bytes = html.len(), "Wrote HTML report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, RecordStatus, ResultSet};

    fn opts() -> RenderOptions {
        RenderOptions {
            lang: "it".to_string(),
            empty_list_message: "Nessun giocatore trovato".to_string(),
            footer: "Dati forniti da Fantacalcio.it".to_string(),
        }
    }

    fn record(id: &str, status: RecordStatus, modulo: &str, players: &[&str]) -> Record {
        Record {
            target_id: id.to_string(),
            status,
            fields: vec![
                Field {
                    name: "modulo".to_string(),
                    value: FieldValue::Single(modulo.to_string()),
                },
                Field {
                    name: "players".to_string(),
                    value: FieldValue::List(players.iter().map(|p| p.to_string()).collect()),
                },
            ],
            source_label: if status.is_ok() {
                "Fantacalcio.it".to_string()
            } else {
                "Fantacalcio.it (Error)".to_string()
            },
            error: (!status.is_ok()).then(|| "timed out fetching x".to_string()),
        }
    }

    fn report(records: Vec<Record>) -> Report {
        Report {
            title: "Probabili Formazioni Serie A".to_string(),
            source_label: "Fantacalcio.it".to_string(),
            local_date: "2025-05-06".to_string(),
            local_time: "20:30:00".to_string(),
            records: ResultSet::from(records),
        }
    }

    #[test]
    fn test_render_cards_in_order() {
        let html = render_report(
            &report(vec![
                record("Juventus", RecordStatus::Ok, "4-3-3", &["Szczesny", "Bremer"]),
                record("Inter", RecordStatus::Ok, "3-5-2", &["Sommer"]),
            ]),
            &opts(),
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="it">"#));
        assert!(html.contains("<title>Probabili Formazioni Serie A</title>"));
        assert!(html.contains("Juventus — 4-3-3"));
        assert!(html.contains("Inter — 3-5-2"));
        assert!(html.find("Juventus —").unwrap() < html.find("Inter —").unwrap());
        assert!(html.find("Szczesny").unwrap() < html.find("Bremer").unwrap());
        assert!(html.contains("text=J"));
        assert!(html.contains("Dati forniti da Fantacalcio.it"));
        assert_eq!(html.matches(r#"class="team "#).count(), 2);
    }

    #[test]
    fn test_empty_list_shows_message() {
        let html = render_report(&report(vec![record("Lecce", RecordStatus::Ok, "4-3-3", &[])]), &opts());
        assert!(html.contains("Nessun giocatore trovato"));
    }

    #[test]
    fn test_failed_record_is_marked() {
        let html = render_report(
            &report(vec![record(
                "Spezia",
                RecordStatus::FetchError,
                "Dati non disponibili",
                &["Dati non disponibili"],
            )]),
            &opts(),
        );
        assert!(html.contains(r#"data-status="FetchError""#));
        assert!(html.contains("Fantacalcio.it (Error) · FetchError"));
        assert!(html.contains("Spezia — Dati non disponibili"));
        assert!(!html.contains("Nessun giocatore trovato"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_report(
            &report(vec![record("<script>", RecordStatus::Ok, "4&4&2", &["O'Neil"])]),
            &opts(),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt; — 4&amp;4&amp;2"));
        assert!(html.contains("O&#39;Neil"));
    }

    #[test]
    fn test_every_field_is_rendered_with_its_label() {
        let mut juve = record("Juventus", RecordStatus::Ok, "4-3-3", &["Szczesny"]);
        juve.fields.push(Field {
            name: "allenatore".to_string(),
            value: FieldValue::Single("Allegri".to_string()),
        });
        juve.fields.push(Field {
            name: "panchina".to_string(),
            value: FieldValue::List(vec!["Perin".to_string()]),
        });
        let html = render_report(&report(vec![juve]), &opts());

        assert!(html.contains("Juventus — 4-3-3"));
        assert!(!html.contains(r#"data-field="modulo""#));
        assert!(html.contains(r#"<span class="font-semibold text-gray-700">allenatore:</span> Allegri"#));
        assert!(html.contains(">players</h3>"));
        assert!(html.contains(">panchina</h3>"));
        assert!(html.find(">players</h3>").unwrap() < html.find("Szczesny").unwrap());
        assert!(html.find("Szczesny").unwrap() < html.find(">panchina</h3>").unwrap());
        assert!(html.find(">panchina</h3>").unwrap() < html.find("Perin").unwrap());
    }

    #[test]
    fn test_logo_url_encodes_initial() {
        assert_eq!(logo_url("juventus"), "https://placehold.co/40x40/cbd5e1/4b5563?text=J");
        assert_eq!(logo_url("Überlingen"), "https://placehold.co/40x40/cbd5e1/4b5563?text=%C3%9C");
        assert!(logo_url("").ends_with("text=%3F"));
    }

    #[tokio::test]
    async fn test_write_report_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site/index.html");
        write_report(&path, "<html></html>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
