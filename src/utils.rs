//! Locator derivation, text normalization and file system helpers.
//!
//! This module provides helper functions used throughout the application:
//! - Identifier normalization and locator derivation for targets
//! - Whitespace collapsing for extracted text
//! - String truncation for logging and HTML escaping for rendering
//! - File system validation for output directories

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s\-_]").expect("static regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn default_separator() -> char {
    '-'
}

/// How a raw target identifier becomes a URL.
///
/// # Example
///
/// ```yaml
/// url_template: "https://www.fantacalcio.it/giocatori/probabili-formazioni/serie-a/{slug}"
/// separator: "-"
/// noise_tokens: ["hellas", "ac", "ssc"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocatorRule {
    /// URL with a single `{slug}` placeholder.
    pub url_template: String,
    /// Character joining slug segments.
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Segments dropped from the slug (club prefixes and the like).
    #[serde(default)]
    pub noise_tokens: Vec<String>,
}

impl LocatorRule {
    pub fn new(url_template: &str) -> Self {
        Self {
            url_template: url_template.to_string(),
            separator: default_separator(),
            noise_tokens: Vec::new(),
        }
    }

    pub fn with_noise_tokens(mut self, tokens: &[&str]) -> Self {
        self.noise_tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    fn is_noise(&self, segment: &str) -> bool {
        self.noise_tokens.iter().any(|token| {
            token
                .trim_matches(|c: char| c == '-' || c == self.separator)
                .to_lowercase()
                == segment
        })
    }
}

/// Normalize a target identifier into a URL slug.
///
/// Lowercases, drops punctuation, splits on whitespace and the separator,
/// removes noise segments and joins the rest with the separator. Hyphens
/// inside a name survive unless `-` is the separator.
/// If every segment is noise the unstripped slug is returned.
///
/// # Examples
///
/// ```ignore
/// let rule = LocatorRule::new("https://x/{slug}").with_noise_tokens(&["hellas"]);
/// assert_eq!(normalize_identifier("Hellas Verona", &rule), "verona");
/// assert_eq!(normalize_identifier("Juventus", &rule), "juventus");
/// ```
pub fn normalize_identifier(id: &str, rule: &LocatorRule) -> String {
    let lowered = id.to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let segments: Vec<&str> = cleaned
        .split(|c: char| c.is_whitespace() || c == rule.separator)
        .filter(|s| !s.is_empty())
        .collect();

    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|s| !rule.is_noise(s))
        .collect();
    let chosen = if kept.is_empty() { &segments } else { &kept };

    chosen.iter().join(&rule.separator.to_string())
}

/// Build the locator for `id` by substituting its slug into the template.
pub fn derive_locator(id: &str, rule: &LocatorRule) -> String {
    rule.url_template
        .replace("{slug}", &normalize_identifier(id, rule))
}

/// Trim and collapse every internal whitespace run to one space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char boundary)
/// with an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
