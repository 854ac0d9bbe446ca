//! Field extraction from an already fetched document.
//!
//! The extractor never performs I/O: it receives a [`Document`] obtained by a
//! fetch collaborator and a set of [`CompiledRules`], and returns a [`Record`].
//! Keeping fetch and parse apart lets the whole policy run against fixed HTML
//! fixtures.
//!
//! # Degradation policy
//!
//! | Rule cardinality | Zero matches | One or more matches |
//! |------------------|--------------|---------------------|
//! | `Single` | the rule's `default` | first match, trimmed |
//! | `List` | empty list | every match in document order, trimmed |
//!
//! Attribute rules read the attribute of the same matches. A `Single` rule whose
//! first match lacks the attribute gets its `default`; a `List` rule records an
//! empty string for it, so a text list and an attribute list over the same
//! selector stay aligned by index.
//!
//! A field falling back to its default is not an error; the record keeps
//! `status = Ok`. Only a document that cannot be processed at all yields an
//! [`ExtractError`], which the aggregator turns into a `ParseError` record.

use crate::error::ExtractError;
use crate::fetch::Document;
use crate::models::{
    Cardinality, ExtractionRule, Field, FieldValue, Record, RecordStatus, Target,
};
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

/// Error suffix appended to the source label of failed records.
pub const ERROR_LABEL_SUFFIX: &str = " (Error)";

struct CompiledRule {
    rule: ExtractionRule,
    selector: Selector,
}

/// Extraction rules with their selectors parsed once up front.
pub struct CompiledRules {
    rules: Vec<CompiledRule>,
}

impl std::fmt::Debug for CompiledRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|c| &c.rule.name))
            .finish()
    }
}

impl CompiledRules {
    /// Parse every selector, rejecting invalid selectors and duplicate names.
    pub fn compile(rules: &[ExtractionRule]) -> Result<Self, ExtractError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ExtractError::DuplicateRule(rule.name.clone()));
            }
            let selector =
                Selector::parse(&rule.selector).map_err(|e| ExtractError::InvalidSelector {
                    rule: rule.name.clone(),
                    selector: rule.selector.clone(),
                    cause: e.to_string(),
                })?;
            compiled.push(CompiledRule {
                rule: rule.clone(),
                selector,
            });
        }

        Ok(Self { rules: compiled })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractionRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

/// Text or attribute value of one matched element; `None` if the attribute is absent.
fn element_value(element: ElementRef<'_>, rule: &ExtractionRule, base: Option<&Url>) -> Option<String> {
    match rule.attribute.as_deref() {
        None => Some(collapse_whitespace(&element.text().collect::<String>())),
        Some(attr) => {
            let raw = element.value().attr(attr)?.trim();
            // Links are reported absolute, resolved against the page they came from.
            if matches!(attr, "href" | "src") {
                if let Some(resolved) = base.and_then(|b| b.join(raw).ok()) {
                    return Some(resolved.to_string());
                }
            }
            Some(collapse_whitespace(raw))
        }
    }
}

/// Apply `rules` to `document`, producing an `Ok` record for `target`.
///
/// # Errors
///
/// * [`ExtractError::EmptyDocument`] if the body is blank
/// * [`ExtractError::NotMarkup`] if the declared content type is not HTML/XML/text
#[instrument(level = "debug", skip_all, fields(target_id = %target.id))]
pub fn extract(
    target: &Target,
    source_label: &str,
    document: &Document,
    rules: &CompiledRules,
) -> Result<Record, ExtractError> {
    if let Some(ct) = document.content_type.as_deref() {
        if !is_markup(ct) {
            return Err(ExtractError::NotMarkup(ct.to_string()));
        }
    }
    if document.body.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let html = Html::parse_document(&document.body);
    let base = Url::parse(&document.locator).ok();
    let mut fields = Vec::with_capacity(rules.len());

    for CompiledRule { rule, selector } in &rules.rules {
        let mut values = html
            .select(selector)
            .map(|el| element_value(el, rule, base.as_ref()));

        let value = match rule.cardinality {
            Cardinality::Single => FieldValue::Single(
                values.next().flatten().unwrap_or_else(|| rule.default.clone()),
            ),
            Cardinality::List => FieldValue::List(values.map(Option::unwrap_or_default).collect()),
        };
        debug!(rule = %rule.name, ?value, "Extracted field");

        fields.push(Field {
            name: rule.name.clone(),
            value,
        });
    }

    Ok(Record {
        target_id: target.id.clone(),
        status: RecordStatus::Ok,
        fields,
        source_label: source_label.to_string(),
        error: None,
    })
}

/// Build the sentinel record used when a target could not be processed.
///
/// Single fields get `sentinel`, list fields get `[sentinel]`, and the source
/// label is marked with [`ERROR_LABEL_SUFFIX`].
pub fn fallback_record(
    target_id: &str,
    source_label: &str,
    status: RecordStatus,
    rules: &CompiledRules,
    sentinel: &str,
    cause: String,
) -> Record {
    let fields = rules
        .iter()
        .map(|rule| Field {
            name: rule.name.clone(),
            value: match rule.cardinality {
                Cardinality::Single => FieldValue::Single(sentinel.to_string()),
                Cardinality::List => FieldValue::List(vec![sentinel.to_string()]),
            },
        })
        .collect();

    Record {
        target_id: target_id.to_string(),
        status,
        fields,
        source_label: format!("{source_label}{ERROR_LABEL_SUFFIX}"),
        error: Some(cause),
    }
}
