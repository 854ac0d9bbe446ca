//! Data models for targets, extraction rules and the records produced per run.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Target`]: One independent unit of work (a team or a news source) and its locator
//! - [`ExtractionRule`]: Declarative description of what to pull from a page
//! - [`Record`]: The per-target extraction result, including failures
//! - [`ResultSet`]: The ordered, complete collection of records for one run
//! - [`Report`]: A result set plus the metadata the output writers need
//!
//! Records are created fresh per run and never mutated after the aggregator
//! hands the result set over to the output writers.

use serde::{Deserialize, Serialize};

/// One independent unit of work: a team or a news source.
///
/// # Fields
///
/// * `id` - The stable identifier as configured (e.g. `"Hellas Verona"`)
/// * `locator` - The resource address fetched for this target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// The identifier exactly as it appears in the profile.
    pub id: String,
    /// The URL fetched for this target.
    pub locator: String,
}

impl Target {
    /// Build a target whose locator is already known.
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
        }
    }
}

/// Whether a rule yields one value or every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// First match only, falling back to the rule default.
    #[default]
    Single,
    /// All matches in document order; zero matches is an empty list.
    List,
}

/// A named CSS selector with a cardinality and a "not found" default.
///
/// Rules are plain data so that adding a new source means editing a profile,
/// not the code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractionRule {
    /// Field name in the resulting record (e.g. `"modulo"`).
    pub name: String,
    /// CSS selector applied to the fetched document.
    pub selector: String,
    /// Single value or ordered list of values.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Value used when a single-cardinality rule matches nothing.
    #[serde(default)]
    pub default: String,
    /// Read this attribute (e.g. `href`) instead of the element text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ExtractionRule {
    /// A single-cardinality rule with a default.
    pub fn single(name: &str, selector: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            cardinality: Cardinality::Single,
            default: default.to_string(),
            attribute: None,
        }
    }

    /// A list-cardinality rule.
    pub fn list(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            cardinality: Cardinality::List,
            default: String::new(),
            attribute: None,
        }
    }

    /// Extract `attr` from the matched elements instead of their text.
    pub fn with_attribute(mut self, attr: &str) -> Self {
        self.attribute = Some(attr.to_string());
        self
    }
}

/// The value of one extracted field.
///
/// Serialized untagged: a JSON string for single values, an array for lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            FieldValue::Single(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Single(_) => None,
        }
    }
}

/// A named field of a [`Record`], kept in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// Outcome of processing one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RecordStatus {
    /// Document fetched and extracted; fields may still hold their defaults.
    Ok,
    /// The fetch collaborator reported a transport or status failure.
    FetchError,
    /// The document was obtained but could not be processed.
    ParseError,
}

impl RecordStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, RecordStatus::Ok)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Ok => "Ok",
            RecordStatus::FetchError => "FetchError",
            RecordStatus::ParseError => "ParseError",
        }
    }
}

/// The result of applying every extraction rule to one fetched target.
///
/// A record always exists for every target; failures are expressed through
/// `status`, `source_label` and `error`, never by omission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    /// The identifier of the target this record belongs to.
    pub target_id: String,
    /// Whether extraction succeeded.
    pub status: RecordStatus,
    /// Extracted values, one per rule, in rule order.
    pub fields: Vec<Field>,
    /// Provenance tag; carries an `" (Error)"` suffix on failure.
    pub source_label: String,
    /// The preserved failure cause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Record {
    /// Look up a field by rule name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// The first single-valued field, used as the card subtitle.
    pub fn headline(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| f.value.as_single())
    }
}

/// The ordered collection of records for one run.
///
/// `records[i]` always belongs to `targets[i]` of the run that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records carrying `status`.
    pub fn count(&self, status: RecordStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}

impl From<Vec<Record>> for ResultSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A result set ready for the output writers.
///
/// Each execution produces one `Report`, serialized to JSON and rendered to HTML.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    /// Page heading (e.g. "Probabili Formazioni Serie A").
    pub title: String,
    /// Nominal source name (e.g. "Fantacalcio.it").
    pub source_label: String,
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the run.
    pub local_time: String,
    /// One record per configured target, in profile order.
    pub records: ResultSet,
}
