//! Source profiles: which pages to fetch and which fields to pull from them.
//!
//! A profile is plain data, so pointing the tool at a different site or a
//! different field set is a YAML change. Without `--config` the built-in
//! [`SourceProfile::serie_a`] profile is used.
//!
//! # Example
//!
//! ```yaml
//! name: serie-a-lineups
//! title: Probabili Formazioni Serie A
//! source_label: Fantacalcio.it
//! locator:
//!   url_template: "https://www.fantacalcio.it/giocatori/probabili-formazioni/serie-a/{slug}"
//!   noise_tokens: [hellas]
//! targets:
//!   - Juventus
//!   - Hellas Verona
//!   - { id: "Sky Sport", url: "https://sport.sky.it/calcio/serie-a" }
//! rules:
//!   - { name: modulo, selector: ".formazioneHeader .modulo", default: "Modulo non disponibile" }
//!   - { name: players, selector: ".formazione__lista li.titolare", cardinality: list }
//! ```

use crate::aggregate::{target_for, AggregateOptions, DEFAULT_SENTINEL};
use crate::error::ConfigError;
use crate::extract::CompiledRules;
use crate::models::{ExtractionRule, Target};
use crate::outputs::html::RenderOptions;
use crate::utils::LocatorRule;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

fn default_empty_list_message() -> String {
    "Nessun elemento trovato".to_string()
}

fn default_lang() -> String {
    "it".to_string()
}

/// A configured target: a bare identifier or an identifier with its own URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    /// Locator derived from the profile's [`LocatorRule`].
    Id(String),
    /// Locator given explicitly (e.g. a news source home page).
    Explicit { id: String, url: String },
}

/// Everything needed for one run against one site.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceProfile {
    /// Short machine name, used for output file names.
    pub name: String,
    /// Page heading.
    pub title: String,
    /// Nominal source name stamped on records and shown in the footer.
    pub source_label: String,
    /// How bare identifiers become URLs.
    #[serde(default)]
    pub locator: Option<LocatorRule>,
    /// Targets in output order.
    pub targets: Vec<TargetSpec>,
    /// Fields to extract from every page.
    pub rules: Vec<ExtractionRule>,
    /// Placeholder for records that could not be fetched or processed.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Shown in place of an empty list field.
    #[serde(default = "default_empty_list_message")]
    pub empty_list_message: String,
    /// Footer line; defaults to crediting `source_label`.
    #[serde(default)]
    pub footer: Option<String>,
    /// `lang` attribute of the generated page.
    #[serde(default = "default_lang")]
    pub lang: String,
}

const SERIE_A_TEAMS: [&str; 20] = [
    "Juventus",
    "Inter",
    "Milan",
    "Napoli",
    "Roma",
    "Lazio",
    "Atalanta",
    "Fiorentina",
    "Bologna",
    "Torino",
    "Verona",
    "Monza",
    "Udinese",
    "Empoli",
    "Salernitana",
    "Lecce",
    "Sassuolo",
    "Genoa",
    "Spezia",
    "Frosinone",
];

impl SourceProfile {
    /// Probable Serie A formations from fantacalcio.it.
    pub fn serie_a() -> Self {
        Self {
            name: "serie-a-lineups".to_string(),
            title: "Probabili Formazioni Serie A".to_string(),
            source_label: "Fantacalcio.it".to_string(),
            locator: Some(
                LocatorRule::new(
                    "https://www.fantacalcio.it/giocatori/probabili-formazioni/serie-a/{slug}",
                )
                .with_noise_tokens(&["hellas", "ac", "as", "ssc", "us", "fc"]),
            ),
            targets: SERIE_A_TEAMS
                .iter()
                .map(|t| TargetSpec::Id(t.to_string()))
                .collect(),
            rules: vec![
                ExtractionRule::single(
                    "modulo",
                    ".formazioneHeader .modulo",
                    "Modulo non disponibile",
                ),
                ExtractionRule::list("players", ".formazione__lista li.titolare"),
            ],
            sentinel: "Dati non disponibili".to_string(),
            empty_list_message: "Nessun giocatore trovato".to_string(),
            footer: Some("Dati forniti da Fantacalcio.it".to_string()),
            lang: default_lang(),
        }
    }

    /// Parse a profile from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a profile file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref()).await?;
        let profile = Self::from_yaml(&text)?;
        info!(name = %profile.name, targets = profile.targets.len(), rules = profile.rules.len(), "Loaded source profile");
        Ok(profile)
    }

    /// Resolve every target to its locator, in profile order.
    ///
    /// # Errors
    ///
    /// Fails on an empty target list, a bare identifier without a locator
    /// rule, a template without `{slug}`, or a URL that does not parse.
    pub fn targets(&self) -> Result<Vec<Target>, ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if let Some(rule) = &self.locator {
            if !rule.url_template.contains("{slug}") {
                return Err(ConfigError::MissingSlug(rule.url_template.clone()));
            }
        }

        self.targets
            .iter()
            .map(|spec| -> Result<Target, ConfigError> {
                let target = match spec {
                    TargetSpec::Id(id) => {
                        let rule = self
                            .locator
                            .as_ref()
                            .ok_or_else(|| ConfigError::MissingLocator(id.clone()))?;
                        target_for(id, rule)
                    }
                    TargetSpec::Explicit { id, url } => Target::new(id.as_str(), url.as_str()),
                };
                Url::parse(&target.locator).map_err(|e| ConfigError::InvalidUrl {
                    id: target.id.clone(),
                    url: target.locator.clone(),
                    cause: e.to_string(),
                })?;
                Ok(target)
            })
            .collect()
    }

    /// Compile the profile's extraction rules.
    pub fn compile_rules(&self) -> Result<CompiledRules, ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        Ok(CompiledRules::compile(&self.rules)?)
    }

    /// Aggregation settings for this profile.
    pub fn aggregate_options(&self, concurrency: usize) -> AggregateOptions {
        AggregateOptions {
            source_label: self.source_label.clone(),
            sentinel: self.sentinel.clone(),
            concurrency,
        }
    }

    /// Rendering settings for this profile.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            lang: self.lang.clone(),
            empty_list_message: self.empty_list_message.clone(),
            footer: self
                .footer
                .clone()
                .unwrap_or_else(|| format!("Dati forniti da {}", self.source_label)),
        }
    }
}
