//! Error types for fetching, extraction and profile loading.
//!
//! Only [`ConfigError`] (and invalid rules found while loading a profile) ever
//! reaches `main`. [`FetchError`] and [`ExtractError`] raised while processing a
//! target are converted into failure records by the aggregator.

use thiserror::Error;

/// Failure reported by the fetch collaborator for one locator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid locator {locator}: {cause}")]
    InvalidLocator { locator: String, cause: String },

    #[error("timed out fetching {locator}")]
    Timeout { locator: String },

    #[error("connection to {locator} failed: {cause}")]
    Connect { locator: String, cause: String },

    #[error("HTTP {status} from {locator}")]
    Status { locator: String, status: u16 },

    #[error("transport error fetching {locator}: {cause}")]
    Transport { locator: String, cause: String },
}

impl FetchError {
    /// Map a `reqwest` error onto the taxonomy, keeping the cause text.
    pub fn from_reqwest(locator: &str, e: &reqwest::Error) -> Self {
        let locator = locator.to_string();
        if e.is_timeout() {
            FetchError::Timeout { locator }
        } else if e.is_connect() {
            FetchError::Connect {
                locator,
                cause: e.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                locator,
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                locator,
                cause: e.to_string(),
            }
        }
    }
}

/// Failure to compile rules or to process an obtained document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("rule {rule:?} has an invalid selector {selector:?}: {cause}")]
    InvalidSelector {
        rule: String,
        selector: String,
        cause: String,
    },

    #[error("rule name {0:?} is declared more than once")]
    DuplicateRule(String),

    #[error("document is empty")]
    EmptyDocument,

    #[error("document is not markup (content type {0})")]
    NotMarkup(String),
}

/// Failure to load or validate a source profile.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("profile declares no targets")]
    NoTargets,

    #[error("profile declares no extraction rules")]
    NoRules,

    #[error("target {0:?} has no url and the profile declares no locator rule")]
    MissingLocator(String),

    #[error("locator template {0:?} has no {{slug}} placeholder")]
    MissingSlug(String),

    #[error("target {id:?} has an invalid url {url:?}: {cause}")]
    InvalidUrl {
        id: String,
        url: String,
        cause: String,
    },

    #[error(transparent)]
    Rules(#[from] ExtractError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_keeps_cause() {
        let e = FetchError::Status {
            locator: "https://example.com/inter".to_string(),
            status: 404,
        };
        assert_eq!(e.to_string(), "HTTP 404 from https://example.com/inter");

        let e = FetchError::Timeout {
            locator: "https://example.com/roma".to_string(),
        };
        assert!(e.to_string().contains("timed out"));
    }

    #[test]
    fn test_config_error_wraps_rule_error() {
        let e: ConfigError = ExtractError::DuplicateRule("modulo".to_string()).into();
        assert_eq!(e.to_string(), "rule name \"modulo\" is declared more than once");
    }

    #[test]
    fn test_missing_slug_message() {
        let e = ConfigError::MissingSlug("https://example.com/".to_string());
        assert!(e.to_string().contains("{slug}"));
    }
}
