//! Fetch collaborator: retrieves the document behind a target's locator.
//!
//! The aggregator is generic over [`Fetch`], so tests can drive it with fixed
//! fixtures while the binary uses [`HttpFetcher`].
//!
//! # Policy
//!
//! - One attempt per locator, no retries
//! - Non-2xx responses are failures ([`FetchError::Status`])
//! - Implementations never panic; every call yields a document or a [`FetchError`]

use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A fetched resource, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The locator the document was fetched from.
    pub locator: String,
    /// The `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// The response body.
    pub body: String,
}

/// Anything that can turn a locator into a [`Document`].
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Retrieve the document at `locator`.
    async fn fetch(&self, locator: &str) -> Result<Document, FetchError>;
}

/// [`Fetch`] over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with a per-request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, locator: &str) -> Result<Document, FetchError> {
        let url = Url::parse(locator).map_err(|e| FetchError::InvalidLocator {
            locator: locator.to_string(),
            cause: e.to_string(),
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(locator, &e))?;

        let response = response.error_for_status().map_err(|e| {
            warn!(status = ?e.status(), "Non-success response");
            FetchError::from_reqwest(locator, &e)
        })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(locator, &e))?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched document"
        );
        debug!(preview = %truncate_for_log(&body, 200), "Document body");

        Ok(Document {
            locator: locator.to_string(),
            content_type,
            body,
        })
    }
}
