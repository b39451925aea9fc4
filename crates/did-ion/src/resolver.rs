//! # ION DID Resolver

use did_core::error::Err;
use did_core::{tracerr, Resolution, Resolver, Result};
use reqwest::StatusCode;
use tracing::instrument;

use crate::config::IonConfig;
use crate::http_client;

/// Resolver for ION DIDs, and any other DID the configured resolution endpoint serves.
///
/// A short-form DID resolves only once its create operation has been anchored. A long-form DID
/// resolves immediately, with `published == false` in its metadata until it is anchored. Every
/// call is a fresh lookup.
#[derive(Clone, Debug)]
pub struct DidResolver {
    resolution_url: String,
    http_client: reqwest::Client,
}

impl DidResolver {
    /// Create a resolver for the configured resolution endpoint.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` - The HTTP client could not be created.
    pub fn new(config: &IonConfig) -> Result<Self> {
        Ok(Self {
            resolution_url: config.resolution_url.clone(),
            http_client: http_client()?,
        })
    }

    fn url(&self, did: &str) -> Result<url::Url> {
        let mut base = self.resolution_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        match url::Url::parse(&format!("{base}{did}")) {
            Ok(url) => Ok(url),
            Err(e) => tracerr!(Err::ResolutionError, "Invalid resolution URL for {did}: {e}"),
        }
    }
}

impl Resolver for DidResolver {
    /// Resolve a short or long-form DID.
    ///
    /// # Errors
    ///
    /// * `Err::DidNotFound` - The endpoint has no record of the DID: HTTP 404, or a `notFound`
    ///   resolution error.
    /// * `Err::ResolutionError` - The DID is not syntactically a DID, the endpoint could not be
    ///   reached, answered with another failure status, or returned an unreadable body.
    #[instrument(skip(self))]
    async fn resolve(&self, did: &str) -> Result<Resolution> {
        let is_did = did
            .strip_prefix("did:")
            .and_then(|rest| rest.split_once(':'))
            .is_some_and(|(method, id)| !method.is_empty() && !id.is_empty());
        if !is_did {
            tracerr!(Err::ResolutionError, "Not a DID: {did}");
        }

        let url = self.url(did)?;
        let res = match self.http_client.get(url).send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::ResolutionError, "Failed to call resolution endpoint: {e}"),
        };

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            tracerr!(Err::DidNotFound, "No record of {did}");
        }
        if !status.is_success() {
            tracerr!(Err::ResolutionError, "Resolution endpoint returned {status}");
        }

        let resolution: Resolution = match res.json().await {
            Ok(resolution) => resolution,
            Err(e) => tracerr!(Err::ResolutionError, "Unreadable resolution result: {e}"),
        };
        if resolution.error() == Some("notFound") {
            tracerr!(Err::DidNotFound, "No record of {did}");
        }

        tracing::debug!(published = resolution.is_published(), "resolved");
        Ok(resolution)
    }
}
