//! Submission of create operations to an ION node for anchoring on Bitcoin.

use did_core::error::Err;
use did_core::{tracerr, DidDocument, DocumentMetadata, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::config::IonConfig;
use crate::operation::DocumentModel;
use crate::pow::{Answer, Challenge};
use crate::uri::IonDid;
use crate::{http_client, ErrorResponse};

/// Acknowledgment returned by an ION node for an accepted operation. Acceptance means the node
/// has queued the operation, not that it is final on-chain.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnchoredIdentity {
    /// Operation status, when the node reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The document the operation produces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<DidDocument>,
    /// Metadata for the document, including publication status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document_metadata: Option<DocumentMetadata>,
    /// Any other fields in the acknowledgment.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client for submitting create operations to an ION node.
#[derive(Clone, Debug)]
pub struct AnchorClient {
    config: IonConfig,
    http_client: reqwest::Client,
}

impl AnchorClient {
    /// Create a client for the configured node.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` - The HTTP client could not be created.
    pub fn new(config: IonConfig) -> Result<Self> {
        Ok(Self {
            config,
            http_client: http_client()?,
        })
    }

    /// The long-form DID a document model has on the configured network. Its short form
    /// resolves once the model is anchored.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails consistency checks.
    pub fn did(&self, model: &DocumentModel) -> Result<IonDid> {
        IonDid::from_model(model, self.config.network)
    }

    /// Submit the create operation for a document model. When the node requires it, a proof of
    /// work is solved first. Submitting the same model twice sends the same operation.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails consistency checks.
    /// * `Err::AnchorSubmissionFailed` - The node could not be reached, the challenge could not be
    ///   answered or the response could not be read.
    /// * `Err::Expired` - The proof-of-work challenge expired before an answer was found.
    /// * `Err::AnchorRejected` - The node refused the operation.
    #[instrument(skip(self, model), fields(solution_url = %self.config.solution_url))]
    pub async fn anchor(&self, model: &DocumentModel) -> Result<AnchoredIdentity> {
        let did = self.did(model)?;
        let req = model.create_request()?;
        let body = serde_json::to_vec(&req)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.config.requires_pow() {
            let answer = self.proof_of_work(body.clone()).await?;
            headers.insert("Challenge-Nonce", header_value(&answer.challenge_nonce)?);
            headers.insert("Answer-Nonce", header_value(&answer.answer_nonce)?);
        }

        let res = match self
            .http_client
            .post(&self.config.solution_url)
            .headers(headers)
            .body(body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Failed to submit operation: {e}"),
        };

        let status = res.status();
        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Failed to read node response: {e}"),
        };
        if !status.is_success() {
            tracerr!(Err::AnchorRejected, "Node rejected operation ({status}): {}", detail(&text));
        }
        tracing::info!(%status, did = %did.short_form(), "operation accepted");

        if text.trim().is_empty() {
            return Ok(AnchoredIdentity::default());
        }
        match serde_json::from_str(&text) {
            Ok(ack) => Ok(ack),
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Unreadable acknowledgment: {e}"),
        }
    }

    // Fetch a challenge and solve it on a blocking worker.
    async fn proof_of_work(&self, body: Vec<u8>) -> Result<Answer> {
        let res = match self.http_client.get(&self.config.challenge_url).send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Failed to fetch challenge: {e}"),
        };
        if !res.status().is_success() {
            tracerr!(Err::AnchorSubmissionFailed, "Challenge request failed: {}", res.status());
        }
        let challenge: Challenge = match res.json().await {
            Ok(c) => c,
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Unreadable challenge: {e}"),
        };
        tracing::debug!(
            largest_allowed_hash = %challenge.largest_allowed_hash,
            "solving proof-of-work challenge"
        );

        match tokio::task::spawn_blocking(move || challenge.solve(&body)).await {
            Ok(answer) => answer,
            Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Proof-of-work task failed: {e}"),
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    match HeaderValue::from_str(value) {
        Ok(v) => Ok(v),
        Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Invalid header value: {e}"),
    }
}

// Best-effort description of an error body.
fn detail(text: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(text) {
        Ok(ErrorResponse { error: Some(e), .. }) => e.to_string(),
        _ if text.is_empty() => "no detail provided".to_string(),
        _ => text.to_string(),
    }
}
