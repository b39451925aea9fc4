//! Definition for a DID document resolver and the resolution result.
//!
//! See [DID resolution](https://www.w3.org/TR/did-core/#did-resolution).

use serde::{Deserialize, Serialize};

use crate::document::{DidDocument, KeyPurpose, VerificationMethod};
use crate::error::Err;
use crate::{tracerr, Result};

/// Metadata associated with a DID resolution response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolutionMetadata {
    /// The content type of the response. e.g. "application/did+ld+json".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// An error code if the resolution failed. See <https://www.w3.org/TR/did-spec-registries/#error>
    /// for a list of valid strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sidetree method-specific document metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodMetadata {
    /// Whether the DID has been anchored on the ledger.
    pub published: bool,
    /// Commitment to the next recovery key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_commitment: Option<String>,
    /// Commitment to the next update key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_commitment: Option<String>,
}

/// Metadata associated with a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    /// Sidetree method metadata, including publication status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodMetadata>,
    /// If a DID has been deactivated, DID document metadata must include this property with the
    /// boolean value true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    /// DIDs that are logically equivalent to the resolved DID. A long-form DID resolves with its
    /// short form listed here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_id: Option<Vec<String>>,
    /// The canonical DID for the DID subject, present once the DID is published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
}

/// Return type from a DID document resolution.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Resolution {
    /// The context of the resolution result. e.g. "https://w3id.org/did-resolution/v1"
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// The DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<DidDocument>,
    /// Metadata associated with the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document_metadata: Option<DocumentMetadata>,
    /// Metadata associated with the response to the resolution request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_resolution_metadata: Option<ResolutionMetadata>,
}

impl Resolution {
    /// Whether the resolved DID has been anchored on the ledger. A long-form DID that has not yet
    /// been anchored resolves with `published == false`.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.did_document_metadata
            .as_ref()
            .and_then(|m| m.method.as_ref())
            .is_some_and(|m| m.published)
    }

    /// The error code reported in resolution metadata, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.did_resolution_metadata.as_ref().and_then(|m| m.error.as_deref())
    }
}

/// A Resolver is responsible for resolving a DID to a DID document representation.
#[allow(async_fn_in_trait)]
pub trait Resolver {
    /// Resolve a DID to a DID document.
    ///
    /// # Errors
    ///
    /// `Err::DidNotFound` if the DID has no record, `Err::ResolutionError` for transport or
    /// protocol failures.
    async fn resolve(&self, did: &str) -> Result<Resolution>;

    /// Convenience method that resolves a DID to a DID document and then extracts a public key
    /// from it. This default finds the first public key that matches the required purpose.
    ///
    /// # Errors
    ///
    /// Resolution errors, or `Err::InvalidKey` if no key matches the purpose.
    async fn resolve_key(&self, did: &str, purpose: KeyPurpose) -> Result<VerificationMethod> {
        let res = self.resolve(did).await?;
        match res.did_document {
            None => tracerr!(Err::DidNotFound, "DID document missing for {did}"),
            Some(doc) => doc.get_key(purpose),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_resolution() {
        let res: Resolution = serde_json::from_value(json!({
            "@context": "https://w3id.org/did-resolution/v1",
            "didDocument": {
                "id": "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg",
                "@context": ["https://www.w3.org/ns/did/v1"]
            },
            "didDocumentMetadata": {
                "method": {
                    "published": true,
                    "recoveryCommitment": "EiDKYXZ2MkHRCYDVtXI7ONiTkTdVfs9Tnb-tDDHGXLzmOw",
                    "updateCommitment": "EiDNk40DUvxCef8_BinU5DDIAhNWE4e7Ea9Q6P7GAbJ6VA"
                },
                "canonicalId": "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg"
            }
        }))
        .expect("failed to deserialize");

        assert!(res.is_published());
        assert_eq!(res.error(), None);
        assert_eq!(
            res.did_document_metadata.and_then(|m| m.canonical_id).as_deref(),
            Some("did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg")
        );
    }

    #[test]
    fn unpublished_and_error() {
        let res: Resolution = serde_json::from_value(json!({
            "didDocumentMetadata": { "method": { "published": false } },
            "didResolutionMetadata": { "error": "notFound" }
        }))
        .expect("failed to deserialize");
        assert!(!res.is_published());
        assert_eq!(res.error(), Some("notFound"));
        assert!(!Resolution::default().is_published());
    }
}
