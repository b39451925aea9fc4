//! DID Document and its component data structures, as returned by a resolver.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod service;

use crate::core::{Kind, OneMany};
use crate::error::Err;
use crate::keys::Jwk;
use crate::{tracerr, Result};

pub use self::service::{check_services, Service};

/// The default context for a DID document. <https://www.w3.org/TR/did-core/#context>
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A DID is associated with a DID document that can be serialized into a representation of the
/// DID. <https://www.w3.org/TR/did-core/>
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DidDocument {
    /// The JSON-LD Context is either a string or a list containing any combination of strings
    /// and/or ordered maps.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<OneMany<Kind<Map<String, Value>>>>,

    /// The DID document's unique identifier, "did:{method}:{method-specific-id}".
    pub id: String,

    /// A DID controller is an entity that is authorized to make changes to a DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneMany<String>>,

    /// Verification methods (public keys) associated with the DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// How the DID subject is authenticated. Entries are references to a verification method by
    /// ID or embedded verification methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// How the DID subject is expected to express claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// How an entity can generate encryption material to transmit confidential messages to the
    /// DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,

    /// How the DID subject can invoke a cryptographic capability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// How the DID subject can delegate a cryptographic capability to another party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// Services advertised by the DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,
}

impl DidDocument {
    /// Get the verification methods related to the document by purpose.
    const fn relationship(&self, purpose: KeyPurpose) -> Option<&Vec<Kind<VerificationMethod>>> {
        match purpose {
            KeyPurpose::Authentication => self.authentication.as_ref(),
            KeyPurpose::AssertionMethod => self.assertion_method.as_ref(),
            KeyPurpose::KeyAgreement => self.key_agreement.as_ref(),
            KeyPurpose::CapabilityInvocation => self.capability_invocation.as_ref(),
            KeyPurpose::CapabilityDelegation => self.capability_delegation.as_ref(),
        }
    }

    // Look up a verification method by reference. References may be absolute DID URLs or
    // fragments relative to the document ("#auth-key").
    fn vm_from_ref(&self, id: &str) -> Option<&VerificationMethod> {
        let fragment = id.rsplit_once('#').map_or(id, |(_, f)| f);
        self.verification_method.as_ref()?.iter().find(|vm| {
            vm.id == id || vm.id.rsplit_once('#').is_some_and(|(_, f)| f == fragment)
        })
    }

    /// Get a key from the document by purpose.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - No verification method is related to the document for the purpose.
    pub fn get_key(&self, purpose: KeyPurpose) -> Result<VerificationMethod> {
        let found = self.relationship(purpose).and_then(|refs| {
            refs.iter().find_map(|r| match r {
                Kind::String(id) => self.vm_from_ref(id).cloned(),
                Kind::Object(vm) => Some(vm.clone()),
            })
        });
        match found {
            Some(vm) => Ok(vm),
            None => tracerr!(Err::InvalidKey, "No key found for purpose {purpose}"),
        }
    }
}

/// A DID document can express verification methods, such as cryptographic public keys, which can
/// be used to authenticate or authorize interactions with the DID subject or associated parties.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationMethod {
    /// Identifier for the verification method. Relative DID URLs are allowed.
    pub id: String,
    /// The type of verification method.
    #[serde(rename = "type")]
    pub type_: String,
    /// Identifier for the controller of the verification method. A DID.
    pub controller: String,
    /// The public key material of the verification method, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    /// The public key material of the verification method, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
}

/// Key purpose type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPurpose {
    /// How the DID subject is expected to be authenticated.
    #[default]
    Authentication,
    /// How the DID subject is expected to express claims.
    AssertionMethod,
    /// Invoke a cryptographic capability.
    CapabilityInvocation,
    /// Delegate a cryptographic capability to another party.
    CapabilityDelegation,
    /// Generate encryption material for confidential messaging.
    KeyAgreement,
}

impl Display for KeyPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::AssertionMethod => write!(f, "assertionMethod"),
            Self::CapabilityInvocation => write!(f, "capabilityInvocation"),
            Self::CapabilityDelegation => write!(f, "capabilityDelegation"),
            Self::KeyAgreement => write!(f, "keyAgreement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // Document shape as returned by an ION node.
    fn ion_doc() -> Value {
        json!({
            "@context": [
                "https://www.w3.org/ns/did/v1",
                { "@base": "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg" }
            ],
            "id": "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg",
            "verificationMethod": [{
                "id": "#auth-key",
                "controller": "",
                "type": "EcdsaSecp256k1VerificationKey2019",
                "publicKeyJwk": {
                    "kty": "EC",
                    "crv": "secp256k1",
                    "x": "G4TFVnsSZECZXT7VqroFZdceGDRgSBn_nBf16dXdB48",
                    "y": "cL6vj1iLVBUH_tamQsWrQt_fgSCn9jneUSLUemmo6NE"
                }
            }],
            "authentication": ["#auth-key"],
            "service": [{
                "id": "#hub",
                "type": "IdentityHub",
                "serviceEndpoint": { "instances": ["https://hub.example.com/"] }
            }]
        })
    }

    #[test]
    fn default_doc_is_empty() {
        let doc = DidDocument::default();
        assert_eq!(doc.id, "");
        assert!(doc.context.is_none());
        assert!(doc.verification_method.is_none());
        assert!(doc.authentication.is_none());
        assert!(doc.service.is_none());
        assert_eq!(serde_json::to_value(&doc).expect("serialize"), json!({"id": ""}));
    }

    #[test]
    fn deserialize_ion_doc() {
        let doc: DidDocument = serde_json::from_value(ion_doc()).expect("failed to deserialize");
        assert_eq!(doc.id, "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg");
        assert_eq!(doc.context.expect("context").to_vec().len(), 2);
        assert!(doc.service.is_some_and(|s| s.len() == 1));
    }

    #[test]
    fn get_key_by_reference() {
        let doc: DidDocument = serde_json::from_value(ion_doc()).expect("failed to deserialize");
        let vm = doc.get_key(KeyPurpose::Authentication).expect("auth key");
        assert_eq!(vm.id, "#auth-key");
        assert_eq!(vm.type_, "EcdsaSecp256k1VerificationKey2019");

        let err = doc.get_key(KeyPurpose::KeyAgreement).expect_err("expected error");
        assert!(err.is(Err::InvalidKey));
    }

    #[test]
    fn get_key_by_absolute_reference() {
        let mut doc: DidDocument =
            serde_json::from_value(ion_doc()).expect("failed to deserialize");
        doc.authentication = Some(vec![Kind::String(format!("{}#auth-key", doc.id))]);
        let vm = doc.get_key(KeyPurpose::Authentication).expect("auth key");
        assert_eq!(vm.id, "#auth-key");
    }

    #[test]
    fn get_embedded_key() {
        let doc = DidDocument {
            id: "did:example:123".to_string(),
            assertion_method: Some(vec![Kind::Object(VerificationMethod {
                id: "did:example:123#key-1".to_string(),
                type_: "EcdsaSecp256k1VerificationKey2019".to_string(),
                ..Default::default()
            })]),
            ..Default::default()
        };
        let vm = doc.get_key(KeyPurpose::AssertionMethod).expect("assertion key");
        assert_eq!(vm.id, "did:example:123#key-1");
    }
}
