//! Sidetree create operation: the document model for a new ION DID and the request structures
//! derived from it.

use did_core::error::Err;
use did_core::hashing::{canonicalize, hash_commitment, hash_data};
use did_core::{
    check_services, tracerr, Algorithm, Jwk, KeyOperation, KeyPurpose, KeyRing, Result, Service,
};
use serde::{Deserialize, Serialize};

/// Identifier of the single authentication key in a document.
pub const AUTH_KEY_ID: &str = "auth-key";

/// Largest canonical delta, in bytes, an ION node accepts.
pub const MAX_DELTA_SIZE: usize = 1000;

/// Sidetree operation types. Only DID creation is supported.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Create a new DID.
    #[default]
    Create,
}

/// Patch actions applicable to a DID document.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PatchAction {
    /// Replace the whole document with the patch content.
    #[default]
    Replace,
}

/// A public key as registered in an ION document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicKeyEntry {
    /// Key identifier, unique within the document.
    pub id: String,
    /// Verification method type.
    #[serde(rename = "type")]
    pub type_: String,
    /// Public key material.
    pub public_key_jwk: Jwk,
    /// Verification relationships the key is used for.
    pub purposes: Vec<KeyPurpose>,
}

/// Public keys and services making up the content of an ION document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentContent {
    /// Public keys in the document.
    pub public_keys: Vec<PublicKeyEntry>,
    /// Services in the document, omitted when there are none.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

/// A single change applied to a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Patch {
    /// Patch action.
    pub action: PatchAction,
    /// Document content the action applies.
    pub document: DocumentContent,
}

/// Document changes together with the commitment to the next update key.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Delta {
    /// Document patches.
    pub patches: Vec<Patch>,
    /// Commitment to the next update key.
    pub update_commitment: String,
}

/// Suffix data from which the DID's unique suffix is computed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SuffixData {
    /// Hash of the canonical delta.
    pub delta_hash: String,
    /// Commitment to the next recovery key.
    pub recovery_commitment: String,
}

/// Initial state embedded in a long-form DID.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialState {
    /// Suffix data.
    pub suffix_data: SuffixData,
    /// Delta.
    pub delta: Delta,
}

/// Body of a create operation submitted to an ION node.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequest {
    /// Always `create`.
    #[serde(rename = "type")]
    pub type_: OperationType,
    /// Suffix data.
    pub suffix_data: SuffixData,
    /// Delta.
    pub delta: Delta,
}

/// A not-yet-anchored ION DID: one authentication key, zero or more services and the public
/// update and recovery keys the DID commits to. Private keys are never held.
///
/// The model is immutable once built and every URI and request derived from it is a pure function
/// of its content.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    content: DocumentContent,
    update_key: Jwk,
    recovery_key: Jwk,
}

/// Assemble the document model for a new DID from the authentication public key and any services.
/// Fresh update and recovery keys are drawn from the key ring and committed once the model is
/// complete.
///
/// # Errors
///
/// * `Err::InvalidServiceEndpoint` - A service is missing its identifier, type or endpoint, or
///   breaks a sidetree size constraint.
/// * `Err::MalformedModel` - The authentication key or a key ring key is not a secp256k1 public
///   key, or the document content is too large.
/// * Key ring errors are passed through.
pub fn build(
    public_jwk: &Jwk, services: &[Service], keyring: &impl KeyRing,
) -> Result<DocumentModel> {
    check_services(services)?;

    let update_key = keyring.next_key(KeyOperation::Update)?;
    let recovery_key = keyring.next_key(KeyOperation::Recover)?;
    let model = DocumentModel::new(public_jwk, services, &update_key, &recovery_key)?;

    keyring.commit()?;
    Ok(model)
}

impl DocumentModel {
    /// Assemble a document model from explicit keys. Private components of any key are dropped.
    ///
    /// # Errors
    ///
    /// As for [`build`], excluding key ring errors.
    pub fn new(
        public_jwk: &Jwk, services: &[Service], update_key: &Jwk, recovery_key: &Jwk,
    ) -> Result<Self> {
        check_services(services)?;

        let model = Self {
            content: DocumentContent {
                public_keys: vec![PublicKeyEntry {
                    id: AUTH_KEY_ID.to_string(),
                    type_: Algorithm::Secp256k1.cryptosuite().to_string(),
                    public_key_jwk: public_jwk.to_public(),
                    purposes: vec![KeyPurpose::Authentication],
                }],
                services: services.to_vec(),
            },
            update_key: update_key.to_public(),
            recovery_key: recovery_key.to_public(),
        };
        model.check()?;
        Ok(model)
    }

    /// The authentication public key.
    #[must_use]
    pub fn public_key(&self) -> Option<&Jwk> {
        self.content.public_keys.first().map(|k| &k.public_key_jwk)
    }

    /// Services in the document, in the order supplied.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.content.services
    }

    /// Document content as it is registered with the network.
    #[must_use]
    pub const fn content(&self) -> &DocumentContent {
        &self.content
    }

    /// Public key committed to for the first update.
    #[must_use]
    pub const fn update_key(&self) -> &Jwk {
        &self.update_key
    }

    /// Public key committed to for recovery.
    #[must_use]
    pub const fn recovery_key(&self) -> &Jwk {
        &self.recovery_key
    }

    /// Verify the model has the fixed ION create shape: exactly one secp256k1 authentication key
    /// with the "auth-key" identifier, valid services, public update and recovery keys and a
    /// delta within the size limit.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - Any check fails.
    pub fn check(&self) -> Result<()> {
        let [entry] = self.content.public_keys.as_slice() else {
            tracerr!(
                Err::MalformedModel,
                "Expected one public key, found {}",
                self.content.public_keys.len()
            );
        };
        if entry.id != AUTH_KEY_ID || entry.purposes != [KeyPurpose::Authentication] {
            tracerr!(Err::MalformedModel, "Unexpected public key entry: {}", entry.id);
        }

        for (name, key) in [
            ("authentication", &entry.public_key_jwk),
            ("update", &self.update_key),
            ("recovery", &self.recovery_key),
        ] {
            if key.is_private() {
                tracerr!(Err::MalformedModel, "The {name} key carries a private component");
            }
            if let Err(e) = key.check() {
                tracerr!(Err::MalformedModel, "Invalid {name} key: {e}");
            }
        }
        if entry.type_ != Algorithm::Secp256k1.cryptosuite() {
            tracerr!(Err::MalformedModel, "Unexpected key type: {}", entry.type_);
        }
        if let Err(e) = check_services(&self.content.services) {
            tracerr!(Err::MalformedModel, "Invalid services: {e}");
        }

        let size = canonicalize(&self.delta_unchecked()?)?.len();
        if size > MAX_DELTA_SIZE {
            tracerr!(Err::MalformedModel, "Delta longer than {MAX_DELTA_SIZE} bytes: {size}");
        }
        Ok(())
    }

    /// The delta replacing an empty document with the model's content.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails [`DocumentModel::check`].
    pub fn delta(&self) -> Result<Delta> {
        self.check()?;
        self.delta_unchecked()
    }

    /// The suffix data for the model.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails [`DocumentModel::check`].
    pub fn suffix_data(&self) -> Result<SuffixData> {
        Ok(self.initial_state()?.suffix_data)
    }

    /// Suffix data and delta together, as embedded in a long-form DID.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails [`DocumentModel::check`].
    pub fn initial_state(&self) -> Result<InitialState> {
        let delta = self.delta()?;
        let suffix_data = SuffixData {
            delta_hash: hash_data(&delta)?,
            recovery_commitment: hash_commitment(&self.recovery_key)?,
        };
        Ok(InitialState { suffix_data, delta })
    }

    /// The create request submitted to an ION node to anchor the model.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails [`DocumentModel::check`].
    pub fn create_request(&self) -> Result<CreateRequest> {
        let InitialState { suffix_data, delta } = self.initial_state()?;
        Ok(CreateRequest {
            type_: OperationType::Create,
            suffix_data,
            delta,
        })
    }

    fn delta_unchecked(&self) -> Result<Delta> {
        Ok(Delta {
            patches: vec![Patch {
                action: PatchAction::Replace,
                document: self.content.clone(),
            }],
            update_commitment: hash_commitment(&self.update_key)?,
        })
    }
}
