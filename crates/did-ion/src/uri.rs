//! Short and long-form ION DID URIs.
//!
//! The short form `did:ion[:test]:<suffix>` names the DID by the hash of its suffix data and only
//! resolves once the create operation has been anchored. The long form appends the encoded initial
//! state, `did:ion[:test]:<suffix>:<state>`, so a resolver can reconstruct the document without
//! any network state.

use std::fmt::Display;
use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::hashing::{self, canonicalize, hash_data};
use did_core::{tracerr, Result};
use serde_json::Value;

use crate::config::Network;
use crate::operation::DocumentModel;

/// The short-form mainnet URI for a document model. Use [`IonDid::from_model`] or
/// `AnchorClient::did` for other networks.
///
/// # Errors
///
/// * `Err::MalformedModel` - The model fails consistency checks.
pub fn short_form_uri(model: &DocumentModel) -> Result<String> {
    Ok(IonDid::from_model(model, Network::Mainnet)?.short_form())
}

/// The long-form mainnet URI for a document model.
///
/// # Errors
///
/// * `Err::MalformedModel` - The model fails consistency checks.
pub fn long_form_uri(model: &DocumentModel) -> Result<String> {
    Ok(IonDid::from_model(model, Network::Mainnet)?.to_string())
}

/// A parsed ION DID, in short or long form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IonDid {
    network: Network,
    suffix: String,
    initial_state: Option<String>,
}

impl IonDid {
    /// The long-form DID for a document model on the given network.
    ///
    /// # Errors
    ///
    /// * `Err::MalformedModel` - The model fails consistency checks.
    pub fn from_model(model: &DocumentModel, network: Network) -> Result<Self> {
        let state = model.initial_state()?;
        let suffix = hash_data(&state.suffix_data)?;
        let encoded = Base64UrlUnpadded::encode_string(&canonicalize(&state)?);

        Ok(Self {
            network,
            suffix,
            initial_state: Some(encoded),
        })
    }

    /// The network the DID is anchored on.
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    /// The unique suffix: a base64url SHA-256 multihash of the suffix data.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the DID carries its initial state.
    #[must_use]
    pub const fn is_long_form(&self) -> bool {
        self.initial_state.is_some()
    }

    /// The DID without its initial state.
    #[must_use]
    pub fn short_form(&self) -> String {
        format!("{}:{}", self.network.did_prefix(), self.suffix)
    }

    /// The decoded initial state of a long-form DID.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidFormat` - The embedded state is not base64url JSON.
    pub fn initial_state(&self) -> Result<Option<Value>> {
        self.initial_state.as_deref().map(decode_state).transpose()
    }
}

impl Display for IonDid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.network.did_prefix(), self.suffix)?;
        if let Some(state) = &self.initial_state {
            write!(f, ":{state}")?;
        }
        Ok(())
    }
}

impl FromStr for IonDid {
    type Err = did_core::Error;

    /// Parse `did:ion[:test]:<suffix>[:<state>]`. For a long-form DID the embedded suffix data
    /// must hash to the suffix and the embedded delta must hash to the suffix data's delta hash.
    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix("did:ion:") else {
            tracerr!(Err::InvalidFormat, "Not an ION DID: {s}");
        };
        let mut parts: Vec<&str> = rest.split(':').collect();

        let network = if parts.first() == Some(&"test") {
            parts.remove(0);
            Network::Testnet
        } else {
            Network::Mainnet
        };
        let (suffix, initial_state) = match parts.as_slice() {
            [suffix] => (*suffix, None),
            [suffix, state] => (*suffix, Some(*state)),
            _ => tracerr!(Err::InvalidFormat, "Unexpected ION DID segments: {s}"),
        };
        hashing::check(suffix)?;

        if let Some(state) = initial_state {
            verify_state(suffix, &decode_state(state)?)?;
        }

        Ok(Self {
            network,
            suffix: suffix.to_string(),
            initial_state: initial_state.map(ToString::to_string),
        })
    }
}

fn decode_state(state: &str) -> Result<Value> {
    let Ok(bytes) = Base64UrlUnpadded::decode_vec(state) else {
        tracerr!(Err::InvalidFormat, "Long-form state is not base64url");
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => tracerr!(Err::InvalidFormat, "Long-form state is not JSON: {e}"),
    }
}

// Hashes are taken over the decoded JSON so documents with content this crate does not model
// still verify.
fn verify_state(suffix: &str, state: &Value) -> Result<()> {
    let (Some(suffix_data), Some(delta)) = (state.get("suffixData"), state.get("delta")) else {
        tracerr!(Err::InvalidFormat, "Long-form state needs suffixData and delta");
    };
    if hash_data(suffix_data)? != suffix {
        tracerr!(Err::InvalidFormat, "Long-form suffix data does not match the DID suffix");
    }
    if suffix_data.get("deltaHash").and_then(Value::as_str) != Some(hash_data(delta)?.as_str()) {
        tracerr!(Err::InvalidFormat, "Long-form delta does not match the delta hash");
    }
    Ok(())
}
