//! # Key Ring
//!
//! Deterministic derivation of a secp256k1 DID keypair from a Bitcoin account key, lossless
//! conversion of secp256k1 key material between JWK and hex encodings, and an in-memory key ring
//! for the update and recovery keys a sidetree DID commits to.
//!
//! Nothing in this crate persists or logs private key material.

mod convert;
mod keyring;
mod secp256k1;

use std::fmt::{self, Debug};

use did_core::Jwk;
use serde::{Deserialize, Serialize};

pub use crate::convert::{
    compressed_public_key_hex, hex_to_jwk, jwk_from_private_hex, jwk_from_public_hex, jwk_to_hex,
    private_key_hex, public_key_hex, KeyRole,
};
pub use crate::keyring::EphemeralKeyRing;
pub use crate::secp256k1::{fingerprint, generate_keypair, SECP256K1_PUB_CODEC};

/// Verification key type label for an exported keypair.
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

/// External account key material supplied by a wallet, such as a BIP32 node for a Bitcoin
/// account. Only the private key bytes are read, and only for the duration of a derivation call.
pub trait AccountKey {
    /// The account's raw private key, if the account holds one. Neutered (public-only) accounts
    /// return `None`.
    fn private_key(&self) -> Option<&[u8]>;
}

impl AccountKey for [u8] {
    fn private_key(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<const N: usize> AccountKey for [u8; N] {
    fn private_key(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl AccountKey for Vec<u8> {
    fn private_key(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<A: AccountKey> AccountKey for Option<A> {
    fn private_key(&self) -> Option<&[u8]> {
        self.as_ref().and_then(AccountKey::private_key)
    }
}

/// A secp256k1 keypair exported in the `JsonWebKey2020` verification key shape. The controller
/// and identifier are the `did:key` form of the public key.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JsonWebKey2020 {
    /// Key identifier: `{controller}#{fingerprint}`.
    pub id: String,
    /// Always "JsonWebKey2020".
    #[serde(rename = "type")]
    pub type_: String,
    /// `did:key` controller for the key.
    pub controller: String,
    /// Public half of the keypair.
    pub public_key_jwk: Jwk,
    /// Private half of the keypair. Only present when freshly derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_jwk: Option<Jwk>,
}

impl JsonWebKey2020 {
    /// The keypair with its private half removed.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            private_key_jwk: None,
            ..self.clone()
        }
    }
}

// Keep private key material out of logs and panics.
impl Debug for JsonWebKey2020 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWebKey2020")
            .field("id", &self.id)
            .field("type_", &self.type_)
            .field("controller", &self.controller)
            .field("public_key_jwk", &self.public_key_jwk)
            .field("private_key_jwk", &self.private_key_jwk.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
