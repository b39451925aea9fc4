//! Cryptographic key representation and the key ring used to source sidetree update and recovery
//! keys.

use std::fmt::Display;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

pub mod keyring;

use crate::error::Err;
use crate::{tracerr, Result};

/// Curve name used in JWKs for secp256k1 (RFC 8812).
pub const SECP256K1_CURVE: &str = "secp256k1";

/// Key operation type. The intent of the key for use in updating a DID document or recovering one.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum KeyOperation {
    /// Update a DID document.
    Update,
    /// Recover a DID document.
    Recover,
}

impl Display for KeyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Recover => write!(f, "recover"),
        }
    }
}

/// Simplified JSON Web Key (JWK) key structure.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Jwk {
    /// Key type.
    pub kty: String,
    /// Cryptographic curve type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// X coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Secret key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl Jwk {
    /// A copy of the key with the private component removed.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self { d: None, ..self.clone() }
    }

    /// Whether the key carries a private component.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Attempt to match the public key parameters to one of the supported algorithm types.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - The key structure cannot be interpreted to a supported format.
    pub fn infer_algorithm(&self) -> Result<Algorithm> {
        match (self.kty.as_str(), self.crv.as_deref()) {
            ("EC", Some(SECP256K1_CURVE)) => Ok(Algorithm::Secp256k1),
            _ => tracerr!(Err::InvalidKey, "Unknown key type and curve combination"),
        }
    }

    /// Check that the structure of the public key is valid for secp256k1: both coordinates
    /// present and each decoding to 32 bytes.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - The key type or curve is not secp256k1, or a coordinate is missing,
    ///   badly encoded or the wrong length.
    pub fn check(&self) -> Result<Algorithm> {
        let scheme = self.infer_algorithm()?;
        decode_component("x", self.x.as_deref(), Err::InvalidKey)?;
        decode_component("y", self.y.as_deref(), Err::InvalidKey)?;
        Ok(scheme)
    }
}

/// Decode a base64url JWK component and verify it is exactly 32 bytes long. Errors are raised with
/// the supplied kind so callers can report in their own vocabulary.
///
/// # Errors
///
/// * `kind` - The component is missing, badly encoded or not 32 bytes.
pub fn decode_component(name: &str, value: Option<&str>, kind: Err) -> Result<[u8; 32]> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        tracerr!(kind, "Missing {name} component");
    };
    let raw = match Base64UrlUnpadded::decode_vec(value) {
        Ok(raw) => raw,
        Err(e) => tracerr!(kind, "Invalid {name} component encoding: {e}"),
    };
    match <[u8; 32]>::try_from(raw.as_slice()) {
        Ok(bytes) => Ok(bytes),
        Err(_) => tracerr!(
            kind,
            "Invalid {name} component length. Expected 32 bytes, got {}",
            raw.len()
        ),
    }
}

/// Key algorithms supported for sidetree keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// ECDSA using the secp256k1 curve.
    Secp256k1,
}

impl Algorithm {
    /// Get the verification method type for the key signature type.
    #[must_use]
    pub const fn cryptosuite(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "EcdsaSecp256k1VerificationKey2019",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_key() -> Jwk {
        Jwk {
            kty: "EC".to_string(),
            crv: Some("secp256k1".to_string()),
            x: Some("G4TFVnsSZECZXT7VqroFZdceGDRgSBn_nBf16dXdB48".to_string()),
            y: Some("cL6vj1iLVBUH_tamQsWrQt_fgSCn9jneUSLUemmo6NE".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn check_ok() {
        let alg = public_key().check().expect("key should be valid");
        assert_eq!(alg, Algorithm::Secp256k1);
        assert_eq!(alg.cryptosuite(), "EcdsaSecp256k1VerificationKey2019");
    }

    #[test]
    fn check_missing_y() {
        let jwk = Jwk { y: None, ..public_key() };
        let err = jwk.check().expect_err("expected error");
        assert!(err.is(Err::InvalidKey));
    }

    #[test]
    fn check_wrong_curve() {
        let jwk = Jwk { crv: Some("P-256".to_string()), ..public_key() };
        assert!(jwk.check().expect_err("expected error").is(Err::InvalidKey));
    }

    #[test]
    fn to_public_strips_d() {
        let jwk = Jwk {
            d: Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE".to_string()),
            ..public_key()
        };
        assert!(jwk.is_private());
        let public = jwk.to_public();
        assert!(!public.is_private());
        assert_eq!(public, public_key());
    }

    #[test]
    fn serialize_skips_empty() {
        let json = serde_json::to_value(public_key()).expect("failed to serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "kty": "EC",
                "crv": "secp256k1",
                "x": "G4TFVnsSZECZXT7VqroFZdceGDRgSBn_nBf16dXdB48",
                "y": "cL6vj1iLVBUH_tamQsWrQt_fgSCn9jneUSLUemmo6NE"
            })
        );
    }
}
