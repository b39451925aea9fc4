//! Helper functions for canonicalizing, hashing and multi-hashing data, and generating random
//! strings.
//!
//! Sidetree identifiers and commitments are all built from the same primitive: canonical JSON
//! (see [JSON Canonicalization Scheme (JCS)](https://identity.foundation/JCS/)), hashed with
//! SHA-256, wrapped as a multihash and encoded as unpadded base64url.

use base64ct::{Base64UrlUnpadded, Encoding};
use multihash::Multihash;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Err;
use crate::{tracerr, Result};

/// Multicodec code for SHA2-256.
pub const SHA2_256: u64 = 0x12;

/// Serialize data to JCS (RFC 8785) canonical JSON bytes.
///
/// # Errors
///
/// * `SerializationError` if the data cannot be serialized.
pub fn canonicalize(data: &impl Serialize) -> Result<Vec<u8>> {
    match serde_json_canonicalizer::to_string(data) {
        Ok(json) => Ok(json.into_bytes()),
        Err(e) => tracerr!(Err::SerializationError, "Failed to canonicalize: {e}"),
    }
}

/// Transforms the provided data into a base64-encoded multihash. It creates canonical JSON,
/// multi-hashes it using SHA256, and then base64-encodes the result.
///
/// # Arguments
///
/// * `data` - The data to hash.
///
/// # Returns
///
/// A base64-encoded multi-hash of the data.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
/// * Multi-hash error if the data cannot be hashed.
pub fn hash_data(data: &impl Serialize) -> Result<String> {
    let buf = canonicalize(data)?;
    let multi = multi_hash(&buf)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Hash the public key by hashing the canoncial JSON representation and then multi-hashing the
/// hash.
///
/// # Arguments
///
/// * `data` - The public key data to hash.
///
/// # Returns
///
/// A base64-encoded multi-hash of the public key.
///
/// # Errors
///
/// * Serialization error if the public key cannot be serialized.
/// * Multi-hash error if the public key cannot be hashed.
pub fn hash_commitment(data: &impl Serialize) -> Result<String> {
    let buf = canonicalize(data)?;
    let hashed = hash_bytes(&buf);
    let multi = multi_hash(&hashed)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Hashes the provided data using SHA256.
fn hash_bytes(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Multi-hashes the provided data using SHA256.
fn multi_hash(data: &[u8]) -> Result<Vec<u8>> {
    let hashed = hash_bytes(data);
    let mhash = Multihash::<64>::wrap(SHA2_256, &hashed)?;
    Ok(mhash.to_bytes())
}

/// Check the provided string is a valid multi-hash.
///
/// # Errors
///
/// * `InvalidHash` - The hash is not a base64url-encoded SHA-256 multi-hash.
pub fn check(hash: &str) -> Result<()> {
    let Ok(decoded) = Base64UrlUnpadded::decode_vec(hash) else {
        tracerr!(Err::InvalidHash, "hash is not base64url encoded");
    };
    let Ok(wrapped) = Multihash::<64>::from_bytes(&decoded) else {
        tracerr!(Err::InvalidHash, "hash is not a multihash");
    };
    if wrapped.code() != SHA2_256 {
        tracerr!(Err::InvalidHash, "Invalid hash code: {}", wrapped.code());
    }
    if wrapped.digest().len() != 32 {
        tracerr!(Err::InvalidHash, "Invalid digest length: {}", wrapped.digest().len());
    }
    Ok(())
}

/// Random hex string generator
#[must_use]
pub fn rand_hex(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    let mut rng = StdRng::from_entropy();
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Jwk;

    #[test]
    fn multi_hash_ok() {
        let data = b"Hello, world!";

        let mhash = multi_hash(data).expect("failed to create multi-hash");
        let wrapped = Multihash::<64>::from_bytes(&mhash).expect("failed to wrap multi-hash");

        let mut sha = Sha256::new();
        sha.update(data);
        let hash = sha.finalize();

        assert_eq!(wrapped.digest(), &hash[..]);
    }

    #[test]
    fn hash_data_ok() {
        #[derive(Serialize)]
        struct Msg {
            msg: String,
        }
        let data = Msg {
            msg: "Hello, world!".to_string(),
        };

        let hash = hash_data(&data).expect("failed to create multi-hash");
        // 34 byte multihash -> 46 base64url chars, always starting "EiA"/"EiB"/"EiC"/"EiD"
        assert_eq!(hash.len(), 46);
        assert!(hash.starts_with("Ei"));
        check(&hash).expect("hash should check");
    }

    #[test]
    fn canonical_key_order() {
        let a = serde_json::json!({"b": 1, "a": {"d": 2, "c": 3}});
        let bytes = canonicalize(&a).expect("failed to canonicalize");
        assert_eq!(bytes, br#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn canonical_escapes_control_characters() {
        let a = serde_json::json!({"note": "line1\nline2\u{1}"});
        let bytes = canonicalize(&a).expect("failed to canonicalize");
        assert_eq!(bytes, br#"{"note":"line1\nline2\u0001"}"#);

        let parsed: serde_json::Value = serde_json::from_slice(&bytes).expect("should be JSON");
        assert_eq!(parsed, a);
    }

    #[test]
    fn hash_commitment_differs_from_hash_data() {
        let key = Jwk {
            kty: "EC".to_string(),
            crv: Some("secp256k1".to_string()),
            x: Some("G4TFVnsSZECZXT7VqroFZdceGDRgSBn_nBf16dXdB48".to_string()),
            y: Some("cL6vj1iLVBUH_tamQsWrQt_fgSCn9jneUSLUemmo6NE".to_string()),
            ..Default::default()
        };

        let commitment = hash_commitment(&key).expect("failed to hash commitment");
        let reveal = hash_data(&key).expect("failed to hash data");
        assert_ne!(commitment, reveal);
        check(&commitment).expect("commitment should be a multihash");
    }

    #[test]
    fn check_rejects_garbage() {
        let err = check("not-a-hash").expect_err("expected error");
        assert!(err.is(Err::InvalidHash));
    }

    #[test]
    fn rand_hex_len() {
        assert_eq!(rand_hex(16).len(), 32);
        assert_ne!(rand_hex(16), rand_hex(16));
    }
}
