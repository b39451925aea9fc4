use did_core::error::Err;
use did_core::{tracerr, Jwk, Result};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use multibase::Base;

use crate::{AccountKey, JsonWebKey2020, JSON_WEB_KEY_2020};

/// Multicodec prefix for a compressed secp256k1 public key (`secp256k1-pub`, 0xe7).
pub const SECP256K1_PUB_CODEC: [u8; 2] = [0xe7, 0x01];

/// Length of a secp256k1 private scalar.
const SEED_LEN: usize = 32;

/// Derive the DID keypair for a Bitcoin account. The account's 32-byte private key is used
/// directly as the secp256k1 scalar, without hashing or further derivation, so the same account
/// always yields the same keypair.
///
/// # Errors
///
/// * `Err::InvalidSeedMaterial` - The account holds no private key, or it is not 32 bytes.
/// * `Err::KeyGenerationFailed` - The bytes are not a valid secp256k1 scalar (zero, or not less
///   than the curve order).
pub fn generate_keypair<A: AccountKey + ?Sized>(account: &A) -> Result<JsonWebKey2020> {
    let Some(seed) = account.private_key() else {
        tracerr!(Err::InvalidSeedMaterial, "Account has no private key");
    };
    // from_slice left-pads short input, so enforce the exact scalar length first
    if seed.len() != SEED_LEN {
        tracerr!(
            Err::InvalidSeedMaterial,
            "Account private key must be {SEED_LEN} bytes, got {}",
            seed.len()
        );
    }
    let secret_key = match SecretKey::from_slice(seed) {
        Ok(sk) => sk,
        Err(e) => tracerr!(Err::KeyGenerationFailed, "Account key is not a valid scalar: {e}"),
    };

    let private_key_jwk: Jwk = serde_json::from_str(&secret_key.to_jwk_string())?;
    let public_key = secret_key.public_key();
    let public_key_jwk: Jwk = serde_json::from_str(&public_key.to_jwk_string())?;

    let fp = fingerprint(&public_key);
    let controller = format!("did:key:{fp}");
    tracing::debug!(%controller, "derived account keypair");

    Ok(JsonWebKey2020 {
        id: format!("{controller}#{fp}"),
        type_: JSON_WEB_KEY_2020.to_string(),
        controller,
        public_key_jwk,
        private_key_jwk: Some(private_key_jwk),
    })
}

/// The `did:key` fingerprint of a secp256k1 public key: the multicodec-prefixed compressed point,
/// base58btc multibase encoded.
#[must_use]
pub fn fingerprint(public_key: &PublicKey) -> String {
    let point = public_key.to_encoded_point(true);
    let mut bytes = SECP256K1_PUB_CODEC.to_vec();
    bytes.extend_from_slice(point.as_bytes());
    multibase::encode(Base::Base58Btc, bytes)
}
