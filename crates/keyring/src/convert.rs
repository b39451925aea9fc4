//! Conversion of secp256k1 key material between JWK and hex encodings.
//!
//! Hex output is lowercase with no `0x` prefix: 64 characters for a private scalar, 130 for an
//! uncompressed public point and 66 for a compressed one. The JWK curve identifier is not trusted
//! from input. It is overwritten with `secp256k1` and the key material is then checked against
//! the curve.

use did_core::error::Err;
use did_core::keys::decode_component;
use did_core::{tracerr, Jwk, Result, SECP256K1_CURVE};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};

/// Which half of a keypair a conversion reads or produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyRole {
    /// The private scalar, `d`.
    #[default]
    Private,
    /// The uncompressed public point, `x` and `y`.
    Public,
}

/// Encode the key material for `role` as lowercase hex.
///
/// # Errors
///
/// * `Err::UnsupportedCurve` - The key type is not `EC`, or its components are not 32-byte
///   secp256k1 values.
/// * `Err::InvalidKey` - The component needed for `role` is absent.
pub fn jwk_to_hex(jwk: &Jwk, role: KeyRole) -> Result<String> {
    let jwk = normalize(jwk)?;
    match role {
        KeyRole::Private => Ok(hex::encode(secret_key(&jwk)?.to_bytes())),
        KeyRole::Public => Ok(hex::encode(public_key(&jwk)?.to_encoded_point(false).as_bytes())),
    }
}

/// Rebuild a secp256k1 JWK from hex key material. A private scalar produces a JWK carrying `d`
/// together with the derived `x` and `y`. A public point may be compressed or uncompressed.
///
/// # Errors
///
/// * `Err::InvalidFormat` - The input is not hex.
/// * `Err::UnsupportedCurve` - The decoded bytes have the wrong length for `role`, or are not a
///   valid secp256k1 scalar or point.
pub fn hex_to_jwk(hex: &str, role: KeyRole) -> Result<Jwk> {
    let bytes = match hex::decode(hex) {
        Ok(bytes) => bytes,
        Err(e) => tracerr!(Err::InvalidFormat, "Key material is not hex: {e}"),
    };

    let jwk = match role {
        KeyRole::Private => {
            if bytes.len() != 32 {
                tracerr!(Err::UnsupportedCurve, "Expected 32-byte scalar, got {}", bytes.len());
            }
            let sk = match SecretKey::from_slice(&bytes) {
                Ok(sk) => sk,
                Err(e) => tracerr!(Err::UnsupportedCurve, "Not a secp256k1 scalar: {e}"),
            };
            sk.to_jwk_string().to_string()
        }
        KeyRole::Public => {
            if bytes.len() != 33 && bytes.len() != 65 {
                tracerr!(
                    Err::UnsupportedCurve,
                    "Expected 33 or 65-byte point, got {}",
                    bytes.len()
                );
            }
            match PublicKey::from_sec1_bytes(&bytes) {
                Ok(pk) => pk.to_jwk_string(),
                Err(e) => tracerr!(Err::UnsupportedCurve, "Not a secp256k1 point: {e}"),
            }
        }
    };
    Ok(serde_json::from_str(&jwk)?)
}

/// The private scalar of a JWK as 64 hex characters.
///
/// # Errors
///
/// See [`jwk_to_hex`].
pub fn private_key_hex(jwk: &Jwk) -> Result<String> {
    jwk_to_hex(jwk, KeyRole::Private)
}

/// The public point of a JWK as 130 hex characters (`04 || x || y`).
///
/// # Errors
///
/// See [`jwk_to_hex`].
pub fn public_key_hex(jwk: &Jwk) -> Result<String> {
    jwk_to_hex(jwk, KeyRole::Public)
}

/// The public point of a JWK in compressed SEC1 form, 66 hex characters.
///
/// # Errors
///
/// See [`jwk_to_hex`].
pub fn compressed_public_key_hex(jwk: &Jwk) -> Result<String> {
    let jwk = normalize(jwk)?;
    Ok(hex::encode(public_key(&jwk)?.to_encoded_point(true).as_bytes()))
}

/// Rebuild a private JWK from a 64-character hex scalar.
///
/// # Errors
///
/// See [`hex_to_jwk`].
pub fn jwk_from_private_hex(hex: &str) -> Result<Jwk> {
    hex_to_jwk(hex, KeyRole::Private)
}

/// Rebuild a public JWK from a 66 or 130-character hex point.
///
/// # Errors
///
/// See [`hex_to_jwk`].
pub fn jwk_from_public_hex(hex: &str) -> Result<Jwk> {
    hex_to_jwk(hex, KeyRole::Public)
}

// Force the curve identifier to secp256k1. The key type is not corrected.
fn normalize(jwk: &Jwk) -> Result<Jwk> {
    if jwk.kty != "EC" {
        tracerr!(Err::UnsupportedCurve, "Key type {} is not EC", jwk.kty);
    }
    if let Some(crv) = jwk.crv.as_deref().filter(|crv| *crv != SECP256K1_CURVE) {
        tracing::debug!(crv, "replacing JWK curve with secp256k1");
    }
    Ok(Jwk {
        crv: Some(SECP256K1_CURVE.to_string()),
        ..jwk.clone()
    })
}

fn secret_key(jwk: &Jwk) -> Result<SecretKey> {
    if jwk.d.is_none() {
        tracerr!(Err::InvalidKey, "JWK has no private component");
    }
    let d = decode_component("d", jwk.d.as_deref(), Err::UnsupportedCurve)?;
    let sk = match SecretKey::from_slice(&d) {
        Ok(sk) => sk,
        Err(e) => tracerr!(Err::UnsupportedCurve, "d is not a secp256k1 scalar: {e}"),
    };

    // any coordinates carried alongside d must belong to it
    if (jwk.x.is_some() || jwk.y.is_some()) && public_key(jwk)? != sk.public_key() {
        tracerr!(Err::UnsupportedCurve, "Public coordinates do not match d");
    }
    Ok(sk)
}

fn public_key(jwk: &Jwk) -> Result<PublicKey> {
    if jwk.x.is_none() && jwk.y.is_none() {
        if jwk.d.is_none() {
            tracerr!(Err::InvalidKey, "JWK has no key material");
        }
        return Ok(secret_key(jwk)?.public_key());
    }

    let x = decode_component("x", jwk.x.as_deref(), Err::UnsupportedCurve)?;
    let y = decode_component("y", jwk.y.as_deref(), Err::UnsupportedCurve)?;
    let sec1 = [&[0x04][..], &x, &y].concat();
    match PublicKey::from_sec1_bytes(&sec1) {
        Ok(pk) => Ok(pk),
        Err(e) => tracerr!(Err::UnsupportedCurve, "Coordinates are not a secp256k1 point: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_keypair;

    const X_HEX: &str = "1b84c5567b126440995d3ed5aaba0565d71e1834604819ff9c17f5e9d5dd078f";
    const Y_HEX: &str = "70beaf8f588b541507fed6a642c5ab42dfdf8120a7f639de5122d47a69a8e8d1";

    fn private_jwk() -> Jwk {
        generate_keypair(&[1u8; 32]).expect("failed to generate").private_key_jwk.expect("d")
    }

    #[test]
    fn private_to_hex() {
        let hex = private_key_hex(&private_jwk()).expect("failed to convert");
        assert_eq!(hex, "01".repeat(32));
    }

    #[test]
    fn public_to_hex() {
        let public = private_jwk().to_public();
        let hex = public_key_hex(&public).expect("failed to convert");
        assert_eq!(hex, format!("04{X_HEX}{Y_HEX}"));
        assert_eq!(hex.len(), 130);

        let compressed = compressed_public_key_hex(&public).expect("failed to convert");
        assert_eq!(compressed, format!("03{X_HEX}"));
    }

    #[test]
    fn public_hex_from_private_only() {
        let jwk = Jwk {
            x: None,
            y: None,
            ..private_jwk()
        };
        let hex = jwk_to_hex(&jwk, KeyRole::Public).expect("failed to convert");
        assert_eq!(hex, format!("04{X_HEX}{Y_HEX}"));
    }

    #[test]
    fn round_trip_both_roles() {
        for seed in [[1u8; 32], [2u8; 32], [0x7f; 32]] {
            let jwk = generate_keypair(&seed).expect("failed to generate").private_key_jwk;
            let jwk = jwk.expect("d");

            let d = private_key_hex(&jwk).expect("failed to convert");
            assert_eq!(d, hex::encode(seed));
            assert_eq!(jwk_from_private_hex(&d).expect("failed to rebuild"), jwk);

            let public = jwk.to_public();
            let point = public_key_hex(&public).expect("failed to convert");
            assert_eq!(jwk_from_public_hex(&point).expect("failed to rebuild"), public);

            let compressed = compressed_public_key_hex(&public).expect("failed to convert");
            assert_eq!(jwk_from_public_hex(&compressed).expect("failed to rebuild"), public);
        }
    }

    #[test]
    fn curve_is_corrected() {
        let jwk = Jwk {
            crv: Some("P-256".to_string()),
            ..private_jwk()
        };
        assert_eq!(private_key_hex(&jwk).expect("failed to convert"), "01".repeat(32));

        let jwk = Jwk { crv: None, ..private_jwk() };
        assert!(public_key_hex(&jwk).is_ok());
    }

    #[test]
    fn mismatched_coordinate_length() {
        // a P-384 key: 48-byte scalar and coordinates
        let jwk = Jwk {
            kty: "EC".to_string(),
            crv: Some("P-384".to_string()),
            x: Some("iA7lWQLzVrKGEFjfGMfMHfTEZ2KnLiKU7JuNT3E7ygsfE7ygsfE7ygsfE7ygsfE7".to_string()),
            y: Some("ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsfE7ygsf".to_string()),
            d: Some("Cx8TuwmT0fSIIcmyMlzEL8ApEpGTUvTmMjH5dY6ZnBWv3dTkVOvEyPsQEM09DfZs".to_string()),
        };
        let err = private_key_hex(&jwk).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));
        let err = public_key_hex(&jwk).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));
    }

    #[test]
    fn off_curve_point() {
        let jwk = Jwk {
            y: Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE".to_string()),
            ..private_jwk().to_public()
        };
        let err = public_key_hex(&jwk).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));
    }

    #[test]
    fn d_not_matching_coordinates() {
        let other = generate_keypair(&[2u8; 32]).expect("failed to generate").public_key_jwk;
        let jwk = Jwk {
            x: other.x,
            y: other.y,
            ..private_jwk()
        };
        let err = private_key_hex(&jwk).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));
    }

    #[test]
    fn wrong_key_type() {
        let jwk = Jwk {
            kty: "OKP".to_string(),
            ..private_jwk()
        };
        assert!(private_key_hex(&jwk).expect_err("expected error").is(Err::UnsupportedCurve));
    }

    #[test]
    fn missing_components() {
        let err = private_key_hex(&private_jwk().to_public()).expect_err("expected error");
        assert!(err.is(Err::InvalidKey));

        let empty = Jwk {
            kty: "EC".to_string(),
            ..Jwk::default()
        };
        assert!(public_key_hex(&empty).expect_err("expected error").is(Err::InvalidKey));
    }

    #[test]
    fn bad_hex_input() {
        let err = jwk_from_private_hex("0xzz").expect_err("expected error");
        assert!(err.is(Err::InvalidFormat));

        let err = jwk_from_private_hex(&"01".repeat(31)).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));

        let err = jwk_from_public_hex(&"01".repeat(64)).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));

        // correct length but not on the curve
        let off_curve = format!("04{}", "01".repeat(64));
        let err = jwk_from_public_hex(&off_curve).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));

        let err = jwk_from_private_hex(&"00".repeat(32)).expect_err("expected error");
        assert!(err.is(Err::UnsupportedCurve));
    }
}
