use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use did_core::error::Err;
use did_core::{tracerr, Jwk, KeyOperation, KeyRing, Result};
use k256::SecretKey;
use rand::rngs::OsRng;

/// Key ring holding freshly generated secp256k1 update and recovery keys in memory. Keys
/// disappear when the ring is dropped, so callers that need to update or recover a DID later must
/// export the private halves with [`EphemeralKeyRing::private_key`] and store them.
#[derive(Debug, Default)]
pub struct EphemeralKeyRing {
    current_keys: Mutex<HashMap<KeyOperation, SecretKey>>,
    next_keys: Mutex<HashMap<KeyOperation, SecretKey>>,
}

impl EphemeralKeyRing {
    /// Create an empty key ring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The private JWK of the active key for an operation.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - No key has been committed for the operation.
    pub fn private_key(&self, op: KeyOperation) -> Result<Jwk> {
        let current_keys = self.current_keys.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sk) = current_keys.get(&op) else {
            tracerr!(Err::InvalidKey, "No active {op} key");
        };
        Ok(serde_json::from_str(&sk.to_jwk_string())?)
    }
}

impl KeyRing for EphemeralKeyRing {
    fn active_key(&self, op: KeyOperation) -> Result<Jwk> {
        let current_keys = self.current_keys.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sk) = current_keys.get(&op) else {
            tracerr!(Err::InvalidKey, "No active {op} key");
        };
        Ok(serde_json::from_str(&sk.public_key().to_jwk_string())?)
    }

    /// Generates a new key for the operation, replacing any uncommitted one.
    fn next_key(&self, op: KeyOperation) -> Result<Jwk> {
        let sk = SecretKey::random(&mut OsRng);
        let jwk = serde_json::from_str(&sk.public_key().to_jwk_string())?;
        self.next_keys.lock().unwrap_or_else(PoisonError::into_inner).insert(op, sk);
        Ok(jwk)
    }

    /// Promotes every pending key to active.
    fn commit(&self) -> Result<()> {
        let mut next_keys = self.next_keys.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current_keys = self.current_keys.lock().unwrap_or_else(PoisonError::into_inner);
        current_keys.extend(next_keys.drain());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_promotes_next_key() {
        let keyring = EphemeralKeyRing::new();
        let err = keyring.active_key(KeyOperation::Update).expect_err("expected error");
        assert!(err.is(Err::InvalidKey));

        let next = keyring.next_key(KeyOperation::Update).expect("next key");
        assert!(!next.is_private());
        assert!(keyring.active_key(KeyOperation::Update).is_err());

        keyring.commit().expect("commit");
        let active = keyring.active_key(KeyOperation::Update).expect("active key");
        assert_eq!(next, active);

        let private = keyring.private_key(KeyOperation::Update).expect("private key");
        assert_eq!(private.to_public(), active);
    }

    #[test]
    fn keys_are_per_operation() {
        let keyring = EphemeralKeyRing::new();
        let update = keyring.next_key(KeyOperation::Update).expect("next key");
        let recover = keyring.next_key(KeyOperation::Recover).expect("next key");
        assert_ne!(update, recover);

        keyring.commit().expect("commit");
        assert_eq!(keyring.active_key(KeyOperation::Recover).expect("active"), recover);

        // a second round rotates without touching the first until committed
        let rotated = keyring.next_key(KeyOperation::Update).expect("next key");
        assert_eq!(keyring.active_key(KeyOperation::Update).expect("active"), update);
        keyring.commit().expect("commit");
        assert_eq!(keyring.active_key(KeyOperation::Update).expect("active"), rotated);
    }
}
