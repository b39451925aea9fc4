//! Key management. This module provides a trait that can be implemented for creating and rolling
//! over the keys a sidetree DID commits to: the update key and the recovery key.

use crate::keys::{Jwk, KeyOperation};
use crate::Result;

/// Key generation and storage provider. The `self` reference allows for configuration information
/// such as key store location and credentials.
///
/// Only public keys cross this boundary. Private halves stay with the implementer.
pub trait KeyRing {
    /// Get the currently active public key for the specified key operation.
    ///
    /// # Errors
    ///
    /// An error if there is no active key for the operation or the key store failed.
    fn active_key(&self, op: KeyOperation) -> Result<Jwk>;

    /// Get the public key for the next key pair that will be used for DID operations of the
    /// specified type.
    ///
    /// # Errors
    ///
    /// An error if no key could be created.
    fn next_key(&self, op: KeyOperation) -> Result<Jwk>;

    /// Commit will be called following a successful DID operation and can be used to save newly
    /// generated "next" keys to a key store and make them current. A no-op default is provided if
    /// your implementation does not need a commit.
    ///
    /// # Errors
    ///
    /// An error if the key store could not be updated.
    fn commit(&self) -> Result<()> {
        Ok(())
    }
}
