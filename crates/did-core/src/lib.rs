//! # DID Core
//!
//! Types, traits and functions shared by the key derivation and sidetree (ION) crates: errors,
//! hashing, JSON Web Keys, DID documents and resolution results.

pub mod core;
pub mod document;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod resolver;

pub use crate::core::{Kind, OneMany};
pub use crate::document::{check_services, DidDocument, KeyPurpose, Service, VerificationMethod};
pub use crate::error::{Err, Error};
pub use crate::keys::keyring::KeyRing;
pub use crate::keys::{Algorithm, Jwk, KeyOperation, SECP256K1_CURVE};
pub use crate::resolver::{
    DocumentMetadata, MethodMetadata, Resolution, ResolutionMetadata, Resolver,
};

/// Result type for DID Core.
pub type Result<T, E = error::Error> = std::result::Result<T, E>;
