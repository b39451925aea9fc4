//! # DID Core Errors
//!
//! This module defines the error types used across the workspace. Errors carry a typed kind
//! ([`Err`]) so callers can branch on, for example, "not anchored yet" versus "network problem",
//! plus free-form context describing what went wrong.

use std::fmt::Display;

use thiserror::Error;

/// Simplify creation of errors with tracing.
///
/// # Example
/// ```
/// use did_core::error::Err;
/// use did_core::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to `OAuth2` compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if `err` is the kind held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.kind() == Some(err)
    }

    /// The typed kind of this error, if it was raised with one.
    #[must_use]
    pub fn kind(&self) -> Option<Err> {
        self.0.downcast_ref::<Err>().copied()
    }
}

/// Typed error kinds.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// The account key supplied for key derivation is missing or is not 32 bytes.
    #[error("invalid_seed_material")]
    InvalidSeedMaterial,

    /// The curve library rejected the seed bytes as a secp256k1 scalar (zero or not less than the
    /// curve order).
    #[error("key_generation_failed")]
    KeyGenerationFailed,

    /// Key material is inconsistent with the secp256k1 curve.
    #[error("unsupported_curve")]
    UnsupportedCurve,

    /// A service endpoint is missing its identifier, type or endpoint URI, or breaks a sidetree
    /// size constraint.
    #[error("invalid_service_endpoint")]
    InvalidServiceEndpoint,

    /// A document operation model failed internal consistency checks.
    #[error("malformed_model")]
    MalformedModel,

    /// The anchoring request could not be delivered or its response could not be read.
    #[error("anchor_submission_failed")]
    AnchorSubmissionFailed,

    /// The anchoring service answered but refused the request.
    #[error("anchor_rejected")]
    AnchorRejected,

    /// No DID document was found for the requested DID.
    #[error("did_not_found")]
    DidNotFound,

    /// Resolution failed for a transport or protocol reason.
    #[error("resolution_error")]
    ResolutionError,

    /// Hash is not a valid SHA-256 multihash.
    #[error("invalid_hash")]
    InvalidHash,

    /// Invalid format. (See context for details)
    #[error("invalid_format")]
    InvalidFormat,

    /// Invalid key is where the structure of a key is incorrect.
    #[error("invalid_key")]
    InvalidKey,

    /// An error occurred trying to serialize data.
    #[error("serialization_error")]
    SerializationError,

    /// An error occurred trying to deserialize data.
    #[error("deserialization_error")]
    DeserializationError,

    /// Environment configuration could not be resolved.
    #[error("invalid_config")]
    InvalidConfig,

    /// A proof-of-work challenge expired before an answer was found.
    #[error("expired")]
    Expired,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<multihash::Error> for Error {
    fn from(err: multihash::Error) -> Self {
        Self(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(err.into())
    }
}
