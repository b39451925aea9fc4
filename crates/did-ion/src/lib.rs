//! # DID ION
//!
//! Create, anchor and resolve `did:ion` identifiers: sidetree DIDs anchored on Bitcoin through the
//! Identity Overlay Network.
//!
//! A DID is described by a [`DocumentModel`] holding one secp256k1 authentication key and any
//! services. Its short and long-form URIs are pure functions of the model and can be computed
//! before anything is sent to the network. [`AnchorClient`] submits the model to an ION node and
//! [`DidResolver`] looks up the current state of a DID.
//!
//! ```no_run
//! use did_core::{Resolver, Service};
//! use did_ion::{build, long_form_uri, AnchorClient, DidResolver, IonConfig};
//! use keyring::{generate_keypair, EphemeralKeyRing};
//!
//! # async fn run(account_key: [u8; 32]) -> did_core::Result<()> {
//! let keypair = generate_keypair(&account_key)?;
//! let hub = Service::new("hub", "IdentityHub", "https://hub.example.com/");
//! let model = build(&keypair.public_key_jwk, &[hub], &EphemeralKeyRing::new())?;
//!
//! let did = long_form_uri(&model)?;
//! let config = IonConfig::from_env()?;
//! AnchorClient::new(config.clone())?.anchor(&model).await?;
//! let resolution = DidResolver::new(&config)?.resolve(&did).await?;
//! println!("published: {}", resolution.is_published());
//! # Ok(())
//! # }
//! ```

mod anchor;
mod config;
mod operation;
mod pow;
mod resolver;
mod uri;

use std::fmt::Display;

use did_core::error::Err;
use did_core::{tracerr, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};

pub use crate::anchor::{AnchorClient, AnchoredIdentity};
pub use crate::config::{
    IonConfig, Network, DEFAULT_CHALLENGE_URL, DEFAULT_RESOLUTION_URL, DEFAULT_SOLUTION_URL,
};
pub use crate::operation::{
    build, CreateRequest, Delta, DocumentContent, DocumentModel, InitialState, OperationType,
    Patch, PatchAction, PublicKeyEntry, SuffixData, AUTH_KEY_ID, MAX_DELTA_SIZE,
};
pub use crate::pow::{Answer, Challenge};
pub use crate::resolver::DidResolver;
pub use crate::uri::{long_form_uri, short_form_uri, IonDid};

// Reusable HTTP client that asks for JSON responses.
fn http_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    match reqwest::Client::builder().default_headers(headers).build() {
        Ok(client) => Ok(client),
        Err(e) => tracerr!(Err::InvalidConfig, "Failed to create HTTP client: {e}"),
    }
}

// Error body returned by ION nodes. Only the detail is used.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorResponseDetail>,
}

#[derive(Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponseDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Display for ErrorResponseDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (Some(s), None) | (None, Some(s)) => write!(f, "{s}"),
            (None, None) => write!(f, "unspecified error"),
        }
    }
}
