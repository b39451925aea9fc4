//! Endpoint and network configuration for talking to an ION node.

use std::fmt::Display;
use std::str::FromStr;

use did_core::error::Err;
use did_core::{tracerr, Result};
use serde::{Deserialize, Serialize};

/// Proof-of-work challenge endpoint of the public ION node.
pub const DEFAULT_CHALLENGE_URL: &str =
    "https://beta.ion.msidentity.com/api/v1.0/proof-of-work-challenge";

/// Operation submission endpoint of the public ION node.
pub const DEFAULT_SOLUTION_URL: &str = "https://beta.ion.msidentity.com/api/v1.0/operations";

/// DID resolution endpoint of the public ION node.
pub const DEFAULT_RESOLUTION_URL: &str = "https://discover.did.msidentity.com/1.0/identifiers/";

/// Bitcoin network an ION DID is anchored on.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin mainnet. DIDs carry no network segment.
    #[default]
    Mainnet,
    /// Bitcoin testnet. DIDs carry a `test` segment.
    #[serde(rename = "test")]
    Testnet,
}

impl Network {
    /// The DID prefix for the network, without a trailing colon.
    #[must_use]
    pub const fn did_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "did:ion",
            Self::Testnet => "did:ion:test",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "test"),
        }
    }
}

impl FromStr for Network {
    type Err = did_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "mainnet" => Ok(Self::Mainnet),
            "test" | "testnet" => Ok(Self::Testnet),
            other => tracerr!(Err::InvalidConfig, "Unknown ION network: {other}"),
        }
    }
}

/// ION node endpoints and the network DIDs are created for.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IonConfig {
    /// Proof-of-work challenge endpoint. Empty when the node accepts operations without a
    /// proof of work, as self-hosted nodes usually do.
    pub challenge_url: String,
    /// Operation submission endpoint.
    pub solution_url: String,
    /// Resolution endpoint. The DID is appended to it.
    pub resolution_url: String,
    /// Network for new DIDs.
    pub network: Network,
}

impl Default for IonConfig {
    fn default() -> Self {
        Self {
            challenge_url: DEFAULT_CHALLENGE_URL.to_string(),
            solution_url: DEFAULT_SOLUTION_URL.to_string(),
            resolution_url: DEFAULT_RESOLUTION_URL.to_string(),
            network: Network::Mainnet,
        }
    }
}

impl IonConfig {
    /// Configuration pointing every endpoint at a single node, e.g. a local ION node at
    /// `http://localhost:3000`. Proof of work is disabled.
    #[must_use]
    pub fn for_node(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            challenge_url: String::new(),
            solution_url: format!("{base}/operations"),
            resolution_url: format!("{base}/identifiers/"),
            network: Network::Mainnet,
        }
    }

    /// Defaults overridden by the `ION_CHALLENGE_URL`, `ION_SOLUTION_URL`, `ION_RESOLUTION_URL`
    /// and `ION_NETWORK` environment variables, when set.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` - `ION_NETWORK` names an unknown network.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = var("ION_CHALLENGE_URL") {
            config.challenge_url = url;
        }
        if let Some(url) = var("ION_SOLUTION_URL") {
            config.solution_url = url;
        }
        if let Some(url) = var("ION_RESOLUTION_URL") {
            config.resolution_url = url;
        }
        if let Some(network) = var("ION_NETWORK") {
            config.network = network.parse()?;
        }
        Ok(config)
    }

    /// Whether operations must carry a proof of work.
    #[must_use]
    pub fn requires_pow(&self) -> bool {
        !self.challenge_url.is_empty()
    }
}
