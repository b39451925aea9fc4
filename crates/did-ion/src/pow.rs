//! Proof of work required by the public ION node before it accepts an operation.
//!
//! The node issues a hex challenge nonce and a largest allowed hash. The client searches for a
//! random hex prefix whose Argon2id hash, taken over the prefix followed by the request body and
//! salted with the decoded challenge nonce, is no larger than the allowed hash. The answer nonce
//! sent back is the hex encoding of that prefix.

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use did_core::error::Err;
use did_core::hashing::rand_hex;
use did_core::{tracerr, Result};
use serde::Deserialize;

// Argon2id cost parameters expected by ION nodes.
const MEMORY_KIB: u32 = 1000;
const ITERATIONS: u32 = 1;
const PARALLELISM: u32 = 1;
const HASH_LEN: usize = 32;

// Random bytes behind each answer prefix.
const NONCE_LEN: usize = 32;

/// Challenge issued by the node's proof-of-work endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Hex nonce. Its decoded bytes salt the hash.
    pub challenge_nonce: String,
    /// Hex string an answer hash must not exceed.
    pub largest_allowed_hash: String,
    /// Minutes the challenge remains valid.
    pub valid_duration_in_minutes: i64,
}

/// A solved challenge, sent as request headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    /// The challenge nonce being answered.
    pub challenge_nonce: String,
    /// Hex encoding of the password prefix satisfying the challenge.
    pub answer_nonce: String,
}

impl Challenge {
    /// Search for an answer to the challenge for the given request body. The search is CPU bound
    /// and should run on a blocking thread.
    ///
    /// # Errors
    ///
    /// * `Err::Expired` - The validity window passed before an answer was found.
    /// * `Err::AnchorSubmissionFailed` - The challenge cannot be hashed with, for example because
    ///   the nonce is not hex or is too short to salt with.
    pub fn solve(&self, body: &[u8]) -> Result<Answer> {
        let Some(window) = Duration::try_minutes(self.valid_duration_in_minutes) else {
            tracerr!(
                Err::AnchorSubmissionFailed,
                "Invalid challenge duration: {}",
                self.valid_duration_in_minutes
            );
        };
        let expires = Utc::now() + window;

        let argon2 = hasher()?;
        let Ok(salt) = hex::decode(&self.challenge_nonce) else {
            tracerr!(Err::AnchorSubmissionFailed, "Challenge nonce is not hex");
        };
        let largest = self.largest_allowed_hash.to_ascii_lowercase();

        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let prefix = rand_hex(NONCE_LEN);
            if hash_answer(&argon2, &salt, &prefix, body)? <= largest {
                tracing::debug!(attempts, "proof of work found");
                return Ok(Answer {
                    challenge_nonce: self.challenge_nonce.clone(),
                    answer_nonce: hex::encode(prefix),
                });
            }
            if Utc::now() > expires {
                tracerr!(Err::Expired, "Challenge expired after {attempts} attempts");
            }
        }
    }
}

fn hasher() -> Result<Argon2<'static>> {
    match Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, Some(HASH_LEN)) {
        Ok(params) => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        Err(e) => tracerr!(Err::AnchorSubmissionFailed, "Invalid Argon2 parameters: {e}"),
    }
}

// Lowercase hex hash of the prefix followed by the body.
fn hash_answer(argon2: &Argon2, salt: &[u8], prefix: &str, body: &[u8]) -> Result<String> {
    let password = [prefix.as_bytes(), body].concat();
    let mut hash = [0u8; HASH_LEN];
    if let Err(e) = argon2.hash_password_into(&password, salt, &mut hash) {
        tracerr!(Err::AnchorSubmissionFailed, "Failed to hash answer: {e}");
    }
    Ok(hex::encode(hash))
}
