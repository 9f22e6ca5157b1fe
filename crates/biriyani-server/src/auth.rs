//! Self-hosted voter identity: a directory of bearer-token digests.

use std::{collections::HashMap, convert::Infallible};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use biriyani_core::identity::{IdentityProvider, VoterId};
use rand_core::{OsRng, RngCore as _};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

/// One configured voter. Only the digest of the token is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct VoterEntry {
  pub name:         String,
  /// Lowercase hex SHA-256 of the bearer token.
  pub token_sha256: String,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
  #[error("voter {0:?}: token_sha256 must be 64 hex characters")]
  BadDigest(String),
  #[error("voter names must not be empty")]
  EmptyName,
  #[error("voters {0:?} and {1:?} share a token")]
  DuplicateToken(String, String),
}

/// Resolves bearer tokens against the configured voters.
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
  by_digest: HashMap<String, VoterId>,
}

impl TokenDirectory {
  pub fn new(entries: &[VoterEntry]) -> Result<Self, DirectoryError> {
    let mut by_digest = HashMap::with_capacity(entries.len());
    for entry in entries {
      let voter = VoterId::new(entry.name.trim()).map_err(|_| DirectoryError::EmptyName)?;
      let digest = entry.token_sha256.trim().to_ascii_lowercase();
      if digest.len() != 64 || hex::decode(&digest).is_err() {
        return Err(DirectoryError::BadDigest(entry.name.clone()));
      }
      if let Some(other) = by_digest.insert(digest, voter.clone()) {
        return Err(DirectoryError::DuplicateToken(
          other.to_string(),
          voter.to_string(),
        ));
      }
    }
    Ok(Self { by_digest })
  }

  pub fn len(&self) -> usize { self.by_digest.len() }

  pub fn is_empty(&self) -> bool { self.by_digest.is_empty() }
}

/// Hex SHA-256 of a token, as stored in `voters[].token_sha256`.
pub fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// A fresh random token and its digest.
pub fn mint_token() -> (String, String) {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  let token = URL_SAFE_NO_PAD.encode(bytes);
  let hashed = digest(&token);
  (token, hashed)
}

impl IdentityProvider for TokenDirectory {
  type Error = Infallible;

  async fn resolve(&self, token: &str) -> Result<Option<VoterId>, Infallible> {
    Ok(self.by_digest.get(&digest(token)).cloned())
  }
}
