//! Voter identity.
//!
//! Votes are keyed by an opaque voter id handed out by an external identity
//! check. The core never issues ids itself.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Opaque identifier of an authenticated voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
  pub fn new(id: impl Into<String>) -> Result<Self> {
    let id = id.into();
    if id.trim().is_empty() {
      return Err(Error::EmptyVoterId);
    }
    Ok(Self(id))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for VoterId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Resolves a bearer token to the voter it belongs to.
///
/// `Ok(None)` means the token is unknown or expired; errors are reserved for
/// failures to reach the identity service at all.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn resolve<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<VoterId>, Self::Error>> + Send + 'a;
}
