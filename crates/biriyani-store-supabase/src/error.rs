//! Error type for `biriyani-store-supabase`.

use biriyani_core::{spot::SpotId, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] biriyani_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} returned {status}: {body}")]
  Status {
    method: &'static str,
    path:   String,
    status: u16,
    body:   String,
  },

  #[error("{0} returned no rows")]
  EmptyResponse(&'static str),

  #[error("spot not found: {0}")]
  SpotNotFound(SpotId),
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool {
    match self {
      Self::SpotNotFound(_) => true,
      Self::Core(e) => e.is_not_found(),
      _ => false,
    }
  }

  fn is_invalid_input(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_invalid_input())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
