//! Error types for `biriyani-core`.

use thiserror::Error;

use crate::spot::SpotId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("spot not found: {0}")]
  SpotNotFound(SpotId),

  #[error("title must not be empty")]
  EmptyTitle,

  #[error("coordinates out of range: ({lat}, {lng})")]
  InvalidCoordinates { lat: f64, lng: f64 },

  #[error("invalid bounding box: {0}")]
  InvalidBounds(String),

  #[error("vote value must be 1 or -1, got {0}")]
  InvalidVote(i64),

  #[error("voter id must not be empty")]
  EmptyVoterId,

  #[error("unknown food type: {0:?}")]
  UnknownFoodType(String),

  #[error("unknown trust level: {0:?}")]
  UnknownTrustLevel(String),

  #[error("a vote on spot {0} is still in flight")]
  VotePending(SpotId),
}

impl Error {
  /// True for caller mistakes that should surface as a bad request.
  pub fn is_invalid_input(&self) -> bool {
    !matches!(self, Self::SpotNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
