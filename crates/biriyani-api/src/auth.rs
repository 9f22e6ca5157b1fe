//! Bearer-token voter extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use biriyani_core::identity::{IdentityProvider, VoterId};

use crate::{AppState, error::ApiError};

/// Present in a handler means the request carried a token the identity
/// provider recognised.
#[derive(Debug, Clone)]
pub struct Voter(pub VoterId);

/// The token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S, I, G> FromRequestParts<AppState<S, I, G>> for Voter
where
  S: Send + Sync,
  I: IdentityProvider,
  G: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, G>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let voter = state
      .identity
      .resolve(token)
      .await
      .map_err(ApiError::upstream)?
      .ok_or(ApiError::Unauthorized)?;
    Ok(Voter(voter))
  }
}
