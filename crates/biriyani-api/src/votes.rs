//! Handlers for `/spots/:id/vote`.
//!
//! Both endpoints require `Authorization: Bearer <token>`; requests without a
//! recognised token get 401 before the store is touched.

use axum::{
  Json,
  extract::{Path, State},
};
use biriyani_core::{
  geocode::Geocoder,
  identity::IdentityProvider,
  spot::SpotId,
  store::SpotStore,
  trust::{TrustLevel, classify},
  vote::{VoteReceipt, VoteValue},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Voter,
  error::{ApiError, JsonBody},
};

/// The caller's standing vote on a spot.
#[derive(Debug, Serialize)]
pub struct MyVote {
  pub spot_id: SpotId,
  pub vote:    Option<VoteValue>,
}

/// `GET /spots/:id/vote`
pub async fn get_mine<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Voter(voter): Voter,
  Path(spot_id): Path<SpotId>,
) -> Result<Json<MyVote>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  state
    .store
    .get_spot(spot_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("spot {spot_id} not found")))?;

  let vote = state
    .store
    .get_vote(spot_id, &voter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(MyVote { spot_id, vote }))
}

/// Accepts any integer so out-of-range values surface as a 400 with a
/// readable message rather than a body-decoding rejection.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteView {
  #[serde(flatten)]
  pub receipt: VoteReceipt,
  pub level:   TrustLevel,
}

/// `POST /spots/:id/vote` — body: `{"value": 1}` or `{"value": -1}`
pub async fn cast<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Voter(voter): Voter,
  Path(spot_id): Path<SpotId>,
  JsonBody(body): JsonBody<VoteBody>,
) -> Result<Json<VoteView>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let value = VoteValue::try_from(body.value)?;
  let receipt = state
    .store
    .cast_vote(spot_id, &voter, value)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    spot_id = %spot_id,
    voter = %voter,
    delta = receipt.delta,
    score = receipt.score,
    "vote cast"
  );
  let level = classify(receipt.score);
  Ok(Json(VoteView { receipt, level }))
}
