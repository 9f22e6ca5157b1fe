//! Handler for `GET /stats`.

use axum::{Json, extract::State};
use biriyani_core::{
  geocode::Geocoder,
  identity::IdentityProvider,
  store::{SpotQuery, SpotStore},
  trust::TrustStats,
};

use crate::{AppState, error::ApiError};

/// `GET /stats` — spot counts per trust tier over the visible spots a full
/// listing would return.
pub async fn handler<S, I, G>(
  State(state): State<AppState<S, I, G>>,
) -> Result<Json<TrustStats>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let spots = state
    .store
    .fetch_spots(&SpotQuery::default())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(TrustStats::from_scores(spots.iter().map(|s| s.score))))
}
