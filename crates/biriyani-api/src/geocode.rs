//! Handler for `GET /geocode`.

use axum::{
  Json,
  extract::{Query, State},
};
use biriyani_core::{
  geocode::Geocoder,
  identity::IdentityProvider,
  spot::Coordinates,
  store::SpotStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /geocode?q=<place>` — best match, or `null` when nothing matches.
pub async fn handler<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Query(params): Query<GeocodeParams>,
) -> Result<Json<Option<Coordinates>>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let query = params.q.trim();
  if query.is_empty() {
    return Err(ApiError::BadRequest("q must not be empty".into()));
  }
  let hit = state
    .geocoder
    .lookup(query)
    .await
    .map_err(ApiError::upstream)?;
  Ok(Json(hit))
}
