//! Handlers for `/spots` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/spots` | Optional `?south&west&north&east` (all or none), `food_type`, `level`, `limit` |
//! | `POST` | `/spots` | Body: [`NewSpot`] |
//! | `GET`  | `/spots/:id` | 404 if absent or hidden |
//! | `GET`  | `/spots/:id/marker` | `image/svg+xml` map pin |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use biriyani_core::{
  geocode::Geocoder,
  identity::IdentityProvider,
  marker,
  spot::{BoundingBox, FoodType, NewSpot, Spot, SpotId},
  store::{SpotFilter, SpotQuery, SpotStore},
  trust::TrustLevel,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::{ApiError, JsonBody},
};

/// A spot together with its derived trust level.
#[derive(Debug, Serialize)]
pub struct SpotView {
  #[serde(flatten)]
  pub spot:  Spot,
  pub level: TrustLevel,
}

impl From<Spot> for SpotView {
  fn from(spot: Spot) -> Self {
    let level = spot.trust_level();
    Self { spot, level }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub south:     Option<f64>,
  pub west:      Option<f64>,
  pub north:     Option<f64>,
  pub east:      Option<f64>,
  /// Label such as `Biriyani` or `Iftar Pack`, case-insensitive.
  pub food_type: Option<String>,
  /// Minimum trust level, e.g. `almost-confirmed`.
  pub level:     Option<String>,
  pub limit:     Option<usize>,
}

impl ListParams {
  pub fn into_query(self) -> Result<SpotQuery, ApiError> {
    let bounds = match (self.south, self.west, self.north, self.east) {
      (Some(s), Some(w), Some(n), Some(e)) => Some(BoundingBox::new(s, w, n, e)?),
      (None, None, None, None) => None,
      _ => {
        return Err(ApiError::BadRequest(
          "bounding box needs all of south, west, north and east".into(),
        ));
      }
    };

    Ok(SpotQuery {
      bounds,
      filter: SpotFilter {
        food_type: self.food_type.as_deref().map(FoodType::parse).transpose()?,
        min_level: self.level.as_deref().map(TrustLevel::parse).transpose()?,
      },
      limit: self.limit,
    })
  }
}

/// `GET /spots[?south=..&west=..&north=..&east=..][&food_type=..][&level=..][&limit=..]`
pub async fn list<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SpotView>>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let query = params.into_query()?;
  let spots = state
    .store
    .fetch_spots(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(spots.into_iter().map(SpotView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /spots`
pub async fn create<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  JsonBody(body): JsonBody<NewSpot>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let spot = state
    .store
    .insert_spot(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(SpotView::from(spot))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn find<S: SpotStore>(store: &S, id: SpotId) -> Result<Spot, ApiError> {
  store
    .get_spot(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("spot {id} not found")))
}

/// `GET /spots/:id`
pub async fn get_one<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Path(id): Path<SpotId>,
) -> Result<Json<SpotView>, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let spot = find(state.store.as_ref(), id).await?;
  Ok(Json(spot.into()))
}

/// `GET /spots/:id/marker`
pub async fn marker<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Path(id): Path<SpotId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SpotStore,
  I: IdentityProvider,
  G: Geocoder,
{
  let spot = find(state.store.as_ref(), id).await?;
  Ok((
    [(header::CONTENT_TYPE, "image/svg+xml")],
    marker::render(spot.score),
  ))
}
