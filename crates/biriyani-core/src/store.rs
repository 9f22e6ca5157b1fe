//! The `SpotStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`biriyani-store-sqlite`,
//! `biriyani-store-memory`, `biriyani-store-supabase`). Higher layers depend
//! on this abstraction, never on a concrete backend.

use std::future::Future;

use crate::{
  identity::VoterId,
  spot::{BoundingBox, FoodType, NewSpot, Spot, SpotId},
  trust::TrustLevel,
  vote::{VoteReceipt, VoteValue},
};

/// Hard cap on the number of spots a single query returns.
pub const MAX_SPOTS: usize = 500;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Optional narrowing applied on top of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpotFilter {
  pub food_type: Option<FoodType>,
  /// Only spots at this trust level or above.
  pub min_level: Option<TrustLevel>,
}

impl SpotFilter {
  pub fn matches(&self, spot: &Spot) -> bool {
    let food_ok = self.food_type.is_none_or(|f| spot.food_type == Some(f));
    let level_ok = self.min_level.is_none_or(|l| spot.trust_level() >= l);
    food_ok && level_ok
  }
}

/// Parameters for [`SpotStore::fetch_spots`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpotQuery {
  /// Viewport to search; `None` searches everywhere.
  pub bounds: Option<BoundingBox>,
  pub filter: SpotFilter,
  /// Requested page size; clamped to [`MAX_SPOTS`].
  pub limit:  Option<usize>,
}

impl SpotQuery {
  pub fn within(bounds: BoundingBox) -> Self {
    Self { bounds: Some(bounds), ..Self::default() }
  }

  pub fn effective_limit(&self) -> usize {
    self.limit.map_or(MAX_SPOTS, |l| l.min(MAX_SPOTS))
  }

  /// Whether `spot` belongs in this query's result set, ignoring the limit.
  pub fn matches(&self, spot: &Spot) -> bool {
    spot.is_visible
      && self.bounds.is_none_or(|b| b.contains(spot.coordinates()))
      && self.filter.matches(spot)
  }

  /// Apply the query to an unordered collection: filter, order newest-first,
  /// then cap.
  pub fn select<'a>(&self, spots: impl IntoIterator<Item = &'a Spot>) -> Vec<Spot> {
    let mut hits: Vec<Spot> = spots
      .into_iter()
      .filter(|s| self.matches(s))
      .cloned()
      .collect();
    hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    hits.truncate(self.effective_limit());
    hits
  }
}

// ─── Error classification ────────────────────────────────────────────────────

/// Lets callers tell a missing spot or a rejected input apart from a backend
/// failure without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_not_found(&self) -> bool;
  fn is_invalid_input(&self) -> bool;
}

impl StoreError for crate::Error {
  fn is_not_found(&self) -> bool { matches!(self, Self::SpotNotFound(_)) }

  fn is_invalid_input(&self) -> bool { crate::Error::is_invalid_input(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Biriyani Map store backend.
///
/// Hidden spots (`is_visible = false`) are invisible through every method:
/// they are never returned and cannot be voted on.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SpotStore: Send + Sync {
  type Error: StoreError;

  /// Visible spots matching `query`, newest first, at most
  /// [`SpotQuery::effective_limit`] of them.
  fn fetch_spots<'a>(
    &'a self,
    query: &'a SpotQuery,
  ) -> impl Future<Output = Result<Vec<Spot>, Self::Error>> + Send + 'a;

  /// Retrieve a visible spot by id. Returns `None` if absent or hidden.
  fn get_spot(
    &self,
    id: SpotId,
  ) -> impl Future<Output = Result<Option<Spot>, Self::Error>> + Send + '_;

  /// Validate and persist a new spot with score 0, visible.
  fn insert_spot(
    &self,
    input: NewSpot,
  ) -> impl Future<Output = Result<Spot, Self::Error>> + Send + '_;

  /// The voter's current vote on a spot, if any.
  fn get_vote<'a>(
    &'a self,
    spot_id: SpotId,
    voter: &'a VoterId,
  ) -> impl Future<Output = Result<Option<VoteValue>, Self::Error>> + Send + 'a;

  /// Apply a vote request (see [`crate::vote::tally`]).
  ///
  /// The score update and the vote row change are committed together or not
  /// at all.
  fn cast_vote<'a>(
    &'a self,
    spot_id: SpotId,
    voter: &'a VoterId,
    value: VoteValue,
  ) -> impl Future<Output = Result<VoteReceipt, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn spot(n: u128, lat: f64, score: i64, minutes: i64) -> Spot {
    Spot {
      id:          SpotId(Uuid::from_u128(n)),
      title:       format!("spot {n}"),
      description: None,
      lat,
      lng:         90.4,
      food_type:   Some(FoodType::Biriyani),
      time:        None,
      score,
      is_visible:  true,
      created_at:  Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        + Duration::minutes(minutes),
    }
  }

  #[test]
  fn select_orders_newest_first_and_skips_hidden() {
    let mut hidden = spot(3, 23.8, 0, 30);
    hidden.is_visible = false;
    let spots = [spot(1, 23.8, 0, 0), spot(2, 23.8, 0, 10), hidden];

    let ids: Vec<_> = SpotQuery::default()
      .select(&spots)
      .into_iter()
      .map(|s| s.id.0.as_u128())
      .collect();
    assert_eq!(ids, vec![2, 1]);
  }

  #[test]
  fn limit_is_clamped_to_the_cap() {
    let q = SpotQuery { limit: Some(10_000), ..SpotQuery::default() };
    assert_eq!(q.effective_limit(), MAX_SPOTS);
    let q = SpotQuery { limit: Some(3), ..SpotQuery::default() };
    assert_eq!(q.effective_limit(), 3);
    assert_eq!(SpotQuery::default().effective_limit(), MAX_SPOTS);
  }

  #[test]
  fn select_caps_large_collections() {
    let spots: Vec<_> = (0..600).map(|n| spot(n, 23.8, 0, n as i64)).collect();
    let hits = SpotQuery::default().select(&spots);
    assert_eq!(hits.len(), MAX_SPOTS);
    assert_eq!(hits[0].id.0.as_u128(), 599);
  }

  #[test]
  fn filter_by_level_and_food_type() {
    let mut water = spot(4, 23.8, 12, 0);
    water.food_type = Some(FoodType::Water);
    let spots = [spot(1, 23.8, 12, 0), spot(2, 23.8, 7, 1), spot(3, 23.8, 2, 2), water];

    let q = SpotQuery {
      filter: SpotFilter {
        min_level: Some(TrustLevel::AlmostConfirmed),
        ..SpotFilter::default()
      },
      ..SpotQuery::default()
    };
    assert_eq!(q.select(&spots).len(), 3);

    let q = SpotQuery {
      filter: SpotFilter {
        food_type: Some(FoodType::Water),
        min_level: Some(TrustLevel::Confirmed),
      },
      ..SpotQuery::default()
    };
    let hits = q.select(&spots);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.0.as_u128(), 4);
  }

  #[test]
  fn bounds_are_applied() {
    let b = BoundingBox::new(23.80, 90.0, 23.81, 91.0).unwrap();
    let spots = [spot(1, 23.80, 0, 0), spot(2, 23.81, 0, 0), spot(3, 23.82, 0, 0)];
    assert_eq!(SpotQuery::within(b).select(&spots).len(), 2);
  }
}
