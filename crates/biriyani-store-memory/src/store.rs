//! [`MemoryStore`] — a `SpotStore` held entirely in process memory.

use std::{collections::HashMap, sync::Arc};

use biriyani_core::{
  Error, Result,
  identity::VoterId,
  spot::{FoodType, NewSpot, Spot, SpotId},
  store::{SpotQuery, SpotStore},
  vote::{VoteReceipt, VoteValue, tally},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
  spots: HashMap<SpotId, Spot>,
  votes: HashMap<(SpotId, VoterId), VoteValue>,
}

/// A store backed by two hash maps behind one lock.
///
/// Cloning is cheap and clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<State>>,
}

impl MemoryStore {
  /// An empty store.
  pub fn new() -> Self { Self::default() }

  /// A store seeded with three demo spots around central Dhaka, one per
  /// trust tier.
  pub fn fixture() -> Self {
    let base = fixture_epoch();
    let spots = [
      demo(1, "Biriyani at Park", "Open to all", 23.815, 90.412, FoodType::Biriyani, 12, base),
      demo(2, "Water Distribution", "Bottled water", 23.812, 90.42, FoodType::Water, 7, base - Duration::minutes(1)),
      demo(3, "Tehari Event", "Mosque courtyard", 23.808, 90.415, FoodType::Tehari, 2, base - Duration::minutes(2)),
    ];
    Self::with_spots(spots)
  }

  /// A store holding exactly `spots`. Scores are taken as given; no vote
  /// rows back them.
  pub fn with_spots(spots: impl IntoIterator<Item = Spot>) -> Self {
    let state = State {
      spots: spots.into_iter().map(|s| (s.id, s)).collect(),
      votes: HashMap::new(),
    };
    Self { state: Arc::new(RwLock::new(state)) }
  }
}

fn fixture_epoch() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
    .single()
    .unwrap_or_else(Utc::now)
}

#[allow(clippy::too_many_arguments)]
fn demo(
  n: u128,
  title: &str,
  description: &str,
  lat: f64,
  lng: f64,
  food_type: FoodType,
  score: i64,
  created_at: DateTime<Utc>,
) -> Spot {
  Spot {
    id: SpotId(Uuid::from_u128(n)),
    title: title.to_owned(),
    description: Some(description.to_owned()),
    lat,
    lng,
    food_type: Some(food_type),
    time: None,
    score,
    is_visible: true,
    created_at,
  }
}

// ─── SpotStore impl ──────────────────────────────────────────────────────────

impl SpotStore for MemoryStore {
  type Error = Error;

  async fn fetch_spots(&self, query: &SpotQuery) -> Result<Vec<Spot>> {
    let state = self.state.read().await;
    Ok(query.select(state.spots.values()))
  }

  async fn get_spot(&self, id: SpotId) -> Result<Option<Spot>> {
    let state = self.state.read().await;
    Ok(state.spots.get(&id).filter(|s| s.is_visible).cloned())
  }

  async fn insert_spot(&self, input: NewSpot) -> Result<Spot> {
    let spot = input.validate()?.into_spot(SpotId::new_v4(), Utc::now());
    self.state.write().await.spots.insert(spot.id, spot.clone());
    tracing::info!(spot_id = %spot.id, title = %spot.title, "spot created");
    Ok(spot)
  }

  async fn get_vote(&self, spot_id: SpotId, voter: &VoterId) -> Result<Option<VoteValue>> {
    let state = self.state.read().await;
    Ok(state.votes.get(&(spot_id, voter.clone())).copied())
  }

  async fn cast_vote(
    &self,
    spot_id: SpotId,
    voter:   &VoterId,
    value:   VoteValue,
  ) -> Result<VoteReceipt> {
    // One write guard covers both maps, so the score and the vote row change
    // together.
    let mut guard = self.state.write().await;
    let state = &mut *guard;

    let spot = state
      .spots
      .get_mut(&spot_id)
      .filter(|s| s.is_visible)
      .ok_or(Error::SpotNotFound(spot_id))?;

    let key = (spot_id, voter.clone());
    let outcome = tally(state.votes.get(&key).copied(), value);
    match outcome.next {
      Some(next) => state.votes.insert(key, next),
      None => state.votes.remove(&key),
    };
    spot.score += outcome.delta;

    Ok(VoteReceipt {
      spot_id,
      vote: outcome.next,
      delta: outcome.delta,
      score: spot.score,
    })
  }
}
