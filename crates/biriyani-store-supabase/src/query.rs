//! PostgREST request shapes.

use biriyani_core::{
  identity::VoterId,
  spot::{NewSpot, SpotId},
  store::SpotQuery,
  vote::VoteValue,
};
use serde::{Deserialize, Serialize};

pub const SPOTS_PATH: &str = "/rest/v1/spots";
pub const VOTES_PATH: &str = "/rest/v1/votes";
pub const CAST_VOTE_PATH: &str = "/rest/v1/rpc/cast_vote";

/// Columns selected for every spot read. Matches the fields of
/// [`biriyani_core::spot::Spot`].
pub const SPOT_SELECT: &str =
  "id,title,description,lat,lng,food_type,time,score,is_visible,created_at";

pub type Params = Vec<(&'static str, String)>;

/// Query-string parameters for a spot list request.
pub fn spot_params(query: &SpotQuery) -> Params {
  let mut params: Params = vec![
    ("select", SPOT_SELECT.to_owned()),
    ("is_visible", "eq.true".to_owned()),
  ];

  if let Some(b) = query.bounds {
    params.push(("lat", format!("gte.{}", b.south)));
    params.push(("lat", format!("lte.{}", b.north)));
    params.push(("lng", format!("gte.{}", b.west)));
    params.push(("lng", format!("lte.{}", b.east)));
  }
  if let Some(food_type) = query.filter.food_type {
    params.push(("food_type", format!("eq.{}", food_type.as_ref())));
  }
  if let Some(min) = query.filter.min_level.and_then(|l| l.min_score()) {
    params.push(("score", format!("gte.{min}")));
  }

  params.push(("order", "created_at.desc".to_owned()));
  params.push(("limit", query.effective_limit().to_string()));
  params
}

/// Query-string parameters for a single visible spot.
pub fn spot_by_id_params(id: SpotId) -> Params {
  vec![
    ("select", SPOT_SELECT.to_owned()),
    ("id", format!("eq.{id}")),
    ("is_visible", "eq.true".to_owned()),
    ("limit", "1".to_owned()),
  ]
}

/// Query-string parameters for one voter's vote on one spot.
pub fn vote_params(spot_id: SpotId, voter: &VoterId) -> Params {
  vec![
    ("select", "value".to_owned()),
    ("spot_id", format!("eq.{spot_id}")),
    ("voter_id", format!("eq.{voter}")),
  ]
}

/// Insert body for `spots`. Score and visibility start at their defaults.
#[derive(Debug, Serialize)]
pub struct SpotInsert {
  #[serde(flatten)]
  pub spot:       NewSpot,
  pub score:      i64,
  pub is_visible: bool,
}

impl From<NewSpot> for SpotInsert {
  fn from(spot: NewSpot) -> Self {
    Self { spot, score: 0, is_visible: true }
  }
}

/// Arguments of the `cast_vote` database function.
#[derive(Debug, Serialize)]
pub struct CastVoteArgs<'a> {
  pub p_spot_id:  SpotId,
  pub p_voter_id: &'a str,
  pub p_value:    VoteValue,
}

#[derive(Debug, Deserialize)]
pub struct VoteRow {
  pub value: VoteValue,
}
