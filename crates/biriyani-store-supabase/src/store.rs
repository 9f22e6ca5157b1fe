//! [`SupabaseStore`] — spots and votes over PostgREST.

use biriyani_core::{
  identity::VoterId,
  spot::{NewSpot, Spot, SpotId},
  store::{SpotQuery, SpotStore},
  vote::{VoteReceipt, VoteValue},
};
use reqwest::Method;

use crate::{
  Error, Result,
  client::{Project, SupabaseConfig, check},
  query::{
    CAST_VOTE_PATH, CastVoteArgs, SPOT_SELECT, SPOTS_PATH, SpotInsert, VOTES_PATH,
    VoteRow, spot_by_id_params, spot_params, vote_params,
  },
};

/// A Biriyani Map store living in a Supabase project.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Clone)]
pub struct SupabaseStore {
  project: Project,
}

impl SupabaseStore {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    Ok(Self { project: Project::new(config)? })
  }
}

impl SpotStore for SupabaseStore {
  type Error = Error;

  async fn fetch_spots(&self, query: &SpotQuery) -> Result<Vec<Spot>> {
    let resp = self
      .project
      .data(Method::GET, SPOTS_PATH)
      .query(&spot_params(query))
      .send()
      .await?;
    let spots: Vec<Spot> = check("GET", SPOTS_PATH, resp).await?.json().await?;
    tracing::debug!(count = spots.len(), "fetched spots");
    Ok(spots)
  }

  async fn get_spot(&self, id: SpotId) -> Result<Option<Spot>> {
    let resp = self
      .project
      .data(Method::GET, SPOTS_PATH)
      .query(&spot_by_id_params(id))
      .send()
      .await?;
    let spots: Vec<Spot> = check("GET", SPOTS_PATH, resp).await?.json().await?;
    Ok(spots.into_iter().next())
  }

  async fn insert_spot(&self, input: NewSpot) -> Result<Spot> {
    let body = SpotInsert::from(input.validate()?);
    let resp = self
      .project
      .data(Method::POST, SPOTS_PATH)
      .header("Prefer", "return=representation")
      .query(&[("select", SPOT_SELECT)])
      .json(&body)
      .send()
      .await?;
    let spot = check("POST", SPOTS_PATH, resp)
      .await?
      .json::<Vec<Spot>>()
      .await?
      .into_iter()
      .next()
      .ok_or(Error::EmptyResponse("spot insert"))?;

    tracing::info!(spot_id = %spot.id, title = %spot.title, "spot created");
    Ok(spot)
  }

  async fn get_vote(&self, spot_id: SpotId, voter: &VoterId) -> Result<Option<VoteValue>> {
    let resp = self
      .project
      .data(Method::GET, VOTES_PATH)
      .query(&vote_params(spot_id, voter))
      .send()
      .await?;
    let rows: Vec<VoteRow> = check("GET", VOTES_PATH, resp).await?.json().await?;
    Ok(rows.into_iter().next().map(|r| r.value))
  }

  async fn cast_vote(
    &self,
    spot_id: SpotId,
    voter:   &VoterId,
    value:   VoteValue,
  ) -> Result<VoteReceipt> {
    let args = CastVoteArgs {
      p_spot_id:  spot_id,
      p_voter_id: voter.as_str(),
      p_value:    value,
    };
    let resp = self
      .project
      .data(Method::POST, CAST_VOTE_PATH)
      .json(&args)
      .send()
      .await?;

    // A missing or hidden spot comes back as a JSON `null`.
    let receipt = check("POST", CAST_VOTE_PATH, resp)
      .await?
      .json::<Option<VoteReceipt>>()
      .await?
      .ok_or(Error::SpotNotFound(spot_id))?;

    tracing::debug!(
      spot_id = %spot_id,
      delta = receipt.delta,
      score = receipt.score,
      "vote committed"
    );
    Ok(receipt)
  }
}
