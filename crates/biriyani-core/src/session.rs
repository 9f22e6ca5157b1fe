//! Client-side map state.
//!
//! [`MapSession`] is the explicit state object a map front-end threads through
//! its views: interaction mode, viewport, filter, selection, the open
//! creation draft, the spots currently on screen and the voter's own votes.
//!
//! Network calls are not made here. The session hands out tickets when a
//! request starts and is told how it ended, which lets it
//!
//! - drop fetch results that arrive after a newer fetch was applied,
//! - keep the last good spots on screen when a fetch fails,
//! - apply votes optimistically and roll them back on failure.

use std::{
  collections::{HashMap, HashSet},
  fmt::Display,
};

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  spot::{BoundingBox, Coordinates, FoodType, NewSpot, Spot, SpotId},
  store::{SpotFilter, SpotQuery},
  trust::TrustStats,
  vote::{VoteReceipt, VoteValue, tally},
};

// ─── Mode ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
  #[default]
  Browse,
  /// The next map click drops a pin and opens the creation form.
  AddSpot,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The creation form, bound to the position that was clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotDraft {
  pub position:    Coordinates,
  pub title:       String,
  pub description: String,
  pub food_type:   FoodType,
  pub time:        Option<DateTime<Utc>>,
}

impl SpotDraft {
  pub fn at(position: Coordinates) -> Self {
    Self {
      position,
      title: String::new(),
      description: String::new(),
      food_type: FoodType::Biriyani,
      time: None,
    }
  }

  /// Turn the form into store input. An empty title blocks submission.
  pub fn submit(&self) -> Result<NewSpot> {
    NewSpot {
      title:       self.title.clone(),
      description: Some(self.description.clone()),
      lat:         self.position.lat,
      lng:         self.position.lng,
      food_type:   Some(self.food_type),
      time:        self.time,
    }
    .validate()
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// Identifies one spot fetch. Later fetches carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Identifies one in-flight vote and remembers how to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTicket {
  id:            u64,
  spot_id:       SpotId,
  previous_vote: Option<VoteValue>,
  delta:         i64,
  /// Fetch generation the optimistic delta was applied to.
  generation:    u64,
}

impl VoteTicket {
  pub fn spot_id(&self) -> SpotId { self.spot_id }

  pub fn delta(&self) -> i64 { self.delta }
}

/// What [`MapSession::finish_fetch`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  Applied,
  /// A newer fetch already landed; this result was dropped.
  Superseded,
  /// The fetch failed; the previous spots stay on screen.
  Failed,
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MapSession {
  mode:          Mode,
  viewport:      Option<BoundingBox>,
  filter:        SpotFilter,
  selected:      Option<SpotId>,
  draft:         Option<SpotDraft>,
  spots:         Vec<Spot>,
  my_votes:      HashMap<SpotId, VoteValue>,
  /// Spots with a vote sent but not yet settled.
  pending_votes: HashSet<SpotId>,
  next_ticket:   u64,
  applied_fetch: Option<FetchTicket>,
  /// Bumped every time fetched spots replace the displayed ones.
  generation:    u64,
  last_error:    Option<String>,
}

impl MapSession {
  pub fn new() -> Self { Self::default() }

  // ── Mode and clicks ───────────────────────────────────────────────────────

  pub fn mode(&self) -> Mode { self.mode }

  pub fn set_mode(&mut self, mode: Mode) { self.mode = mode; }

  /// The add-spot control flips between browsing and dropping a pin.
  pub fn toggle_add_mode(&mut self) {
    self.mode = match self.mode {
      Mode::Browse => Mode::AddSpot,
      Mode::AddSpot => Mode::Browse,
    };
  }

  /// A click on empty map. In add mode it opens a draft at the position;
  /// while browsing it closes the detail sheet.
  pub fn click(&mut self, position: Coordinates) -> Option<&SpotDraft> {
    match self.mode {
      Mode::AddSpot => {
        self.draft = Some(SpotDraft::at(position));
        self.draft.as_ref()
      }
      Mode::Browse => {
        self.selected = None;
        None
      }
    }
  }

  pub fn draft(&self) -> Option<&SpotDraft> { self.draft.as_ref() }

  pub fn draft_mut(&mut self) -> Option<&mut SpotDraft> { self.draft.as_mut() }

  pub fn cancel_draft(&mut self) { self.draft = None; }

  /// Validate the open draft. The draft stays open until
  /// [`Self::finish_submit`] reports the store's answer.
  pub fn submit_draft(&self) -> Option<Result<NewSpot>> {
    self.draft.as_ref().map(SpotDraft::submit)
  }

  /// Record the result of inserting the draft. Success closes the form and
  /// shows the new spot if it falls in the current view; failure keeps the
  /// form open with the error.
  pub fn finish_submit<E: Display>(&mut self, result: Result<Spot, E>) {
    match result {
      Ok(spot) => {
        self.draft = None;
        self.mode = Mode::Browse;
        self.last_error = None;
        let query = self.current_query();
        if query.matches(&spot) {
          self.spots.insert(0, spot);
          self.spots.truncate(query.effective_limit());
        }
      }
      Err(e) => self.last_error = Some(e.to_string()),
    }
  }

  // ── Viewport and fetches ──────────────────────────────────────────────────

  pub fn viewport(&self) -> Option<BoundingBox> { self.viewport }

  pub fn set_viewport(&mut self, bounds: BoundingBox) {
    self.viewport = Some(bounds);
  }

  pub fn filter(&self) -> SpotFilter { self.filter }

  pub fn set_filter(&mut self, filter: SpotFilter) { self.filter = filter; }

  pub fn current_query(&self) -> SpotQuery {
    SpotQuery { bounds: self.viewport, filter: self.filter, limit: None }
  }

  /// Start a fetch for the current viewport and filter.
  pub fn begin_fetch(&mut self) -> (FetchTicket, SpotQuery) {
    let ticket = FetchTicket(self.bump());
    (ticket, self.current_query())
  }

  pub fn finish_fetch<E: Display>(
    &mut self,
    ticket: FetchTicket,
    result: Result<Vec<Spot>, E>,
  ) -> FetchOutcome {
    if self.applied_fetch.is_some_and(|applied| applied > ticket) {
      return FetchOutcome::Superseded;
    }
    match result {
      Ok(spots) => {
        self.spots = spots;
        self.applied_fetch = Some(ticket);
        self.generation += 1;
        self.last_error = None;
        if let Some(id) = self.selected
          && self.spot(id).is_none()
        {
          self.selected = None;
        }
        FetchOutcome::Applied
      }
      Err(e) => {
        self.last_error = Some(e.to_string());
        FetchOutcome::Failed
      }
    }
  }

  pub fn spots(&self) -> &[Spot] { &self.spots }

  pub fn spot(&self, id: SpotId) -> Option<&Spot> {
    self.spots.iter().find(|s| s.id == id)
  }

  pub fn stats(&self) -> TrustStats {
    TrustStats::from_scores(self.spots.iter().map(|s| s.score))
  }

  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// Open the detail sheet for a displayed spot. Returns `false` if the spot
  /// is not on screen.
  pub fn select(&mut self, id: SpotId) -> bool {
    let found = self.spot(id).is_some();
    if found {
      self.selected = Some(id);
    }
    found
  }

  pub fn deselect(&mut self) { self.selected = None; }

  pub fn selected(&self) -> Option<&Spot> {
    self.selected.and_then(|id| self.spot(id))
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  pub fn my_vote(&self, spot_id: SpotId) -> Option<VoteValue> {
    self.my_votes.get(&spot_id).copied()
  }

  /// Seed the voter's known vote, e.g. from the API when a sheet opens.
  pub fn remember_vote(&mut self, spot_id: SpotId, vote: Option<VoteValue>) {
    match vote {
      Some(v) => self.my_votes.insert(spot_id, v),
      None => self.my_votes.remove(&spot_id),
    };
  }

  /// Whether a vote on `spot_id` is waiting for [`Self::settle_vote`].
  pub fn is_vote_pending(&self, spot_id: SpotId) -> bool {
    self.pending_votes.contains(&spot_id)
  }

  /// Apply a vote to the displayed score before the store confirms it.
  ///
  /// Only one vote per spot may be in flight; the vote buttons stay
  /// disabled until it settles.
  pub fn begin_vote(
    &mut self,
    spot_id: SpotId,
    requested: VoteValue,
  ) -> Result<VoteTicket> {
    if self.spot(spot_id).is_none() {
      return Err(Error::SpotNotFound(spot_id));
    }
    if !self.pending_votes.insert(spot_id) {
      return Err(Error::VotePending(spot_id));
    }
    let previous_vote = self.my_vote(spot_id);
    let outcome = tally(previous_vote, requested);

    self.adjust_score(spot_id, outcome.delta);
    self.remember_vote(spot_id, outcome.next);

    Ok(VoteTicket {
      id: self.bump(),
      spot_id,
      previous_vote,
      delta: outcome.delta,
      generation: self.generation,
    })
  }

  /// Settle an optimistic vote.
  ///
  /// On success the store's score wins. On failure the voter's vote is
  /// restored and the delta undone, unless a fetch has replaced the spots
  /// since, in which case the fetched score already excludes it.
  pub fn settle_vote<E: Display>(
    &mut self,
    ticket: VoteTicket,
    result: Result<VoteReceipt, E>,
  ) {
    self.pending_votes.remove(&ticket.spot_id);
    match result {
      Ok(receipt) => {
        if let Some(spot) = self.spots.iter_mut().find(|s| s.id == receipt.spot_id) {
          spot.score = receipt.score;
        }
        self.remember_vote(receipt.spot_id, receipt.vote);
      }
      Err(e) => {
        if ticket.generation == self.generation {
          self.adjust_score(ticket.spot_id, -ticket.delta);
        }
        self.remember_vote(ticket.spot_id, ticket.previous_vote);
        self.last_error = Some(e.to_string());
      }
    }
  }

  fn adjust_score(&mut self, spot_id: SpotId, delta: i64) {
    if let Some(spot) = self.spots.iter_mut().find(|s| s.id == spot_id) {
      spot.score += delta;
    }
  }

  fn bump(&mut self) -> u64 {
    self.next_ticket += 1;
    self.next_ticket
  }
}
