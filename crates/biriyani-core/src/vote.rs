//! Votes and the score-delta rule.
//!
//! A voter holds at most one vote per spot. Casting the same value twice
//! retracts it; casting the opposite value flips it in place.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, identity::VoterId, spot::SpotId};

/// A single endorsement. Serialised as the integer `1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
  Up,
  Down,
}

impl VoteValue {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }
}

impl TryFrom<i64> for VoteValue {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      1 => Ok(Self::Up),
      -1 => Ok(Self::Down),
      other => Err(Error::InvalidVote(other)),
    }
  }
}

impl From<VoteValue> for i64 {
  fn from(v: VoteValue) -> Self { v.as_i64() }
}

/// A stored vote row, keyed by `(spot_id, voter_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub spot_id:  SpotId,
  pub voter_id: VoterId,
  pub value:    VoteValue,
}

/// What a vote request does to the aggregate score and the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
  /// Amount to add to the spot's score.
  pub delta: i64,
  /// The vote row after the request; `None` means the row is deleted.
  pub next:  Option<VoteValue>,
}

impl VoteOutcome {
  pub fn is_retraction(&self) -> bool { self.next.is_none() }
}

/// Resolve a vote request against the voter's current vote.
pub fn tally(current: Option<VoteValue>, requested: VoteValue) -> VoteOutcome {
  match current {
    Some(existing) if existing == requested => VoteOutcome {
      delta: -existing.as_i64(),
      next:  None,
    },
    Some(existing) => VoteOutcome {
      delta: requested.as_i64() - existing.as_i64(),
      next:  Some(requested),
    },
    None => VoteOutcome {
      delta: requested.as_i64(),
      next:  Some(requested),
    },
  }
}

/// Result of a committed vote, as reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
  pub spot_id: SpotId,
  /// The voter's vote after the request, `None` after a retraction.
  pub vote:    Option<VoteValue>,
  pub delta:   i64,
  /// The spot's aggregate score after the request.
  pub score:   i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_vote_applies_its_value() {
    assert_eq!(tally(None, VoteValue::Up), VoteOutcome {
      delta: 1,
      next:  Some(VoteValue::Up),
    });
    assert_eq!(tally(None, VoteValue::Down).delta, -1);
  }

  #[test]
  fn repeating_a_vote_retracts_it() {
    let outcome = tally(Some(VoteValue::Up), VoteValue::Up);
    assert!(outcome.is_retraction());
    assert_eq!(outcome.delta, -1);

    let outcome = tally(Some(VoteValue::Down), VoteValue::Down);
    assert!(outcome.is_retraction());
    assert_eq!(outcome.delta, 1);
  }

  #[test]
  fn flipping_moves_the_score_by_two() {
    assert_eq!(tally(Some(VoteValue::Up), VoteValue::Down).delta, -2);
    assert_eq!(tally(Some(VoteValue::Down), VoteValue::Up).delta, 2);
    assert_eq!(
      tally(Some(VoteValue::Down), VoteValue::Up).next,
      Some(VoteValue::Up)
    );
  }

  #[test]
  fn cast_then_retract_restores_the_score() {
    let start = 7;
    let cast = tally(None, VoteValue::Up);
    let retract = tally(cast.next, VoteValue::Up);
    assert_eq!(start + cast.delta + retract.delta, start);
    assert_eq!(retract.next, None);
  }

  #[test]
  fn values_decode_from_plus_minus_one_only() {
    assert_eq!(serde_json::from_str::<VoteValue>("1").unwrap(), VoteValue::Up);
    assert_eq!(
      serde_json::from_str::<VoteValue>("-1").unwrap(),
      VoteValue::Down
    );
    assert!(serde_json::from_str::<VoteValue>("0").is_err());
    assert!(serde_json::from_str::<VoteValue>("2").is_err());
    assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "-1");
  }
}
