//! Trust levels — the three-tier credibility classification of a spot.
//!
//! A trust level is never stored. It is derived from the aggregate vote score
//! every time a spot is read.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{Error, Result};

/// Score at which a spot becomes [`TrustLevel::AlmostConfirmed`].
pub const ALMOST_THRESHOLD: i64 = 5;

/// Score at which a spot becomes [`TrustLevel::Confirmed`].
pub const CONFIRMED_THRESHOLD: i64 = 10;

/// How much the community trusts a spot. Variants are declared lowest tier
/// first so the derived `Ord` ranks them.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TrustLevel {
  Unconfirmed,
  AlmostConfirmed,
  Confirmed,
}

/// Display metadata for a trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrustMeta {
  /// Solid marker fill.
  pub fill:  &'static str,
  /// Drop-shadow tint.
  pub glow:  &'static str,
  pub label: &'static str,
}

/// Classify a score. Intervals are closed-open, so 5 and 10 round up.
pub fn classify(score: i64) -> TrustLevel {
  if score >= CONFIRMED_THRESHOLD {
    TrustLevel::Confirmed
  } else if score >= ALMOST_THRESHOLD {
    TrustLevel::AlmostConfirmed
  } else {
    TrustLevel::Unconfirmed
  }
}

impl TrustLevel {
  /// Parse the kebab-case form used on the wire (`almost-confirmed`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownTrustLevel(s.to_owned()))
  }

  pub fn meta(self) -> TrustMeta {
    match self {
      Self::Confirmed => TrustMeta {
        fill:  "#16a34a",
        glow:  "rgba(22,163,74,0.35)",
        label: "Confirmed",
      },
      Self::AlmostConfirmed => TrustMeta {
        fill:  "#eab308",
        glow:  "rgba(234,179,8,0.30)",
        label: "Almost Confirmed",
      },
      Self::Unconfirmed => TrustMeta {
        fill:  "#94a3b8",
        glow:  "rgba(148,163,184,0.25)",
        label: "Unconfirmed",
      },
    }
  }

  /// Lowest score in this tier. `None` for the bottom tier, which has no
  /// lower bound.
  pub fn min_score(self) -> Option<i64> {
    match self {
      Self::Confirmed => Some(CONFIRMED_THRESHOLD),
      Self::AlmostConfirmed => Some(ALMOST_THRESHOLD),
      Self::Unconfirmed => None,
    }
  }
}

/// Shorthand for `classify(score).meta()`.
pub fn meta_for(score: i64) -> TrustMeta { classify(score).meta() }

/// Spot counts per tier, as shown in the header badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStats {
  pub total:            usize,
  pub confirmed:        usize,
  pub almost_confirmed: usize,
  pub unconfirmed:      usize,
}

impl TrustStats {
  pub fn from_scores(scores: impl IntoIterator<Item = i64>) -> Self {
    scores.into_iter().fold(Self::default(), |mut acc, score| {
      acc.total += 1;
      match classify(score) {
        TrustLevel::Confirmed => acc.confirmed += 1,
        TrustLevel::AlmostConfirmed => acc.almost_confirmed += 1,
        TrustLevel::Unconfirmed => acc.unconfirmed += 1,
      }
      acc
    })
  }
}
