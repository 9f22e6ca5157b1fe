//! Spots — user-submitted food distribution points — and the geometry used to
//! query them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  trust::{TrustLevel, classify},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque spot identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpotId(pub Uuid);

impl SpotId {
  pub fn new_v4() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for SpotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.hyphenated().fmt(f)
  }
}

impl FromStr for SpotId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

// ─── Food type ───────────────────────────────────────────────────────────────

/// What is being handed out. The string forms double as the stored column
/// values and the labels shown in the creation form.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum FoodType {
  Biriyani,
  Tehari,
  Water,
  #[serde(rename = "Iftar Pack")]
  #[strum(serialize = "Iftar Pack")]
  IftarPack,
  Other,
}

impl FoodType {
  /// Parse a stored or user-supplied label.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownFoodType(s.to_owned()))
  }
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinates {
  pub fn new(lat: f64, lng: f64) -> Result<Self> {
    let in_range = lat.is_finite()
      && lng.is_finite()
      && (-90.0..=90.0).contains(&lat)
      && (-180.0..=180.0).contains(&lng);
    if !in_range {
      return Err(Error::InvalidCoordinates { lat, lng });
    }
    Ok(Self { lat, lng })
  }
}

/// The rectangular extent of a map viewport.
///
/// Containment is inclusive on every edge and uses no projection correction.
/// Boxes crossing the antimeridian (`west > east`) are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
  pub south: f64,
  pub west:  f64,
  pub north: f64,
  pub east:  f64,
}

impl BoundingBox {
  pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self> {
    Coordinates::new(south, west)
      .and_then(|_| Coordinates::new(north, east))
      .map_err(|_| {
        Error::InvalidBounds(format!(
          "corners out of range: ({south}, {west}) / ({north}, {east})"
        ))
      })?;
    if south > north {
      return Err(Error::InvalidBounds(format!(
        "south {south} is above north {north}"
      )));
    }
    if west > east {
      return Err(Error::InvalidBounds(format!(
        "west {west} is east of {east}"
      )));
    }
    Ok(Self { south, west, north, east })
  }

  pub fn contains(&self, point: Coordinates) -> bool {
    (self.south..=self.north).contains(&point.lat)
      && (self.west..=self.east).contains(&point.lng)
  }
}

// ─── Spot ────────────────────────────────────────────────────────────────────

/// A spot as held by a store.
///
/// `score` is the sum of all live votes. The legacy `verified` flag some rows
/// still carry is ignored; trust is always derived from `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
  pub id:          SpotId,
  pub title:       String,
  pub description: Option<String>,
  pub lat:         f64,
  pub lng:         f64,
  pub food_type:   Option<FoodType>,
  /// When the distribution is scheduled to happen.
  pub time:        Option<DateTime<Utc>>,
  pub score:       i64,
  pub is_visible:  bool,
  /// Store-assigned; the newest-first ordering key.
  pub created_at:  DateTime<Utc>,
}

impl Spot {
  pub fn coordinates(&self) -> Coordinates {
    Coordinates { lat: self.lat, lng: self.lng }
  }

  pub fn trust_level(&self) -> TrustLevel { classify(self.score) }
}

/// Sub-second digits kept on stored timestamps. Postgres `timestamptz` and
/// the SQLite column encoding both stop at microseconds.
pub const TIMESTAMP_DIGITS: u16 = 6;

// ─── NewSpot ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SpotStore::insert_spot`]. Id, score, visibility
/// and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpot {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  pub lat:         f64,
  pub lng:         f64,
  #[serde(default)]
  pub food_type:   Option<FoodType>,
  #[serde(default)]
  pub time:        Option<DateTime<Utc>>,
}

impl NewSpot {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(title: impl Into<String>, lat: f64, lng: f64) -> Self {
    Self {
      title: title.into(),
      description: None,
      lat,
      lng,
      food_type: None,
      time: None,
    }
  }

  /// Check the input and return it in canonical form: title and description
  /// trimmed, blank description dropped, time cut to whole microseconds.
  pub fn validate(self) -> Result<Self> {
    let title = self.title.trim().to_owned();
    if title.is_empty() {
      return Err(Error::EmptyTitle);
    }
    let position = Coordinates::new(self.lat, self.lng)?;
    let description = self
      .description
      .map(|d| d.trim().to_owned())
      .filter(|d| !d.is_empty());

    Ok(Self {
      title,
      description,
      lat: position.lat,
      lng: position.lng,
      food_type: self.food_type,
      time: self.time.map(|t| t.trunc_subsecs(TIMESTAMP_DIGITS)),
    })
  }

  /// Materialise the spot a store would persist for this input.
  /// `created_at` is cut to whole microseconds.
  pub fn into_spot(self, id: SpotId, created_at: DateTime<Utc>) -> Spot {
    Spot {
      id,
      title: self.title,
      description: self.description,
      lat: self.lat,
      lng: self.lng,
      food_type: self.food_type,
      time: self.time,
      score: 0,
      is_visible: true,
      created_at: created_at.trunc_subsecs(TIMESTAMP_DIGITS),
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  fn dhaka_box() -> BoundingBox {
    BoundingBox::new(23.70, 90.30, 23.90, 90.50).unwrap()
  }

  #[test]
  fn box_edges_are_inclusive() {
    let b = dhaka_box();
    assert!(b.contains(Coordinates { lat: 23.70, lng: 90.30 }));
    assert!(b.contains(Coordinates { lat: 23.90, lng: 90.50 }));
    assert!(b.contains(Coordinates { lat: 23.70, lng: 90.50 }));
    assert!(b.contains(Coordinates { lat: 23.80, lng: 90.40 }));
  }

  #[test]
  fn one_unit_outside_any_edge_is_excluded() {
    let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0).unwrap();
    assert!(!b.contains(Coordinates { lat: 9.0, lng: 30.0 }));
    assert!(!b.contains(Coordinates { lat: 31.0, lng: 30.0 }));
    assert!(!b.contains(Coordinates { lat: 20.0, lng: 19.0 }));
    assert!(!b.contains(Coordinates { lat: 20.0, lng: 41.0 }));
  }

  #[test]
  fn inverted_boxes_are_rejected() {
    assert!(matches!(
      BoundingBox::new(30.0, 0.0, 10.0, 1.0),
      Err(Error::InvalidBounds(_))
    ));
    assert!(matches!(
      BoundingBox::new(0.0, 170.0, 1.0, -170.0),
      Err(Error::InvalidBounds(_))
    ));
    assert!(BoundingBox::new(0.0, 0.0, 95.0, 1.0).is_err());
  }

  #[test]
  fn validate_trims_and_drops_blank_description() {
    let mut input = NewSpot::new("  Biriyani at Park ", 23.815, 90.412);
    input.description = Some("   ".into());
    let clean = input.validate().unwrap();
    assert_eq!(clean.title, "Biriyani at Park");
    assert_eq!(clean.description, None);
  }

  #[test]
  fn validate_rejects_empty_title_and_bad_coordinates() {
    assert!(matches!(
      NewSpot::new("   ", 23.8, 90.4).validate(),
      Err(Error::EmptyTitle)
    ));
    assert!(matches!(
      NewSpot::new("Water", 91.0, 90.4).validate(),
      Err(Error::InvalidCoordinates { .. })
    ));
    assert!(NewSpot::new("Water", 23.8, f64::NAN).validate().is_err());
  }

  #[test]
  fn new_spots_start_visible_with_zero_score() {
    let spot = NewSpot::new("Tehari", 23.8, 90.4)
      .into_spot(SpotId::new_v4(), Utc::now());
    assert_eq!(spot.score, 0);
    assert!(spot.is_visible);
    assert_eq!(spot.trust_level(), TrustLevel::Unconfirmed);
  }

  #[test]
  fn food_type_labels_parse_both_ways() {
    for food in FoodType::iter() {
      assert_eq!(FoodType::parse(food.as_ref()).unwrap(), food);
    }
    assert_eq!(FoodType::parse("iftar pack").unwrap(), FoodType::IftarPack);
    assert_eq!(
      serde_json::to_string(&FoodType::IftarPack).unwrap(),
      "\"Iftar Pack\""
    );
    assert!(matches!(
      FoodType::parse("Pizza"),
      Err(Error::UnknownFoodType(_))
    ));
  }

  #[test]
  fn legacy_verified_flag_is_ignored() {
    let json = serde_json::json!({
      "id": "6f1c2f44-0d59-4a7c-8d3e-1a0b7f4f9e11",
      "title": "Water Distribution",
      "description": null,
      "lat": 23.812,
      "lng": 90.42,
      "food_type": "Water",
      "time": null,
      "score": 7,
      "is_visible": true,
      "verified": true,
      "created_at": "2025-03-01T12:00:00Z"
    });
    let spot: Spot = serde_json::from_value(json).unwrap();
    assert_eq!(spot.trust_level(), TrustLevel::AlmostConfirmed);
  }

  #[test]
  fn timestamps_are_cut_to_microseconds() {
    let precise = DateTime::parse_from_rfc3339("2025-03-10T18:05:00.123456789Z")
      .unwrap()
      .with_timezone(&Utc);
    let mut input = NewSpot::new("Tehari", 23.8, 90.4);
    input.time = Some(precise);

    let spot = input
      .validate()
      .unwrap()
      .into_spot(SpotId::new_v4(), precise);
    assert_eq!(spot.time.unwrap().timestamp_subsec_nanos(), 123_456_000);
    assert_eq!(spot.created_at.timestamp_subsec_nanos(), 123_456_000);
  }
}
