//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed microsecond precision so they
//! sort lexicographically. UUIDs are hyphenated lowercase strings.

use biriyani_core::spot::{FoodType, Spot, SpotId};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── SpotId ──────────────────────────────────────────────────────────────────

pub fn encode_spot_id(id: SpotId) -> String { id.0.hyphenated().to_string() }

pub fn decode_spot_id(s: &str) -> Result<SpotId> { Ok(SpotId(Uuid::parse_str(s)?)) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── FoodType ────────────────────────────────────────────────────────────────

pub fn encode_food_type(f: FoodType) -> String { f.as_ref().to_owned() }

pub fn decode_food_type(s: &str) -> Result<FoodType> { Ok(FoodType::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSpot::from_row`].
pub const SPOT_COLUMNS: &str = "spot_id, title, description, lat, lng, food_type, time, \
                                score, is_visible, created_at";

/// Raw values read directly from a `spots` row.
pub struct RawSpot {
  pub spot_id:     String,
  pub title:       String,
  pub description: Option<String>,
  pub lat:         f64,
  pub lng:         f64,
  pub food_type:   Option<String>,
  pub time:        Option<String>,
  pub score:       i64,
  pub is_visible:  bool,
  pub created_at:  String,
}

impl RawSpot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      spot_id:     row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      lat:         row.get(3)?,
      lng:         row.get(4)?,
      food_type:   row.get(5)?,
      time:        row.get(6)?,
      score:       row.get(7)?,
      is_visible:  row.get(8)?,
      created_at:  row.get(9)?,
    })
  }

  pub fn into_spot(self) -> Result<Spot> {
    Ok(Spot {
      id:          decode_spot_id(&self.spot_id)?,
      title:       self.title,
      description: self.description,
      lat:         self.lat,
      lng:         self.lng,
      food_type:   self.food_type.as_deref().map(decode_food_type).transpose()?,
      time:        self.time.as_deref().map(decode_dt).transpose()?,
      score:       self.score,
      is_visible:  self.is_visible,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_have_fixed_width() {
    let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let b = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
    assert_eq!(encode_dt(a).len(), encode_dt(b).len());
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn food_type_columns_match_labels() {
    assert_eq!(encode_food_type(FoodType::IftarPack), "Iftar Pack");
    assert_eq!(decode_food_type("Iftar Pack").unwrap(), FoodType::IftarPack);
    assert!(decode_food_type("Pizza").is_err());
  }

  #[test]
  fn every_food_type_survives_its_column() {
    use strum::IntoEnumIterator;
    for f in FoodType::iter() {
      assert_eq!(decode_food_type(&encode_food_type(f)).unwrap(), f);
    }
  }
}
