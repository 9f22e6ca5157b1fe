//! [`SqliteStore`] — the SQLite implementation of [`SpotStore`].

use std::path::Path;

use biriyani_core::{
  identity::VoterId,
  spot::{NewSpot, Spot, SpotId},
  store::{SpotQuery, SpotStore},
  vote::{VoteReceipt, VoteValue, tally},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawSpot, SPOT_COLUMNS, encode_dt, encode_food_type, encode_spot_id},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Biriyani Map store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Flip a spot's visibility flag directly.
  #[cfg(test)]
  pub(crate) async fn set_visible(&self, id: SpotId, visible: bool) -> Result<()> {
    let id_str = encode_spot_id(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE spots SET is_visible = ?2 WHERE spot_id = ?1",
          rusqlite::params![id_str, visible],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of stored vote rows for a spot.
  #[cfg(test)]
  pub(crate) async fn vote_rows(&self, id: SpotId) -> Result<i64> {
    let id_str = encode_spot_id(id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT COUNT(*) FROM votes WHERE spot_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }
}

fn decode_vote(raw: i64) -> rusqlite::Result<VoteValue> {
  VoteValue::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, raw))
}

// ─── SpotStore impl ──────────────────────────────────────────────────────────

impl SpotStore for SqliteStore {
  type Error = Error;

  async fn fetch_spots(&self, query: &SpotQuery) -> Result<Vec<Spot>> {
    let bounds    = query.bounds;
    let food_type = query.filter.food_type.map(encode_food_type);
    let min_score = query.filter.min_level.and_then(|l| l.min_score());
    let limit_val = query.effective_limit() as i64;

    let raws: Vec<RawSpot> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SPOT_COLUMNS}
           FROM spots
           WHERE is_visible = 1
             AND (?1 IS NULL OR (lat BETWEEN ?1 AND ?3 AND lng BETWEEN ?2 AND ?4))
             AND (?5 IS NULL OR food_type = ?5)
             AND (?6 IS NULL OR score >= ?6)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?7"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              bounds.map(|b| b.south),
              bounds.map(|b| b.west),
              bounds.map(|b| b.north),
              bounds.map(|b| b.east),
              food_type,
              min_score,
              limit_val,
            ],
            RawSpot::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(count = raws.len(), "fetched spots");
    raws.into_iter().map(RawSpot::into_spot).collect()
  }

  async fn get_spot(&self, id: SpotId) -> Result<Option<Spot>> {
    let id_str = encode_spot_id(id);

    let raw: Option<RawSpot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SPOT_COLUMNS} FROM spots WHERE spot_id = ?1 AND is_visible = 1"
              ),
              rusqlite::params![id_str],
              RawSpot::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSpot::into_spot).transpose()
  }

  async fn insert_spot(&self, input: NewSpot) -> Result<Spot> {
    let spot = input.validate()?.into_spot(SpotId::new_v4(), Utc::now());

    let id_str      = encode_spot_id(spot.id);
    let title       = spot.title.clone();
    let description = spot.description.clone();
    let (lat, lng)  = (spot.lat, spot.lng);
    let food_type   = spot.food_type.map(encode_food_type);
    let time_str    = spot.time.map(encode_dt);
    let at_str      = encode_dt(spot.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO spots (
             spot_id, title, description, lat, lng, food_type, time,
             score, is_visible, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 1, ?8)",
          rusqlite::params![
            id_str,
            title,
            description,
            lat,
            lng,
            food_type,
            time_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(spot_id = %spot.id, title = %spot.title, "spot created");
    Ok(spot)
  }

  async fn get_vote(&self, spot_id: SpotId, voter: &VoterId) -> Result<Option<VoteValue>> {
    let id_str    = encode_spot_id(spot_id);
    let voter_str = voter.as_str().to_owned();

    let vote = self
      .conn
      .call(move |conn| {
        let raw: Option<i64> = conn
          .query_row(
            "SELECT value FROM votes WHERE spot_id = ?1 AND voter_id = ?2",
            rusqlite::params![id_str, voter_str],
            |r| r.get(0),
          )
          .optional()?;
        Ok(raw.map(decode_vote).transpose()?)
      })
      .await?;

    Ok(vote)
  }

  async fn cast_vote(
    &self,
    spot_id: SpotId,
    voter:   &VoterId,
    value:   VoteValue,
  ) -> Result<VoteReceipt> {
    let id_str    = encode_spot_id(spot_id);
    let voter_str = voter.as_str().to_owned();
    let at_str    = encode_dt(Utc::now());

    // Read, decide and write inside one transaction so the score and the
    // vote row can never disagree.
    let receipt = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let score: Option<i64> = tx
          .query_row(
            "SELECT score FROM spots WHERE spot_id = ?1 AND is_visible = 1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(score) = score else {
          return Ok(None);
        };

        let current = tx
          .query_row(
            "SELECT value FROM votes WHERE spot_id = ?1 AND voter_id = ?2",
            rusqlite::params![id_str, voter_str],
            |r| r.get::<_, i64>(0),
          )
          .optional()?
          .map(decode_vote)
          .transpose()?;

        let outcome = tally(current, value);
        match outcome.next {
          Some(next) => {
            tx.execute(
              "INSERT INTO votes (spot_id, voter_id, value, updated_at)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (spot_id, voter_id)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
              rusqlite::params![id_str, voter_str, next.as_i64(), at_str],
            )?;
          }
          None => {
            tx.execute(
              "DELETE FROM votes WHERE spot_id = ?1 AND voter_id = ?2",
              rusqlite::params![id_str, voter_str],
            )?;
          }
        }
        tx.execute(
          "UPDATE spots SET score = score + ?2 WHERE spot_id = ?1",
          rusqlite::params![id_str, outcome.delta],
        )?;
        tx.commit()?;

        Ok(Some(VoteReceipt {
          spot_id,
          vote: outcome.next,
          delta: outcome.delta,
          score: score + outcome.delta,
        }))
      })
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
