//! SQL schema for the Biriyani Map SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS spots (
    spot_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    lat         REAL NOT NULL,
    lng         REAL NOT NULL,
    food_type   TEXT,              -- FoodType label, e.g. 'Iftar Pack'
    time        TEXT,              -- ISO 8601 UTC
    score       INTEGER NOT NULL DEFAULT 0,
    is_visible  INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL      -- ISO 8601 UTC, fixed width; sort key
);

-- One row per (spot, voter). Flips update in place; retractions delete.
CREATE TABLE IF NOT EXISTS votes (
    spot_id    TEXT NOT NULL REFERENCES spots(spot_id),
    voter_id   TEXT NOT NULL,
    value      INTEGER NOT NULL CHECK (value IN (-1, 1)),
    updated_at TEXT NOT NULL,
    PRIMARY KEY (spot_id, voter_id)
);

CREATE INDEX IF NOT EXISTS spots_created_idx ON spots(created_at);
CREATE INDEX IF NOT EXISTS spots_lat_lng_idx ON spots(lat, lng);

PRAGMA user_version = 1;
";
