//! In-memory backend for Biriyani Map.
//!
//! Used in local/dev mode when no database is configured, and as the fixture
//! store in tests. Nothing survives a restart.

mod store;

pub use store::MemoryStore;
