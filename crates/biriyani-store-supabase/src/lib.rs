//! Live backend for Biriyani Map, talking to a Supabase project.
//!
//! Spots and votes are read and written through the project's PostgREST
//! interface. Votes go through the `cast_vote` database function shipped in
//! [`MIGRATION`], which updates the score and the vote row in one
//! transaction. Voter identity comes from the project's auth service.

mod auth;
mod client;
mod query;
mod store;

pub mod error;

pub use auth::SupabaseAuth;
pub use client::SupabaseConfig;
pub use error::{Error, Result};
pub use store::SupabaseStore;

/// Tables and the `cast_vote` function the adapter expects to exist.
pub const MIGRATION: &str = include_str!("../sql/schema.sql");
