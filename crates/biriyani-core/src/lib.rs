//! Core types and trait definitions for Biriyani Map.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Store adapters, the API and the server all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod geocode;
pub mod identity;
pub mod marker;
pub mod session;
pub mod spot;
pub mod store;
pub mod trust;
pub mod vote;

pub use error::{Error, Result};
