//! JSON HTTP API for Biriyani Map.
//!
//! Exposes an axum [`Router`] backed by any [`SpotStore`], with voter identity
//! from an [`IdentityProvider`] and place search from a [`Geocoder`].
//! TLS and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", biriyani_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod geocode;
pub mod spots;
pub mod stats;
pub mod votes;

use std::sync::Arc;

use axum::{Router, routing::get};
use biriyani_core::{geocode::Geocoder, identity::IdentityProvider, store::SpotStore};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, I, G> {
  pub store:    Arc<S>,
  pub identity: Arc<I>,
  pub geocoder: Arc<G>,
}

impl<S, I, G> AppState<S, I, G> {
  pub fn new(store: S, identity: I, geocoder: G) -> Self {
    Self {
      store:    Arc::new(store),
      identity: Arc::new(identity),
      geocoder: Arc::new(geocoder),
    }
  }
}

impl<S, I, G> Clone for AppState<S, I, G> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      geocoder: Arc::clone(&self.geocoder),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, I, G>(state: AppState<S, I, G>) -> Router<()>
where
  S: SpotStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  Router::new()
    // Spots
    .route("/spots", get(spots::list::<S, I, G>).post(spots::create::<S, I, G>))
    .route("/spots/{id}", get(spots::get_one::<S, I, G>))
    .route("/spots/{id}/marker", get(spots::marker::<S, I, G>))
    // Votes
    .route(
      "/spots/{id}/vote",
      get(votes::get_mine::<S, I, G>).post(votes::cast::<S, I, G>),
    )
    // Aggregates and lookups
    .route("/stats", get(stats::handler::<S, I, G>))
    .route("/geocode", get(geocode::handler::<S, I, G>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
