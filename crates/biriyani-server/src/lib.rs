//! Server wiring for Biriyani Map: configuration, the self-hosted token
//! directory and the Nominatim geocoder. The binary in `main.rs` picks a
//! store backend from configuration and serves [`biriyani_api`] over HTTP.

pub mod auth;
pub mod config;
pub mod geocode;
