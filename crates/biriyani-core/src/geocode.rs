//! Free-text place search.

use std::future::Future;

use crate::spot::Coordinates;

/// Turns a free-text query ("Uttara", "Mirpur 10") into the best-matching
/// coordinates. No match is `Ok(None)`, not an error.
pub trait Geocoder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn lookup<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Option<Coordinates>, Self::Error>> + Send + 'a;
}
