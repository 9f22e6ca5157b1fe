//! [`NominatimGeocoder`] — place search against a Nominatim-compatible
//! endpoint.

use std::time::Duration;

use biriyani_core::{geocode::Geocoder, spot::Coordinates};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

fn default_base_url() -> String { "https://nominatim.openstreetmap.org".to_owned() }

fn default_user_agent() -> String { "BiriyaniMap/1.0".to_owned() }

fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Nominatim's usage policy requires an identifying User-Agent.
  #[serde(default = "default_user_agent")]
  pub user_agent:   String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      user_agent:   default_user_agent(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
  #[error("unparseable coordinates {lat:?}, {lon:?}")]
  BadCoordinates { lat: String, lon: String },
}

/// One search hit. Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct Hit {
  lat: String,
  lon: String,
}

impl Hit {
  fn coordinates(self) -> Result<Coordinates, GeocodeError> {
    let parsed = self
      .lat
      .trim()
      .parse::<f64>()
      .ok()
      .zip(self.lon.trim().parse::<f64>().ok())
      .and_then(|(lat, lng)| Coordinates::new(lat, lng).ok());
    parsed.ok_or(GeocodeError::BadCoordinates { lat: self.lat, lon: self.lon })
  }
}

pub struct NominatimGeocoder {
  client:   Client,
  base_url: String,
}

impl NominatimGeocoder {
  pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
    let client = Client::builder()
      .user_agent(config.user_agent.as_str())
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
    })
  }
}

impl Geocoder for NominatimGeocoder {
  type Error = GeocodeError;

  async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let hits: Vec<Hit> = self
      .client
      .get(format!("{}/search", self.base_url))
      .query(&[("q", query), ("format", "json"), ("limit", "1")])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    let hit = hits.into_iter().next().map(Hit::coordinates).transpose()?;
    tracing::debug!(query, found = hit.is_some(), "geocoded");
    Ok(hit)
  }
}
