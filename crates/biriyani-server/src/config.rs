//! Server configuration, layered from an optional TOML file and
//! `BIRIYANI__*` environment variables.

use std::path::{Path, PathBuf};

use biriyani_store_supabase::SupabaseConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{auth::VoterEntry, geocode::GeocoderConfig};

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  #[serde(default)]
  pub backend:  Backend,
  #[serde(default)]
  pub geocoder: GeocoderConfig,
  /// Bearer tokens accepted by the self-hosted backends.
  #[serde(default)]
  pub voters:   Vec<VoterEntry>,
}

/// Where spots and votes live.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
  /// Process memory, seeded with demo spots. Lost on restart.
  #[default]
  Memory,
  Sqlite {
    path: PathBuf,
  },
  /// A Supabase project; voter identity comes from its auth service.
  Supabase(SupabaseConfig),
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay the environment, e.g.
  /// `BIRIYANI__PORT=9000` or `BIRIYANI__BACKEND__KIND=sqlite`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("BIRIYANI")
          .prefix_separator("__")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
