//! biriyani-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! configured store backend and serves the JSON API over HTTP.
//!
//! # Voter tokens
//!
//! The memory and SQLite backends accept bearer tokens listed under
//! `[[voters]]`. To mint one:
//!
//! ```text
//! cargo run -p biriyani-server -- --new-token
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use biriyani_api::AppState;
use biriyani_core::{geocode::Geocoder, identity::IdentityProvider, store::SpotStore};
use biriyani_server::{
  auth::{TokenDirectory, mint_token},
  config::{Backend, ServerConfig},
  geocode::NominatimGeocoder,
};
use biriyani_store_memory::MemoryStore;
use biriyani_store_sqlite::SqliteStore;
use biriyani_store_supabase::{SupabaseAuth, SupabaseStore};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Biriyani Map API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a fresh voter token and its SHA-256 digest, then exit.
  #[arg(long)]
  new_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.new_token {
    let (token, digest) = mint_token();
    println!("token:        {token}");
    println!("token_sha256: {digest}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let geocoder =
    NominatimGeocoder::new(&cfg.geocoder).context("failed to build geocoder client")?;

  match &cfg.backend {
    Backend::Memory => {
      tracing::warn!("using the in-memory backend; data is lost on restart");
      serve(&cfg, MemoryStore::fixture(), tokens(&cfg)?, geocoder).await
    }
    Backend::Sqlite { path } => {
      let store = SqliteStore::open(path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(&cfg, store, tokens(&cfg)?, geocoder).await
    }
    Backend::Supabase(project) => {
      if !cfg.voters.is_empty() {
        tracing::warn!("[[voters]] is ignored with the supabase backend");
      }
      let store =
        SupabaseStore::new(project.clone()).context("failed to build supabase client")?;
      let auth = SupabaseAuth::new(project.clone()).context("failed to build auth client")?;
      serve(&cfg, store, auth, geocoder).await
    }
  }
}

fn tokens(cfg: &ServerConfig) -> anyhow::Result<TokenDirectory> {
  let dir = TokenDirectory::new(&cfg.voters).context("invalid [[voters]] entry")?;
  if dir.is_empty() {
    tracing::warn!("no voters configured; every vote will be rejected");
  }
  Ok(dir)
}

async fn serve<S, I, G>(cfg: &ServerConfig, store: S, identity: I, geocoder: G) -> anyhow::Result<()>
where
  S: SpotStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let state = AppState::new(store, identity, geocoder);
  let app = biriyani_api::api_router(state).layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
