//! Shared HTTP plumbing for the store and auth adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::{Error, Result};

fn default_timeout_secs() -> u64 { 10 }

/// Connection settings for a Supabase project.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
  /// Project URL, e.g. `https://abcd.supabase.co`.
  pub url:          String,
  /// Public anon key; always sent as `apikey`.
  pub anon_key:     String,
  /// Service-role key used as the bearer for data calls when set, so writes
  /// are not subject to row-level policies meant for browsers.
  #[serde(default)]
  pub service_key:  Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

/// A configured `reqwest` client plus project settings.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub(crate) struct Project {
  client: Client,
  config: SupabaseConfig,
}

impl Project {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.url.trim_end_matches('/'), path)
  }

  /// A request carrying the project key and the data-access bearer.
  pub fn data(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
    let bearer = self
      .config
      .service_key
      .as_deref()
      .unwrap_or(&self.config.anon_key);
    self
      .client
      .request(method, self.url(path))
      .header("apikey", &self.config.anon_key)
      .bearer_auth(bearer)
  }

  /// A request carrying the project key and a caller's own token.
  pub fn as_user(&self, method: reqwest::Method, path: &str, token: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .header("apikey", &self.config.anon_key)
      .bearer_auth(token)
  }
}

/// Turn a non-2xx response into [`Error::Status`].
pub(crate) async fn check(
  method: &'static str,
  path: &str,
  resp: Response,
) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status {
    method,
    path: path.to_owned(),
    status: status.as_u16(),
    body,
  })
}
