//! [`SupabaseAuth`] — voter identity from Supabase auth sessions.

use biriyani_core::identity::{IdentityProvider, VoterId};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::{
  Error, Result,
  client::{Project, SupabaseConfig, check},
};

pub(crate) const USER_PATH: &str = "/auth/v1/user";

#[derive(Debug, Deserialize)]
struct AuthUser {
  id: String,
}

/// Resolves a browser's access token to the Supabase user id behind it.
#[derive(Clone)]
pub struct SupabaseAuth {
  project: Project,
}

impl SupabaseAuth {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    Ok(Self { project: Project::new(config)? })
  }
}

impl IdentityProvider for SupabaseAuth {
  type Error = Error;

  async fn resolve(&self, token: &str) -> Result<Option<VoterId>> {
    let resp = self
      .project
      .as_user(Method::GET, USER_PATH, token)
      .send()
      .await?;

    if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
      return Ok(None);
    }
    let user: AuthUser = check("GET", USER_PATH, resp).await?.json().await?;
    Ok(VoterId::new(user.id).ok())
  }
}
