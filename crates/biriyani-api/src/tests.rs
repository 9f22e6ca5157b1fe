//! Router tests against the in-memory fixture store.

use std::convert::Infallible;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use biriyani_core::{
  geocode::Geocoder,
  identity::{IdentityProvider, VoterId},
  spot::{Coordinates, SpotId},
  store::{SpotQuery, SpotStore},
};
use biriyani_store_memory::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, api_router};

// ─── Stubs ────────────────────────────────────────────────────────────────────

/// Accepts `token-<name>` as the voter `<name>`.
struct PrefixTokens;

impl IdentityProvider for PrefixTokens {
  type Error = Infallible;

  async fn resolve(&self, token: &str) -> Result<Option<VoterId>, Infallible> {
    Ok(token.strip_prefix("token-").and_then(|name| VoterId::new(name).ok()))
  }
}

/// Knows exactly one place.
struct OnePlace;

impl Geocoder for OnePlace {
  type Error = std::io::Error;

  async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, std::io::Error> {
    match query {
      "Uttara" => Ok(Some(Coordinates { lat: 23.8759, lng: 90.3795 })),
      "offline" => Err(std::io::Error::other("geocoder unreachable")),
      _ => Ok(None),
    }
  }
}

type State = AppState<MemoryStore, PrefixTokens, OnePlace>;

fn make_state() -> State { AppState::new(MemoryStore::fixture(), PrefixTokens, OnePlace) }

fn fixture_id(n: u128) -> SpotId { SpotId(Uuid::from_u128(n)) }

async fn oneshot_raw(
  state: State,
  method: &str,
  uri: &str,
  headers: Vec<(header::HeaderName, &str)>,
  body: &str,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let req = builder.body(Body::from(body.to_string())).unwrap();
  api_router(state).oneshot(req).await.unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn vote(state: State, id: SpotId, token: &str, value: i64) -> axum::response::Response {
  let auth = format!("Bearer {token}");
  oneshot_raw(
    state,
    "POST",
    &format!("/spots/{id}/vote"),
    vec![
      (header::AUTHORIZATION, auth.as_str()),
      (header::CONTENT_TYPE, "application/json"),
    ],
    &json!({ "value": value }).to_string(),
  )
  .await
}

// ── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_fixture_with_levels() {
  let resp = oneshot_raw(make_state(), "GET", "/spots", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  let levels: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["level"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(levels, ["confirmed", "almost-confirmed", "unconfirmed"]);
  assert_eq!(body[0]["title"], "Biriyani at Park");
}

#[tokio::test]
async fn list_filters_by_bounding_box() {
  let uri = "/spots?south=23.810&west=90.410&north=23.816&east=90.413";
  let body = json_body(oneshot_raw(make_state(), "GET", uri, vec![], "").await).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["score"], 12);
}

#[tokio::test]
async fn list_filters_by_level_and_food_type() {
  let body =
    json_body(oneshot_raw(make_state(), "GET", "/spots?level=almost-confirmed", vec![], "").await)
      .await;
  assert_eq!(body.as_array().unwrap().len(), 2);

  let body =
    json_body(oneshot_raw(make_state(), "GET", "/spots?food_type=water", vec![], "").await).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["food_type"], "Water");
}

#[tokio::test]
async fn partial_bounding_box_is_bad_request() {
  let resp = oneshot_raw(make_state(), "GET", "/spots?south=23.8&north=23.9", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn antimeridian_box_is_bad_request() {
  let uri = "/spots?south=-10&west=170&north=10&east=-170";
  let resp = oneshot_raw(make_state(), "GET", uri, vec![], "").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get() {
  let state = make_state();
  let body = json!({
    "title": "Tehari at Mirpur 10",
    "description": "After Asr",
    "lat": 23.8069,
    "lng": 90.3687,
    "food_type": "Tehari"
  });
  let resp = oneshot_raw(
    state.clone(),
    "POST",
    "/spots",
    vec![(header::CONTENT_TYPE, "application/json")],
    &body.to_string(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  assert_eq!(created["score"], 0);
  assert_eq!(created["level"], "unconfirmed");
  assert_eq!(created["is_visible"], true);

  let id = created["id"].as_str().unwrap();
  let resp = oneshot_raw(state, "GET", &format!("/spots/{id}"), vec![], "").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["title"], "Tehari at Mirpur 10");
}

#[tokio::test]
async fn create_with_blank_title_is_bad_request() {
  let state = make_state();
  let body = json!({ "title": "   ", "lat": 23.8, "lng": 90.4 }).to_string();
  let resp = oneshot_raw(
    state.clone(),
    "POST",
    "/spots",
    vec![(header::CONTENT_TYPE, "application/json")],
    &body,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let spots = state.store.fetch_spots(&SpotQuery::default()).await.unwrap();
  assert_eq!(spots.len(), 3);
}

#[tokio::test]
async fn malformed_create_body_is_json_bad_request() {
  let resp = oneshot_raw(
    make_state(),
    "POST",
    "/spots",
    vec![(header::CONTENT_TYPE, "application/json")],
    r#"{"lat": 23.8, "lng": 90.4}"#,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn unknown_spot_is_404() {
  let uri = format!("/spots/{}", SpotId::new_v4());
  let resp = oneshot_raw(make_state(), "GET", &uri, vec![], "").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn marker_is_svg_in_tier_colour() {
  let uri = format!("/spots/{}/marker", fixture_id(2));
  let resp = oneshot_raw(make_state(), "GET", &uri, vec![], "").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");

  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let svg = std::str::from_utf8(&bytes).unwrap();
  assert!(svg.starts_with("<svg"), "svg: {svg}");
  assert!(svg.contains("#eab308"), "svg: {svg}");
}

// ── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_without_token_is_401_and_changes_nothing() {
  let state = make_state();
  let id = fixture_id(2);
  let resp = oneshot_raw(
    state.clone(),
    "POST",
    &format!("/spots/{id}/vote"),
    vec![(header::CONTENT_TYPE, "application/json")],
    r#"{"value":1}"#,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
  assert_eq!(state.store.get_spot(id).await.unwrap().unwrap().score, 7);
}

#[tokio::test]
async fn vote_with_unknown_token_is_401() {
  let resp = vote(make_state(), fixture_id(2), "nonsense", 1).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn votes_promote_a_spot_and_retract() {
  let state = make_state();
  let id = fixture_id(2);

  for (n, name) in ["a", "b"].iter().enumerate() {
    let resp = vote(state.clone(), id, &format!("token-{name}"), 1).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["score"], 8 + n as i64);
  }

  let resp = vote(state.clone(), id, "token-c", 1).await;
  let body = json_body(resp).await;
  assert_eq!(body["score"], 10);
  assert_eq!(body["delta"], 1);
  assert_eq!(body["vote"], 1);
  assert_eq!(body["level"], "confirmed");

  let resp = vote(state.clone(), id, "token-c", 1).await;
  let body = json_body(resp).await;
  assert_eq!(body["score"], 9);
  assert_eq!(body["vote"], Value::Null);
  assert_eq!(body["level"], "almost-confirmed");
}

#[tokio::test]
async fn flip_moves_score_by_two() {
  let state = make_state();
  let id = fixture_id(3);
  vote(state.clone(), id, "token-a", 1).await;
  let body = json_body(vote(state, id, "token-a", -1).await).await;
  assert_eq!(body["delta"], -2);
  assert_eq!(body["score"], 1);
}

#[tokio::test]
async fn out_of_range_vote_is_bad_request() {
  let state = make_state();
  let resp = vote(state.clone(), fixture_id(1), "token-a", 2).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(state.store.get_spot(fixture_id(1)).await.unwrap().unwrap().score, 12);
}

#[tokio::test]
async fn non_numeric_vote_is_json_bad_request() {
  let state = make_state();
  let resp = oneshot_raw(
    state.clone(),
    "POST",
    &format!("/spots/{}/vote", fixture_id(1)),
    vec![
      (header::AUTHORIZATION, "Bearer token-a"),
      (header::CONTENT_TYPE, "application/json"),
    ],
    r#"{"value": "up"}"#,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
  assert_eq!(state.store.get_spot(fixture_id(1)).await.unwrap().unwrap().score, 12);
}

#[tokio::test]
async fn vote_on_unknown_spot_is_404() {
  let resp = vote(make_state(), SpotId::new_v4(), "token-a", 1).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_vote_reflects_the_last_cast() {
  let state = make_state();
  let id = fixture_id(1);
  let uri = format!("/spots/{id}/vote");

  let resp = oneshot_raw(
    state.clone(),
    "GET",
    &uri,
    vec![(header::AUTHORIZATION, "Bearer token-a")],
    "",
  )
  .await;
  assert_eq!(json_body(resp).await["vote"], Value::Null);

  vote(state.clone(), id, "token-a", -1).await;
  let resp = oneshot_raw(state, "GET", &uri, vec![(header::AUTHORIZATION, "Bearer token-a")], "")
    .await;
  let body = json_body(resp).await;
  assert_eq!(body["vote"], -1);
  assert_eq!(body["spot_id"], id.to_string());
}

// ── Stats / geocode ─────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_each_tier() {
  let body = json_body(oneshot_raw(make_state(), "GET", "/stats", vec![], "").await).await;
  assert_eq!(
    body,
    json!({ "total": 3, "confirmed": 1, "almost_confirmed": 1, "unconfirmed": 1 })
  );
}

#[tokio::test]
async fn geocode_hit_and_miss() {
  let body = json_body(oneshot_raw(make_state(), "GET", "/geocode?q=Uttara", vec![], "").await).await;
  assert_eq!(body, json!({ "lat": 23.8759, "lng": 90.3795 }));

  let body =
    json_body(oneshot_raw(make_state(), "GET", "/geocode?q=Atlantis", vec![], "").await).await;
  assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn geocode_requires_a_query() {
  let resp = oneshot_raw(make_state(), "GET", "/geocode?q=%20", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let resp = oneshot_raw(make_state(), "GET", "/geocode", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn geocoder_failure_is_bad_gateway() {
  let resp = oneshot_raw(make_state(), "GET", "/geocode?q=offline", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
