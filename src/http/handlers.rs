//! Preview API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::{RequestContext, RouteOutcome};
use crate::snapshot::{Override, Profile, Scheme};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Query string of `GET /decision`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionQuery {
    #[serde(default = "no_tab")]
    pub tab_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    pub url: String,
}

fn no_tab() -> i64 {
    -1
}

/// A profile as shown to preview surfaces. Credentials are never exposed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub has_credentials: bool,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            has_credentials: profile.username.as_deref().is_some_and(|u| !u.is_empty()),
            id: profile.id,
            name: profile.name,
            scheme: profile.scheme,
            host: profile.host,
            port: profile.port,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub schema_version: u32,
    pub profiles: usize,
    pub rules: usize,
    pub enabled_rules: usize,
    pub tab_overrides: usize,
    pub group_overrides: usize,
}

pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_decision(
    State(state): State<AppState>,
    Query(query): Query<DecisionQuery>,
) -> Json<RouteOutcome> {
    let request = RequestContext::new(query.tab_id, query.group_id, query.url);
    Json(state.router.route(&request))
}

pub async fn get_profiles(State(state): State<AppState>) -> Json<Vec<ProfileSummary>> {
    let snapshot = state.router.store().current();
    Json(
        snapshot
            .profiles_with_builtin()
            .into_iter()
            .map(ProfileSummary::from)
            .collect(),
    )
}

pub async fn get_snapshot(State(state): State<AppState>) -> Json<SnapshotSummary> {
    let snapshot = state.router.store().current();
    Json(SnapshotSummary {
        schema_version: snapshot.schema_version,
        profiles: snapshot.profiles.len(),
        rules: snapshot.rules.len(),
        enabled_rules: snapshot.rules.iter().filter(|r| r.enabled).count(),
        tab_overrides: snapshot.tab_overrides.len(),
        group_overrides: snapshot.group_overrides.len(),
    })
}

fn reject_negative(subject: &str, id: i64) -> Option<Response> {
    (id < 0).then(|| {
        (StatusCode::BAD_REQUEST, format!("{subject} id must be non-negative")).into_response()
    })
}

pub async fn put_tab_override(
    State(state): State<AppState>,
    Path(tab_id): Path<i64>,
    Json(value): Json<Override>,
) -> Response {
    if let Some(rejection) = reject_negative("tab", tab_id) {
        return rejection;
    }
    tracing::info!(tab_id, ?value, "Setting tab override");
    state.router.store().set_tab_override(tab_id, Some(value));
    StatusCode::NO_CONTENT.into_response()
}

pub async fn delete_tab_override(
    State(state): State<AppState>,
    Path(tab_id): Path<i64>,
) -> Response {
    if let Some(rejection) = reject_negative("tab", tab_id) {
        return rejection;
    }
    tracing::info!(tab_id, "Clearing tab override");
    state.router.store().set_tab_override(tab_id, None);
    StatusCode::NO_CONTENT.into_response()
}

pub async fn put_group_override(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(value): Json<Override>,
) -> Response {
    if let Some(rejection) = reject_negative("group", group_id) {
        return rejection;
    }
    tracing::info!(group_id, ?value, "Setting group override");
    state.router.store().set_group_override(group_id, Some(value));
    StatusCode::NO_CONTENT.into_response()
}

pub async fn delete_group_override(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Response {
    if let Some(rejection) = reject_negative("group", group_id) {
        return rejection;
    }
    tracing::info!(group_id, "Clearing group override");
    state.router.store().set_group_override(group_id, None);
    StatusCode::NO_CONTENT.into_response()
}
