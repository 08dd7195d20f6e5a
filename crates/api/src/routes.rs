use std::sync::Arc;

use advisor_core::allocation::{self, DEFAULT_INVESTMENT, DEFAULT_PREVIEW_LIMIT};
use advisor_core::dataset::DatasetCache;
use advisor_core::domain::profile::{self, Horizon, RiskProfile};
use advisor_core::domain::{AllocationRecord, PreviewRow};
use advisor_core::session::{Selection, SelectionSource, Session, SessionStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub datasets: Arc<DatasetCache>,
    pub sessions: Arc<SessionStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/profiles", get(list_profiles))
        .route("/profiles/:profile/preview", get(get_preview))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/suggestion", get(get_suggestion))
        .route("/sessions/:id/selection", post(post_selection))
        .route("/sessions/:id/allocation", post(post_allocation))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct ProfileView {
    profile: RiskProfile,
    cluster_id: i64,
}

async fn list_profiles() -> Json<Vec<ProfileView>> {
    Json(
        RiskProfile::ALL
            .into_iter()
            .map(|profile| ProfileView {
                profile,
                cluster_id: profile.cluster_id(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PreviewView {
    profile: RiskProfile,
    rows: Vec<PreviewRow>,
}

async fn get_preview(
    State(state): State<AppState>,
    Path(label): Path<String>,
    Query(q): Query<PreviewQuery>,
) -> Result<Json<PreviewView>, ApiError> {
    let profile = profile::select_manual(&label)?;
    let dataset = state.datasets.get().await?;
    let rows = allocation::preview(
        &dataset.instruments,
        profile,
        q.limit.unwrap_or(DEFAULT_PREVIEW_LIMIT),
    );
    Ok(Json(PreviewView { profile, rows }))
}

#[derive(Debug, Serialize)]
struct SessionView {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    selection: Option<Selection>,
    last_investment: Option<f64>,
}

impl From<Session> for SessionView {
    fn from(s: Session) -> Self {
        Self {
            session_id: s.id,
            created_at: s.created_at,
            selection: s.selection,
            last_investment: s.last_investment,
        }
    }
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create(Utc::now());
    tracing::debug!(session_id = %session.id, "session created");
    (StatusCode::CREATED, Json(session.into()))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.get(id, Utc::now())?;
    Ok(Json(session.into()))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct SuggestionQuery {
    age: u32,
    horizon: String,
}

#[derive(Debug, Serialize)]
struct SuggestionView {
    age: u32,
    horizon: Horizon,
    profile: RiskProfile,
    cluster_id: i64,
}

fn suggest_checked(age: u32, horizon: &str) -> Result<SuggestionView, ApiError> {
    let age = profile::validate_age(age)?;
    let horizon: Horizon = horizon.parse()?;
    let profile = profile::suggest(age, horizon);
    Ok(SuggestionView {
        age,
        horizon,
        profile,
        cluster_id: profile.cluster_id(),
    })
}

async fn get_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<SuggestionQuery>,
) -> Result<Json<SuggestionView>, ApiError> {
    // Touch the session so unknown ids fail the same way as the other routes.
    state.sessions.get(id, Utc::now())?;
    Ok(Json(suggest_checked(q.age, &q.horizon)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SelectionRequest {
    Suggest { age: u32, horizon: String },
    Manual(String),
}

async fn post_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<Selection>, ApiError> {
    let (profile, source) = match req {
        SelectionRequest::Suggest { age, horizon } => {
            (suggest_checked(age, &horizon)?.profile, SelectionSource::Suggested)
        }
        SelectionRequest::Manual(label) => {
            (profile::select_manual(&label)?, SelectionSource::Manual)
        }
    };

    let selection = state.sessions.commit(id, profile, source, Utc::now())?;
    tracing::info!(session_id = %id, profile = %selection.profile, source = ?selection.source, "profile committed");
    Ok(Json(selection))
}

#[derive(Debug, Deserialize)]
struct AllocationRequest {
    total_investment: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AllocationView {
    profile: RiskProfile,
    cluster_id: i64,
    total_investment: f64,
    primary: Option<AllocationRecord>,
    items: Vec<AllocationRecord>,
}

async fn post_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AllocationRequest>,
) -> Result<Json<AllocationView>, ApiError> {
    let total_investment = req.total_investment.unwrap_or(DEFAULT_INVESTMENT);
    let dataset = state.datasets.get().await?;
    let (profile, items) =
        state
            .sessions
            .allocate(id, &dataset.instruments, total_investment, Utc::now())?;

    Ok(Json(AllocationView {
        profile,
        cluster_id: profile.cluster_id(),
        total_investment,
        primary: items.first().cloned(),
        items,
    }))
}
