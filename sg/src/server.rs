//! HTTP surface for the planning operations

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::domain::{GoalContext, History};
use crate::planning::{Planner, PlanningError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PlanningError> for AppError {
    fn from(err: PlanningError) -> Self {
        let status = match &err {
            PlanningError::Upstream(_) => StatusCode::BAD_GATEWAY,
            PlanningError::Prompt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(%status, error = %err, "request failed");
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DecompositionRequest {
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub personalization: Option<String>,
    #[serde(default)]
    pub history: History,
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest {
    pub primary_goal: Option<String>,
    pub task: Option<String>,
    #[serde(default)]
    pub personalization: Option<String>,
    #[serde(default)]
    pub history: History,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub history: History,
}

/// A required string field must be present and non-blank
fn require(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::bad_request(format!("{field} is required"))),
    }
}

impl DecompositionRequest {
    fn into_goal(self) -> Result<GoalContext, AppError> {
        Ok(GoalContext::new(require("primary_goal", self.primary_goal)?)
            .with_personalization(self.personalization.unwrap_or_default())
            .with_history(self.history))
    }
}

impl OptionsRequest {
    fn into_parts(self) -> Result<(GoalContext, String), AppError> {
        let goal = GoalContext::new(require("primary_goal", self.primary_goal)?)
            .with_personalization(self.personalization.unwrap_or_default())
            .with_history(self.history);
        let task = require("task", self.task)?;
        Ok((goal, task))
    }
}

impl SummarizeRequest {
    fn into_goal(self) -> Result<GoalContext, AppError> {
        Ok(GoalContext::new(require("primary_goal", self.primary_goal)?).with_history(self.history))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(planner: Arc<Planner>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/decomposition", post(decomposition))
        .route("/options", post(options))
        .route("/summarize", post(summarize))
        .with_state(planner)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Bind the listener; `bind` may be an IPv4/IPv6 address or a hostname
pub async fn bind_listener(bind: &str, port: u16) -> Result<TcpListener> {
    debug!(%bind, port, "bind_listener: called");
    let listener = TcpListener::bind((bind, port))
        .await
        .wrap_err_with(|| format!("Failed to bind {bind} port {port}"))?;
    Ok(listener)
}

pub async fn run_serve(planner: Arc<Planner>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(planner);
    let listener = bind_listener(bind, port).await?;
    info!("subgoal listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("subgoal shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn decomposition(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<DecompositionRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, AppError> {
    let Json(request) = payload?;
    debug!(?request, "decomposition: request");
    let goal = request.into_goal()?;
    Ok(Json(planner.decomposition(&goal).await?))
}

async fn options(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<OptionsRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, AppError> {
    let Json(request) = payload?;
    debug!(?request, "options: request");
    let (goal, task) = request.into_parts()?;
    Ok(Json(planner.options(&goal, &task).await?))
}

async fn summarize(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(request) = payload?;
    debug!(?request, "summarize: request");
    let goal = request.into_goal()?;
    Ok(Json(planner.summarize(&goal).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
