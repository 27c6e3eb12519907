//! HTTP API for the taskmaster server

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::StoreError;
use crate::models::{ActionRequest, CreateTask, ElapsedTime, Task, TaskAction, UpdateTask};
use crate::sort::{SortOrder, sort_tasks};
use crate::store::TaskRepository;
use crate::timer::format_hms;

/// Application state shared across handlers
pub struct AppState {
    pub store: Box<dyn TaskRepository>,
}

impl AppState {
    pub fn new(store: impl TaskRepository + 'static) -> Arc<Self> {
        Arc::new(Self {
            store: Box::new(store),
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/todos", get(list_tasks).post(create_task))
        .route(
            "/api/todos/{id}",
            get(get_task)
                .put(update_task)
                .delete(delete_task)
                .patch(apply_action),
        )
        .route("/api/todos/{id}/elapsed", get(task_elapsed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "taskmaster",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    sort: Option<String>,
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let order = match query.sort.as_deref() {
        Some(name) => name.parse::<SortOrder>().map_err(ApiError::invalid_input)?,
        None => SortOrder::default(),
    };

    let mut tasks = state.store.list();
    sort_tasks(&mut tasks, order);
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(body) = payload.map_err(ApiError::invalid_input)?;
    let description = body.description.unwrap_or_default();

    let task = state
        .store
        .create(&body.title, &description)
        .map_err(ApiError::invalid_input)?;

    tracing::info!(task_id = %task.id, title = %task.title, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.store.get(&id)?))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(body) = payload.map_err(ApiError::invalid_input)?;

    let task = state
        .store
        .update(&id, &body.title, &body.description)
        .map_err(|err| match err {
            StoreError::InvalidOperation(reason) => ApiError::invalid_input(reason),
            other => other.into(),
        })?;

    tracing::info!(task_id = %id, "Task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete(&id) {
        return Err(StoreError::not_found(id).into());
    }

    tracing::info!(task_id = %id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle completion or the timer
///
/// An unknown id is reported before the body is looked at.
async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    state.store.get(&id)?;

    let Json(body) = payload.map_err(ApiError::invalid_input)?;
    let action = body
        .action
        .parse::<TaskAction>()
        .map_err(|err| ApiError::bad_request(INVALID_ACTION, err))?;

    let task = match action {
        TaskAction::ToggleComplete => state.store.toggle_completion(&id)?,
        TaskAction::ToggleTimer => state.store.toggle_timer(&id)?,
    };

    tracing::info!(
        task_id = %id,
        action = ?action,
        completed = task.completed,
        timer_running = task.is_running(),
        time_spent = %format_hms(task.time_spent),
        "Task action applied"
    );
    Ok(Json(task))
}

async fn task_elapsed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ElapsedTime>, ApiError> {
    Ok(Json(state.store.elapsed(&id)?))
}

const NOT_FOUND: &str = "Not Found";
const INVALID_INPUT: &str = "Invalid input";
const INVALID_ACTION: &str = "Invalid action";
const INVALID_OPERATION: &str = "Invalid operation";

/// API error type
///
/// Clients see a short fixed message; the detailed reason only goes to the log.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest {
        message: &'static str,
        reason: String,
    },
}

impl ApiError {
    fn bad_request(message: &'static str, reason: impl Display) -> Self {
        Self::BadRequest {
            message,
            reason: reason.to_string(),
        }
    }

    fn invalid_input(reason: impl Display) -> Self {
        Self::bad_request(INVALID_INPUT, reason)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::InvalidOperation(reason) => Self::bad_request(INVALID_OPERATION, reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(id) => {
                tracing::debug!(task_id = %id, "Task not found");
                (StatusCode::NOT_FOUND, NOT_FOUND)
            }
            ApiError::BadRequest { message, reason } => {
                tracing::warn!(%reason, "{}", message);
                (StatusCode::BAD_REQUEST, message)
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
