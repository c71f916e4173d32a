use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::gate::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tasks::dto::{CreateTaskRequest, DeleteTaskResponse, TaskFilters, UpdateTaskRequest};
use crate::tasks::repo;
use crate::tasks::repo_types::Task;

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    payload.validate()?;
    let task = repo::insert(&state.db, claims.sub, payload).await?;
    info!(task_id = %task.id, user_id = %claims.sub, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(filters): Query<TaskFilters>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = repo::list(&state.db, claims.sub, &filters).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = repo::find_one(&state.db, claims.sub, id).await?;
    Ok(Json(task))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    payload.validate()?;
    let task = repo::update(&state.db, claims.sub, id, &payload).await?;
    info!(task_id = %task.id, user_id = %claims.sub, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    repo::delete(&state.db, claims.sub, id).await?;
    info!(task_id = %id, user_id = %claims.sub, "task deleted");
    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
