use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{parse_status, CompleteTask, CreateTask, ListQuery, SortField, SortOrder, UpdateTask};
use super::repo_types::Task;
use crate::{
    auth::{extractors::CurrentUser, guard::ensure_user_scope},
    error::ApiError,
    state::AppState,
};

/// Routes that name the owner in the path. The scope guard runs before any
/// table access on every one of them.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/:user_id/tasks", get(list_tasks).post(create_task))
        .route(
            "/:user_id/tasks/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/:user_id/tasks/:task_id/complete", patch(complete_task))
}

/// Shortcut routes scoped to the caller; same enforcement, the owner is
/// simply `caller.id`.
pub fn current_user_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_my_tasks).post(create_my_task))
        .route(
            "/tasks/:task_id",
            get(get_my_task).put(update_my_task).delete(delete_my_task),
        )
        .route("/tasks/:task_id/complete", patch(complete_my_task))
}

// --- shared cores; the owner has already passed the scope guard ---

async fn list_core(
    state: &AppState,
    owner_id: Uuid,
    q: ListQuery,
) -> Result<Json<Vec<Task>>, ApiError> {
    let completed = parse_status(&q.status).ok_or(ApiError::Unprocessable("Invalid status filter"))?;
    let sort = SortField::parse(&q.sort).ok_or(ApiError::Unprocessable("Invalid sort field"))?;
    let order = SortOrder::parse(&q.order).ok_or(ApiError::Unprocessable("Invalid sort order"))?;

    let tasks =
        Task::list_by_user(&state.db, owner_id, completed, sort, order, q.limit, q.skip).await?;
    Ok(Json(tasks))
}

async fn create_core(
    state: &AppState,
    owner_id: Uuid,
    body: CreateTask,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = Task::create(
        &state.db,
        owner_id,
        &body.title,
        body.description.as_deref(),
        body.completed,
    )
    .await?;
    info!(user_id = %owner_id, task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_core(state: &AppState, owner_id: Uuid, task_id: Uuid) -> Result<Json<Task>, ApiError> {
    let task = Task::get(&state.db, owner_id, task_id)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;
    Ok(Json(task))
}

async fn update_core(
    state: &AppState,
    owner_id: Uuid,
    task_id: Uuid,
    changes: UpdateTask,
) -> Result<Json<Task>, ApiError> {
    let task = Task::update(&state.db, owner_id, task_id, &changes)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;
    Ok(Json(task))
}

async fn delete_core(state: &AppState, owner_id: Uuid, task_id: Uuid) -> Result<StatusCode, ApiError> {
    if !Task::delete(&state.db, owner_id, task_id).await? {
        return Err(ApiError::NotFound("Task not found"));
    }
    info!(user_id = %owner_id, task_id = %task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_core(
    state: &AppState,
    owner_id: Uuid,
    task_id: Uuid,
    completed: bool,
) -> Result<Json<Task>, ApiError> {
    let task = Task::set_completed(&state.db, owner_id, task_id, completed)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;
    Ok(Json(task))
}

// --- explicit-owner handlers ---

#[instrument(skip(state, caller))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<Uuid>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    ensure_user_scope(&caller, user_id)?;
    list_core(&state, user_id, q).await
}

#[instrument(skip(state, caller, body))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    ensure_user_scope(&caller, user_id)?;
    create_core(&state, user_id, body).await
}

#[instrument(skip(state, caller))]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((user_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Task>, ApiError> {
    ensure_user_scope(&caller, user_id)?;
    get_core(&state, user_id, task_id).await
}

#[instrument(skip(state, caller, changes))]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((user_id, task_id)): Path<(Uuid, Uuid)>,
    Json(changes): Json<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    ensure_user_scope(&caller, user_id)?;
    update_core(&state, user_id, task_id, changes).await
}

#[instrument(skip(state, caller))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((user_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ensure_user_scope(&caller, user_id)?;
    delete_core(&state, user_id, task_id).await
}

#[instrument(skip(state, caller, payload))]
pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((user_id, task_id)): Path<(Uuid, Uuid)>,
    payload: Option<Json<CompleteTask>>,
) -> Result<Json<Task>, ApiError> {
    ensure_user_scope(&caller, user_id)?;
    let completed = payload.map(|Json(p)| p.completed).unwrap_or(true);
    complete_core(&state, user_id, task_id, completed).await
}

// --- current-user shortcuts ---

#[instrument(skip(state, caller))]
pub async fn list_my_tasks(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    list_core(&state, caller.id, q).await
}

#[instrument(skip(state, caller, body))]
pub async fn create_my_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(body): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    create_core(&state, caller.id, body).await
}

#[instrument(skip(state, caller))]
pub async fn get_my_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    get_core(&state, caller.id, task_id).await
}

#[instrument(skip(state, caller, changes))]
pub async fn update_my_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(task_id): Path<Uuid>,
    Json(changes): Json<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    update_core(&state, caller.id, task_id, changes).await
}

#[instrument(skip(state, caller))]
pub async fn delete_my_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_core(&state, caller.id, task_id).await
}

#[instrument(skip(state, caller, payload))]
pub async fn complete_my_task(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(task_id): Path<Uuid>,
    payload: Option<Json<CompleteTask>>,
) -> Result<Json<Task>, ApiError> {
    let completed = payload.map(|Json(p)| p.completed).unwrap_or(true);
    complete_core(&state, caller.id, task_id, completed).await
}
