use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Task, User};
use crate::repositories;
use crate::schemas::exam::TaskResponse;

#[derive(Debug, Deserialize, Validate)]
struct TaskCreate {
    exam_id: String,
    #[validate(length(min = 1, max = 5000, message = "question must be 1..=5000 characters"))]
    question: String,
    #[serde(default = "default_scores")]
    #[validate(range(min = 1, max = 100, message = "scores must be 1..=100"))]
    scores: i32,
}

#[derive(Debug, Deserialize, Validate)]
struct TaskUpdate {
    #[validate(length(min = 1, max = 5000, message = "question must be 1..=5000 characters"))]
    question: String,
    #[validate(range(min = 1, max = 100, message = "scores must be 1..=100"))]
    scores: i32,
}

const fn default_scores() -> i32 {
    1
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_task)).route(
        "/:task_id",
        get(get_task).put(update_task).delete(delete_task),
    )
}

async fn create_task(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    payload.validate()?;

    require_exam_owner(&state, &teacher, &payload.exam_id).await?;

    let position = repositories::tasks::next_position(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute task position"))?;

    let task = repositories::tasks::create(
        state.db(),
        repositories::tasks::CreateTask {
            id: &Uuid::new_v4().to_string(),
            exam_id: &payload.exam_id,
            question: &payload.question,
            scores: payload.scores,
            position,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create task"))?;

    touch_exam(&state, &payload.exam_id).await;

    Ok((StatusCode::CREATED, Json(TaskResponse::from_parts(task, Vec::new()))))
}

async fn get_task(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = fetch_task(&state, &task_id).await?;
    let answers = repositories::answers::list_by_task(state.db(), &task.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(TaskResponse::from_parts(task, answers)))
}

async fn update_task(
    Path(task_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    payload.validate()?;

    let task = fetch_task(&state, &task_id).await?;
    require_exam_owner(&state, &teacher, &task.exam_id).await?;

    let task =
        repositories::tasks::update(state.db(), &task_id, &payload.question, payload.scores)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update task"))?;
    let answers = repositories::answers::list_by_task(state.db(), &task.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    touch_exam(&state, &task.exam_id).await;

    Ok(Json(TaskResponse::from_parts(task, answers)))
}

async fn delete_task(
    Path(task_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let task = fetch_task(&state, &task_id).await?;
    require_exam_owner(&state, &teacher, &task.exam_id).await?;

    repositories::tasks::delete_by_id(state.db(), &task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete task"))?;

    touch_exam(&state, &task.exam_id).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_task(state: &AppState, task_id: &str) -> Result<Task, ApiError> {
    repositories::tasks::find_by_id(state.db(), task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

pub(super) async fn require_exam_owner(
    state: &AppState,
    teacher: &User,
    exam_id: &str,
) -> Result<(), ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    if exam.author_id != teacher.id {
        return Err(ApiError::Forbidden("You can only modify your own exams"));
    }
    Ok(())
}

/// Child edits bump the parent's edit_time; a failure here is logged but
/// does not fail the request.
pub(super) async fn touch_exam(state: &AppState, exam_id: &str) {
    let result = sqlx::query("UPDATE exams SET edit_time = $1 WHERE id = $2")
        .bind(primitive_now_utc())
        .bind(exam_id)
        .execute(state.db())
        .await;
    if let Err(err) = result {
        tracing::warn!(error = %err, exam_id = %exam_id, "Failed to bump exam edit_time");
    }
}
