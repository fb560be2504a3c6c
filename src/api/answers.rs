use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::tasks::{require_exam_owner, touch_exam};
use crate::core::state::AppState;
use crate::db::models::{Answer, Task};
use crate::repositories;
use crate::schemas::exam::AnswerResponse;

#[derive(Debug, Deserialize, Validate)]
struct AnswerCreate {
    task_id: String,
    #[validate(length(min = 1, max = 1000, message = "text must be 1..=1000 characters"))]
    text: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct AnswerUpdate {
    #[validate(length(min = 1, max = 1000, message = "text must be 1..=1000 characters"))]
    text: String,
    is_correct: bool,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_answer)).route(
        "/:answer_id",
        get(get_answer).put(update_answer).delete(delete_answer),
    )
}

async fn create_answer(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    payload.validate()?;

    let task = fetch_task(&state, &payload.task_id).await?;
    require_exam_owner(&state, &teacher, &task.exam_id).await?;

    let position = repositories::answers::next_position(state.db(), &task.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute answer position"))?;

    let answer = repositories::answers::create(
        state.db(),
        repositories::answers::CreateAnswer {
            id: &Uuid::new_v4().to_string(),
            task_id: &task.id,
            text: &payload.text,
            is_correct: payload.is_correct,
            position,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;

    touch_exam(&state, &task.exam_id).await;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}

async fn get_answer(
    Path(answer_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    Ok(Json(AnswerResponse::from_db(answer)))
}

async fn update_answer(
    Path(answer_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate()?;

    let answer = fetch_answer(&state, &answer_id).await?;
    let task = fetch_task(&state, &answer.task_id).await?;
    require_exam_owner(&state, &teacher, &task.exam_id).await?;

    let answer =
        repositories::answers::update(state.db(), &answer_id, &payload.text, payload.is_correct)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update answer"))?;

    touch_exam(&state, &task.exam_id).await;

    Ok(Json(AnswerResponse::from_db(answer)))
}

async fn delete_answer(
    Path(answer_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    let task = fetch_task(&state, &answer.task_id).await?;
    require_exam_owner(&state, &teacher, &task.exam_id).await?;

    repositories::answers::delete_by_id(state.db(), &answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete answer"))?;

    touch_exam(&state, &task.exam_id).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_task(state: &AppState, task_id: &str) -> Result<Task, ApiError> {
    repositories::tasks::find_by_id(state.db(), task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

async fn fetch_answer(state: &AppState, answer_id: &str) -> Result<Answer, ApiError> {
    repositories::answers::find_by_id(state.db(), answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer"))?
        .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))
}
