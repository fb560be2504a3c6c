use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::pagination::ListParams;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::comment::CommentResponse;
use crate::schemas::exam::{
    ExamListItem, ExamListResponse, ExamRetrieveResponse, ExamWithTasksResponse, ExamWrite,
};
use crate::services::reconcile;

use super::helpers;

pub(super) async fn create_exam(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ExamWrite>,
) -> Result<(StatusCode, Json<ExamWithTasksResponse>), ApiError> {
    payload.validate()?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let exam = repositories::exams::create(
        &mut *tx,
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            author_id: &teacher.id,
            title: &payload.title,
            classroom: payload.classroom,
            subject: payload.subject,
            description: &payload.description,
            is_show: payload.is_show,
            publish_time: now,
            edit_time: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    let children = helpers::insert_children(&mut tx, &exam.id, &payload.tasks).await?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(teacher_id = %teacher.id, exam_id = %exam.id, "Exam created");

    Ok((StatusCode::CREATED, Json(ExamWithTasksResponse::from_parts(exam, children))))
}

pub(super) async fn get_exam_detail(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamWithTasksResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;
    let mut conn = state
        .db()
        .acquire()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to acquire connection"))?;
    let children = helpers::load_children(&mut conn, &exam.id).await?;

    Ok(Json(ExamWithTasksResponse::from_parts(exam, children)))
}

pub(super) async fn update_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ExamWrite>,
) -> Result<Json<ExamWithTasksResponse>, ApiError> {
    payload.validate()?;

    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;
    if !helpers::can_manage_exam(&teacher, &exam) {
        return Err(ApiError::Forbidden("You can only update your own exams"));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    // Reading the stored children inside the transaction keeps the pairing
    // consistent with the rows the updates will hit.
    let stored = helpers::load_children(&mut tx, &exam.id).await?;
    let pairs = reconcile::pair_tasks(&stored, &payload.tasks)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::exams::update(
        &mut *tx,
        &exam_id,
        repositories::exams::UpdateExam {
            title: &payload.title,
            classroom: payload.classroom,
            subject: payload.subject,
            description: &payload.description,
            is_show: payload.is_show,
            edit_time: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    let children = helpers::apply_pairs(&mut tx, &pairs).await?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(Json(ExamWithTasksResponse::from_parts(updated, children)))
}

pub(super) async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;
    if !helpers::can_manage_exam(&teacher, &exam) {
        return Err(ApiError::Forbidden("You can only delete your own exams"));
    }

    repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    tracing::info!(teacher_id = %teacher.id, exam_id = %exam_id, "Exam deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_exams(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ExamListResponse>, ApiError> {
    let include_email = state.settings().api().author_email_enabled;

    let rows = repositories::exams::list_visible(state.db(), params.skip, params.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let count = repositories::exams::count_visible(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count exams"))?;

    let data =
        rows.into_iter().map(|row| ExamListItem::from_row(row, include_email)).collect();

    Ok(Json(ExamListResponse { data, count }))
}

pub(super) async fn retrieve_exam(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamRetrieveResponse>, ApiError> {
    let include_email = state.settings().api().author_email_enabled;

    let row = repositories::exams::find_with_author(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let tasks = repositories::tasks::list_by_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    let comments = repositories::comments::list_by_exam_with_author(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list comments"))?
        .into_iter()
        .map(|comment| CommentResponse::from_row(comment, include_email))
        .collect();

    Ok(Json(ExamRetrieveResponse::from_parts(row, &tasks, comments, include_email)))
}
