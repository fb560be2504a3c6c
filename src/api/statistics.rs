use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Statistics;
use crate::repositories;
use crate::schemas::statistics::{StatisticsCreate, StatisticsFinish, StatisticsResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_attempt).get(list_own))
        .route("/:statistics_id", get(get_attempt))
        .route("/:statistics_id/finish", post(finish_attempt))
}

/// Opens an attempt. The grade always starts at zero regardless of what the
/// client sends; it only moves at the finish transition.
async fn start_attempt(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<StatisticsCreate>,
) -> Result<(StatusCode, Json<StatisticsResponse>), ApiError> {
    payload.validate()?;

    let exam = repositories::exams::find_by_id(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let stats = repositories::statistics::create(
        state.db(),
        repositories::statistics::CreateStatistics {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            exam_id: &exam.id,
            grade: 0,
            total: payload.total,
            start_time: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create statistics"))?;

    Ok((StatusCode::CREATED, Json(StatisticsResponse::from_parts(stats, exam.title, vec![]))))
}

async fn list_own(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StatisticsResponse>>, ApiError> {
    let attempts = repositories::statistics::list_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list statistics"))?;

    let mut responses = Vec::with_capacity(attempts.len());
    for stats in attempts {
        responses.push(build_response(&state, stats).await?);
    }

    Ok(Json(responses))
}

async fn get_attempt(
    Path(statistics_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = fetch_owned(&state, &statistics_id, &user.id).await?;
    Ok(Json(build_response(&state, stats).await?))
}

/// One-shot transition: records the grade and the wrong answers, stamps
/// end_time. A second call gets a conflict.
async fn finish_attempt(
    Path(statistics_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<StatisticsFinish>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    payload.validate()?;

    let stats = fetch_owned(&state, &statistics_id, &user.id).await?;
    if payload.grade > stats.total {
        return Err(ApiError::BadRequest("grade cannot exceed total".to_string()));
    }

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let finished = repositories::statistics::finish(
        &mut *tx,
        &statistics_id,
        payload.grade,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to finish statistics"))?
    .ok_or_else(|| ApiError::Conflict("Attempt is already finished".to_string()))?;

    for (position, question) in payload.errors.iter().enumerate() {
        repositories::statistics::create_error(
            &mut *tx,
            repositories::statistics::CreateErrorStatistics {
                id: &Uuid::new_v4().to_string(),
                statistics_id: &statistics_id,
                question,
                position: position as i32,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record wrong answer"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(Json(build_response(&state, finished).await?))
}

async fn fetch_owned(
    state: &AppState,
    statistics_id: &str,
    user_id: &str,
) -> Result<Statistics, ApiError> {
    let stats = repositories::statistics::find_by_id(state.db(), statistics_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch statistics"))?
        .ok_or_else(|| ApiError::NotFound("Statistics not found".to_string()))?;

    if stats.user_id != user_id {
        return Err(ApiError::Forbidden("You can only view your own statistics"));
    }
    Ok(stats)
}

async fn build_response(
    state: &AppState,
    stats: Statistics,
) -> Result<StatisticsResponse, ApiError> {
    let exam_title = repositories::exams::find_by_id(state.db(), &stats.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .map(|exam| exam.title)
        .unwrap_or_default();

    let errors = repositories::statistics::list_errors(state.db(), &stats.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list wrong answers"))?;

    Ok(StatisticsResponse::from_parts(stats, exam_title, errors))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn attempt_lifecycle_and_double_finish_conflict() {
        let ctx = test_support::setup_test_context().await;

        let teacher = test_support::insert_teacher(
            ctx.state.db(),
            "stat-teacher@school.ru",
            "Anna",
            "Petrova",
            "teacher-pass",
        )
        .await;
        let student = test_support::insert_student(
            ctx.state.db(),
            "stat-student@school.ru",
            "Oleg",
            "Smirnov",
            "student-pass",
        )
        .await;
        let exam = test_support::insert_exam(ctx.state.db(), &teacher.id, "Geometry quiz").await;
        let token = test_support::bearer_token(&student.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/statistics",
                Some(&token),
                // The grade in the payload must be ignored at start.
                Some(json!({"exam_id": exam.id, "total": 10, "grade": 9})),
            ))
            .await
            .expect("start attempt");

        let status = response.status();
        let started = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {started}");
        assert_eq!(started["grade"], 0);
        assert_eq!(started["end_time"], serde_json::Value::Null);
        let attempt_id = started["id"].as_str().expect("attempt id").to_string();

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/statistics/{attempt_id}/finish"),
                Some(&token),
                Some(json!({"grade": 7, "errors": ["2 + 2?", "3 * 3?"]})),
            ))
            .await
            .expect("finish attempt");

        let status = response.status();
        let finished = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {finished}");
        assert_eq!(finished["grade"], 7);
        assert!(finished["end_time"].is_i64());
        assert_eq!(finished["errors"], json!(["2 + 2?", "3 * 3?"]));
        assert_eq!(finished["exam"]["title"], "Geometry quiz");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/statistics/{attempt_id}/finish"),
                Some(&token),
                Some(json!({"grade": 9, "errors": []})),
            ))
            .await
            .expect("finish attempt twice");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn students_cannot_read_each_others_attempts() {
        let ctx = test_support::setup_test_context().await;

        let teacher = test_support::insert_teacher(
            ctx.state.db(),
            "stat-teacher2@school.ru",
            "Boris",
            "Ivanov",
            "teacher-pass",
        )
        .await;
        let first = test_support::insert_student(
            ctx.state.db(),
            "first@school.ru",
            "First",
            "Student",
            "student-pass",
        )
        .await;
        let second = test_support::insert_student(
            ctx.state.db(),
            "second@school.ru",
            "Second",
            "Student",
            "student-pass",
        )
        .await;
        let exam = test_support::insert_exam(ctx.state.db(), &teacher.id, "History test").await;

        let first_token = test_support::bearer_token(&first.id, ctx.state.settings());
        let second_token = test_support::bearer_token(&second.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/statistics",
                Some(&first_token),
                Some(json!({"exam_id": exam.id, "total": 5})),
            ))
            .await
            .expect("start attempt");
        let started = test_support::read_json(response).await;
        let attempt_id = started["id"].as_str().expect("attempt id");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/statistics/{attempt_id}"),
                Some(&second_token),
                None,
            ))
            .await
            .expect("read foreign attempt");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/statistics",
                Some(&second_token),
                None,
            ))
            .await
            .expect("list own attempts");
        let list = test_support::read_json(response).await;
        assert!(list.as_array().expect("list").is_empty());
    }
}
