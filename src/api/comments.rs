use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{epoch_seconds, primitive_now_utc};
use crate::db::models::{Comment, User};
use crate::repositories;
use crate::schemas::comment::{CommentCreate, CommentResponse, CommentUpdate};
use crate::schemas::exam::AuthorResponse;

#[derive(Debug, Deserialize)]
struct ListCommentsQuery {
    exam_id: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment).get(list_comments))
        .route("/:comment_id", put(update_comment).delete(delete_comment))
}

async fn create_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentCreate>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    payload.validate()?;

    let exam = repositories::exams::find_by_id(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
    if exam.is_none() {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let now = primitive_now_utc();
    let comment = repositories::comments::create(
        state.db(),
        repositories::comments::CreateComment {
            id: &Uuid::new_v4().to_string(),
            exam_id: &payload.exam_id,
            author_id: &user.id,
            text: &payload.text,
            publish_time: now,
            edit_time: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create comment"))?;

    let response = own_comment_response(&state, comment, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<ListCommentsQuery>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let include_email = state.settings().api().author_email_enabled;

    let comments = repositories::comments::list_by_exam_with_author(state.db(), &params.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list comments"))?
        .into_iter()
        .map(|row| CommentResponse::from_row(row, include_email))
        .collect();

    Ok(Json(comments))
}

async fn update_comment(
    Path(comment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentUpdate>,
) -> Result<Json<CommentResponse>, ApiError> {
    payload.validate()?;

    let comment = fetch_comment(&state, &comment_id).await?;
    if comment.author_id != user.id {
        return Err(ApiError::Forbidden("You can only edit your own comments"));
    }

    let comment =
        repositories::comments::update_text(state.db(), &comment_id, &payload.text, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update comment"))?;

    let response = own_comment_response(&state, comment, &user).await?;
    Ok(Json(response))
}

async fn delete_comment(
    Path(comment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let comment = fetch_comment(&state, &comment_id).await?;

    // The comment's author or the exam's author may remove it.
    if comment.author_id != user.id {
        let exam = repositories::exams::find_by_id(state.db(), &comment.exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
        let owns_exam = exam.is_some_and(|exam| exam.author_id == user.id);
        if !owns_exam {
            return Err(ApiError::Forbidden("You can only delete your own comments"));
        }
    }

    repositories::comments::delete_by_id(state.db(), &comment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete comment"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_comment(state: &AppState, comment_id: &str) -> Result<Comment, ApiError> {
    repositories::comments::find_by_id(state.db(), comment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch comment"))?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

async fn own_comment_response(
    state: &AppState,
    comment: Comment,
    author: &User,
) -> Result<CommentResponse, ApiError> {
    let include_email = state.settings().api().author_email_enabled;
    let avatar = repositories::profiles::find_by_user_id(state.db(), &author.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch profile"))?
        .and_then(|profile| profile.avatar);

    Ok(CommentResponse {
        id: comment.id,
        exam_id: comment.exam_id,
        author: AuthorResponse::new(
            author.id.clone(),
            author.first_name.clone(),
            author.last_name.clone(),
            author.email.clone(),
            avatar,
            include_email,
        ),
        text: comment.text,
        publish_time: epoch_seconds(comment.publish_time),
        edit_time: epoch_seconds(comment.edit_time),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn comment_lifecycle_with_ownership_checks() {
        let ctx = test_support::setup_test_context().await;

        let teacher = test_support::insert_teacher(
            ctx.state.db(),
            "comment-teacher@school.ru",
            "Anna",
            "Petrova",
            "teacher-pass",
        )
        .await;
        let student = test_support::insert_student(
            ctx.state.db(),
            "comment-student@school.ru",
            "Oleg",
            "Smirnov",
            "student-pass",
        )
        .await;
        let other = test_support::insert_student(
            ctx.state.db(),
            "comment-other@school.ru",
            "Ivan",
            "Kuznetsov",
            "student-pass",
        )
        .await;
        let exam = test_support::insert_exam(ctx.state.db(), &teacher.id, "Physics quiz").await;

        let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
        let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
        let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/comments",
                Some(&student_token),
                Some(json!({"exam_id": exam.id, "text": "Great exam!"})),
            ))
            .await
            .expect("create comment");

        let status = response.status();
        let created = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {created}");
        assert!(created["author"].get("email").is_none());
        let comment_id = created["id"].as_str().expect("comment id").to_string();

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                &format!("/api/v1/comments/{comment_id}"),
                Some(&other_token),
                Some(json!({"text": "hijacked"})),
            ))
            .await
            .expect("edit foreign comment");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                &format!("/api/v1/comments/{comment_id}"),
                Some(&student_token),
                Some(json!({"text": "Great exam, updated"})),
            ))
            .await
            .expect("edit own comment");
        let status = response.status();
        let updated = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {updated}");
        assert_eq!(updated["text"], "Great exam, updated");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/comments?exam_id={}", exam.id),
                None,
                None,
            ))
            .await
            .expect("list comments");
        let list = test_support::read_json(response).await;
        assert_eq!(list.as_array().expect("comments").len(), 1);

        // The exam's author may moderate comments on it.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &format!("/api/v1/comments/{comment_id}"),
                Some(&teacher_token),
                None,
            ))
            .await
            .expect("delete comment as exam author");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
