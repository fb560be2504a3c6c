mod handlers;
mod helpers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

/// Aggregate endpoints: an exam travels with its tasks and answers.
pub(crate) fn detail_router() -> Router<AppState> {
    Router::new().route("/", post(handlers::create_exam)).route(
        "/:exam_id",
        get(handlers::get_exam_detail)
            .put(handlers::update_exam)
            .delete(handlers::delete_exam),
    )
}

/// Catalog endpoints: listing cards and the comment-bearing retrieve view.
pub(crate) fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_exams))
        .route("/:exam_id", get(handlers::retrieve_exam))
}
