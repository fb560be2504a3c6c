use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::epoch_seconds;
use crate::repositories::comments::CommentAuthorRow;
use crate::schemas::exam::AuthorResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CommentCreate {
    pub(crate) exam_id: String,
    #[validate(length(min = 1, max = 2000, message = "text must be 1..=2000 characters"))]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CommentUpdate {
    #[validate(length(min = 1, max = 2000, message = "text must be 1..=2000 characters"))]
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) author: AuthorResponse,
    pub(crate) text: String,
    pub(crate) publish_time: i64,
    pub(crate) edit_time: i64,
}

impl CommentResponse {
    pub(crate) fn from_row(row: CommentAuthorRow, include_email: bool) -> Self {
        Self {
            id: row.id,
            exam_id: row.exam_id,
            author: AuthorResponse::new(
                row.author_id,
                row.author_first_name,
                row.author_last_name,
                row.author_email,
                row.author_avatar,
                include_email,
            ),
            text: row.text,
            publish_time: epoch_seconds(row.publish_time),
            edit_time: epoch_seconds(row.edit_time),
        }
    }
}
