use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::Subject;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) is_teacher: bool,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Profile {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) avatar: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    pub(crate) description: String,
    pub(crate) is_show: bool,
    pub(crate) publish_time: PrimitiveDateTime,
    pub(crate) edit_time: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Task {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) question: String,
    pub(crate) scores: i32,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) task_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Comment {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) author_id: String,
    pub(crate) text: String,
    pub(crate) publish_time: PrimitiveDateTime,
    pub(crate) edit_time: PrimitiveDateTime,
}

/// One student's attempt at one exam. `end_time` stays NULL until the finish
/// transition runs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Statistics {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) grade: i32,
    pub(crate) total: i32,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ErrorStatistics {
    pub(crate) id: String,
    pub(crate) statistics_id: String,
    pub(crate) question: String,
    pub(crate) position: i32,
}
