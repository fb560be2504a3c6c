use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Exam;
use crate::db::types::Subject;

pub(crate) const COLUMNS: &str = "\
    id, author_id, title, classroom, subject, description, is_show, \
    publish_time, edit_time";

const AUTHOR_JOIN_COLUMNS: &str = "\
    e.id, e.author_id, e.title, e.classroom, e.subject, e.description, e.is_show, \
    e.publish_time, e.edit_time, \
    u.first_name AS author_first_name, u.last_name AS author_last_name, \
    u.email AS author_email, p.avatar AS author_avatar";

/// Exam row joined with its author's display fields and avatar.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamAuthorRow {
    pub(crate) id: String,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    pub(crate) description: String,
    pub(crate) is_show: bool,
    pub(crate) publish_time: PrimitiveDateTime,
    pub(crate) edit_time: PrimitiveDateTime,
    pub(crate) author_first_name: String,
    pub(crate) author_last_name: String,
    pub(crate) author_email: String,
    pub(crate) author_avatar: Option<String>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_with_author(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ExamAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamAuthorRow>(&format!(
        "SELECT {AUTHOR_JOIN_COLUMNS}
         FROM exams e
         JOIN users u ON u.id = e.author_id
         LEFT JOIN profiles p ON p.user_id = u.id
         WHERE e.id = $1",
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_visible(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<ExamAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamAuthorRow>(&format!(
        "SELECT {AUTHOR_JOIN_COLUMNS}
         FROM exams e
         JOIN users u ON u.id = e.author_id
         LEFT JOIN profiles p ON p.user_id = u.id
         WHERE e.is_show = TRUE
         ORDER BY e.publish_time
         OFFSET $1 LIMIT $2",
    ))
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_visible(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exams WHERE is_show = TRUE").fetch_one(pool).await
}

pub(crate) struct CreateExam<'a> {
    pub id: &'a str,
    pub author_id: &'a str,
    pub title: &'a str,
    pub classroom: i16,
    pub subject: Subject,
    pub description: &'a str,
    pub is_show: bool,
    pub publish_time: PrimitiveDateTime,
    pub edit_time: PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateExam<'_>,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, author_id, title, classroom, subject, description, is_show,
            publish_time, edit_time
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.author_id)
    .bind(params.title)
    .bind(params.classroom)
    .bind(params.subject)
    .bind(params.description)
    .bind(params.is_show)
    .bind(params.publish_time)
    .bind(params.edit_time)
    .fetch_one(executor)
    .await
}

pub(crate) struct UpdateExam<'a> {
    pub title: &'a str,
    pub classroom: i16,
    pub subject: Subject,
    pub description: &'a str,
    pub is_show: bool,
    pub edit_time: PrimitiveDateTime,
}

pub(crate) async fn update<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &str,
    params: UpdateExam<'_>,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            title = $1,
            classroom = $2,
            subject = $3,
            description = $4,
            is_show = $5,
            edit_time = $6
         WHERE id = $7
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.classroom)
    .bind(params.subject)
    .bind(params.description)
    .bind(params.is_show)
    .bind(params.edit_time)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
