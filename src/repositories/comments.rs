use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Comment;

const COLUMNS: &str = "id, exam_id, author_id, text, publish_time, edit_time";

/// Comment row joined with its author's display fields and avatar.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommentAuthorRow {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) author_id: String,
    pub(crate) text: String,
    pub(crate) publish_time: PrimitiveDateTime,
    pub(crate) edit_time: PrimitiveDateTime,
    pub(crate) author_first_name: String,
    pub(crate) author_last_name: String,
    pub(crate) author_email: String,
    pub(crate) author_avatar: Option<String>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("SELECT {COLUMNS} FROM comments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam_with_author(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<CommentAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, CommentAuthorRow>(
        "SELECT c.id, c.exam_id, c.author_id, c.text, c.publish_time, c.edit_time,
                u.first_name AS author_first_name, u.last_name AS author_last_name,
                u.email AS author_email, p.avatar AS author_avatar
         FROM comments c
         JOIN users u ON u.id = c.author_id
         LEFT JOIN profiles p ON p.user_id = u.id
         WHERE c.exam_id = $1
         ORDER BY c.publish_time",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateComment<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub author_id: &'a str,
    pub text: &'a str,
    pub publish_time: PrimitiveDateTime,
    pub edit_time: PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateComment<'_>,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "INSERT INTO comments (id, exam_id, author_id, text, publish_time, edit_time)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.author_id)
    .bind(params.text)
    .bind(params.publish_time)
    .bind(params.edit_time)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_text(
    pool: &PgPool,
    id: &str,
    text: &str,
    edit_time: PrimitiveDateTime,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "UPDATE comments SET text = $1, edit_time = $2 WHERE id = $3 RETURNING {COLUMNS}",
    ))
    .bind(text)
    .bind(edit_time)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
