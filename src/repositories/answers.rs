use sqlx::PgPool;

use crate::db::models::Answer;

const COLUMNS: &str = "id, task_id, text, is_correct, position";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_task<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    task_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE task_id = $1 ORDER BY position",
    ))
    .bind(task_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn next_position(pool: &PgPool, task_id: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM answers WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateAnswer<'a> {
    pub id: &'a str,
    pub task_id: &'a str,
    pub text: &'a str,
    pub is_correct: bool,
    pub position: i32,
}

pub(crate) async fn create<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, task_id, text, is_correct, position)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.task_id)
    .bind(params.text)
    .bind(params.is_correct)
    .bind(params.position)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &str,
    text: &str,
    is_correct: bool,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "UPDATE answers SET text = $1, is_correct = $2 WHERE id = $3 RETURNING {COLUMNS}",
    ))
    .bind(text)
    .bind(is_correct)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM answers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
