use sqlx::PgPool;

use crate::db::models::Task;

const COLUMNS: &str = "id, exam_id, question, scores, position";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    exam_id: &str,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {COLUMNS} FROM tasks WHERE exam_id = $1 ORDER BY position",
    ))
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn next_position(pool: &PgPool, exam_id: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateTask<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub question: &'a str,
    pub scores: i32,
    pub position: i32,
}

pub(crate) async fn create<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateTask<'_>,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, exam_id, question, scores, position)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.question)
    .bind(params.scores)
    .bind(params.position)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &str,
    question: &str,
    scores: i32,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET question = $1, scores = $2 WHERE id = $3 RETURNING {COLUMNS}",
    ))
    .bind(question)
    .bind(scores)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tasks WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
