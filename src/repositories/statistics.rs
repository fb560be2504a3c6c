use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ErrorStatistics, Statistics};

const COLUMNS: &str = "id, user_id, exam_id, grade, total, start_time, end_time";

const ERROR_COLUMNS: &str = "id, statistics_id, question, position";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Statistics>, sqlx::Error> {
    sqlx::query_as::<_, Statistics>(&format!("SELECT {COLUMNS} FROM statistics WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Statistics>, sqlx::Error> {
    sqlx::query_as::<_, Statistics>(&format!(
        "SELECT {COLUMNS} FROM statistics WHERE user_id = $1 ORDER BY start_time DESC",
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateStatistics<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub exam_id: &'a str,
    pub grade: i32,
    pub total: i32,
    pub start_time: PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateStatistics<'_>,
) -> Result<Statistics, sqlx::Error> {
    sqlx::query_as::<_, Statistics>(&format!(
        "INSERT INTO statistics (id, user_id, exam_id, grade, total, start_time, end_time)
         VALUES ($1,$2,$3,$4,$5,$6,NULL)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.exam_id)
    .bind(params.grade)
    .bind(params.total)
    .bind(params.start_time)
    .fetch_one(executor)
    .await
}

/// Marks the attempt finished. The WHERE clause guards against finishing
/// twice; callers treat a missing row as "already finished or not found".
pub(crate) async fn finish<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: &str,
    grade: i32,
    end_time: PrimitiveDateTime,
) -> Result<Option<Statistics>, sqlx::Error> {
    sqlx::query_as::<_, Statistics>(&format!(
        "UPDATE statistics SET grade = $1, end_time = $2
         WHERE id = $3 AND end_time IS NULL
         RETURNING {COLUMNS}",
    ))
    .bind(grade)
    .bind(end_time)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_errors(
    pool: &PgPool,
    statistics_id: &str,
) -> Result<Vec<ErrorStatistics>, sqlx::Error> {
    sqlx::query_as::<_, ErrorStatistics>(&format!(
        "SELECT {ERROR_COLUMNS} FROM error_statistics WHERE statistics_id = $1 ORDER BY position",
    ))
    .bind(statistics_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateErrorStatistics<'a> {
    pub id: &'a str,
    pub statistics_id: &'a str,
    pub question: &'a str,
    pub position: i32,
}

pub(crate) async fn create_error<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    params: CreateErrorStatistics<'_>,
) -> Result<ErrorStatistics, sqlx::Error> {
    sqlx::query_as::<_, ErrorStatistics>(&format!(
        "INSERT INTO error_statistics (id, statistics_id, question, position)
         VALUES ($1,$2,$3,$4)
         RETURNING {ERROR_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.statistics_id)
    .bind(params.question)
    .bind(params.position)
    .fetch_one(executor)
    .await
}
