use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::db::models::{Answer, Exam, Task, User};
use crate::repositories;
use crate::schemas::exam::TaskPayload;
use crate::services::reconcile::TaskPair;

pub(super) fn can_manage_exam(user: &User, exam: &Exam) -> bool {
    user.id == exam.author_id
}

pub(super) async fn fetch_exam(pool: &PgPool, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(pool, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

/// Takes a connection rather than the pool so an update can read the
/// stored children inside its own transaction.
pub(super) async fn load_children(
    conn: &mut PgConnection,
    exam_id: &str,
) -> Result<Vec<(Task, Vec<Answer>)>, ApiError> {
    let tasks = repositories::tasks::list_by_exam(&mut *conn, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    let mut children = Vec::with_capacity(tasks.len());
    for task in tasks {
        let answers = repositories::answers::list_by_task(&mut *conn, &task.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;
        children.push((task, answers));
    }
    Ok(children)
}

/// Inserts the full child tree for a fresh exam. Positions follow payload
/// order, which is what the positional update later pairs against.
pub(super) async fn insert_children(
    tx: &mut Transaction<'_, Postgres>,
    exam_id: &str,
    payloads: &[TaskPayload],
) -> Result<Vec<(Task, Vec<Answer>)>, ApiError> {
    let mut children = Vec::with_capacity(payloads.len());
    for (task_position, task_payload) in payloads.iter().enumerate() {
        let task = repositories::tasks::create(
            &mut **tx,
            repositories::tasks::CreateTask {
                id: &Uuid::new_v4().to_string(),
                exam_id,
                question: &task_payload.question,
                scores: task_payload.scores,
                position: task_position as i32,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create task"))?;

        let mut answers = Vec::with_capacity(task_payload.answers.len());
        for (answer_position, answer_payload) in task_payload.answers.iter().enumerate() {
            let answer = repositories::answers::create(
                &mut **tx,
                repositories::answers::CreateAnswer {
                    id: &Uuid::new_v4().to_string(),
                    task_id: &task.id,
                    text: &answer_payload.text,
                    is_correct: answer_payload.is_correct,
                    position: answer_position as i32,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;
            answers.push(answer);
        }
        children.push((task, answers));
    }
    Ok(children)
}

/// Applies a reconcile plan: each paired task and answer gets its text
/// fields rewritten in place, ids and positions untouched.
pub(super) async fn apply_pairs(
    tx: &mut Transaction<'_, Postgres>,
    pairs: &[TaskPair<'_>],
) -> Result<Vec<(Task, Vec<Answer>)>, ApiError> {
    let mut children = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let task = repositories::tasks::update(
            &mut **tx,
            pair.task_id,
            &pair.payload.question,
            pair.payload.scores,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update task"))?;

        let mut answers = Vec::with_capacity(pair.answers.len());
        for answer_pair in &pair.answers {
            let answer = repositories::answers::update(
                &mut **tx,
                answer_pair.answer_id,
                &answer_pair.payload.text,
                answer_pair.payload.is_correct,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update answer"))?;
            answers.push(answer);
        }
        children.push((task, answers));
    }
    Ok(children)
}
