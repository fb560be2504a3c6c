//! Positional pairing of an exam's stored children with an incoming write
//! payload. The Nth incoming task updates the Nth stored task, and within
//! each pair the Nth incoming answer updates the Nth stored answer. A
//! length mismatch at either level rejects the whole write before anything
//! touches the database.

use crate::db::models::{Answer, Task};
use crate::schemas::exam::{AnswerPayload, TaskPayload};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ReconcileError {
    #[error("exam has {stored} tasks but the payload carries {incoming}")]
    TaskCountMismatch { stored: usize, incoming: usize },
    #[error("task #{task_index} has {stored} answers but the payload carries {incoming}")]
    AnswerCountMismatch { task_index: usize, stored: usize, incoming: usize },
}

#[derive(Debug)]
pub(crate) struct TaskPair<'a> {
    pub(crate) task_id: &'a str,
    pub(crate) payload: &'a TaskPayload,
    pub(crate) answers: Vec<AnswerPair<'a>>,
}

#[derive(Debug)]
pub(crate) struct AnswerPair<'a> {
    pub(crate) answer_id: &'a str,
    pub(crate) payload: &'a AnswerPayload,
}

pub(crate) fn pair_tasks<'a>(
    stored: &'a [(Task, Vec<Answer>)],
    incoming: &'a [TaskPayload],
) -> Result<Vec<TaskPair<'a>>, ReconcileError> {
    if stored.len() != incoming.len() {
        return Err(ReconcileError::TaskCountMismatch {
            stored: stored.len(),
            incoming: incoming.len(),
        });
    }

    let mut pairs = Vec::with_capacity(stored.len());
    for (task_index, ((task, answers), payload)) in stored.iter().zip(incoming).enumerate() {
        if answers.len() != payload.answers.len() {
            return Err(ReconcileError::AnswerCountMismatch {
                task_index,
                stored: answers.len(),
                incoming: payload.answers.len(),
            });
        }
        let answer_pairs = answers
            .iter()
            .zip(&payload.answers)
            .map(|(answer, answer_payload)| AnswerPair {
                answer_id: answer.id.as_str(),
                payload: answer_payload,
            })
            .collect();
        pairs.push(TaskPair { task_id: task.id.as_str(), payload, answers: answer_pairs });
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_task(id: &str, answer_ids: &[&str]) -> (Task, Vec<Answer>) {
        let task = Task {
            id: id.to_string(),
            exam_id: "e1".into(),
            question: "old question".into(),
            scores: 1,
            position: 0,
        };
        let answers = answer_ids
            .iter()
            .enumerate()
            .map(|(position, answer_id)| Answer {
                id: answer_id.to_string(),
                task_id: id.to_string(),
                text: "old answer".into(),
                is_correct: false,
                position: position as i32,
            })
            .collect();
        (task, answers)
    }

    fn payload(answer_count: usize) -> TaskPayload {
        serde_json::from_value(serde_json::json!({
            "question": "new question",
            "scores": 2,
            "answers": (0..answer_count)
                .map(|n| serde_json::json!({"text": format!("a{n}"), "is_correct": n == 0}))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn pairs_by_position() {
        let stored = vec![stored_task("t1", &["a1", "a2"]), stored_task("t2", &["a3"])];
        let incoming = vec![payload(2), payload(1)];

        let pairs = pair_tasks(&stored, &incoming).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].task_id, "t1");
        assert_eq!(pairs[0].answers[1].answer_id, "a2");
        assert_eq!(pairs[1].task_id, "t2");
        assert_eq!(pairs[1].payload.question, "new question");
    }

    #[test]
    fn rejects_task_count_mismatch() {
        let stored = vec![stored_task("t1", &["a1"])];
        let incoming = vec![payload(1), payload(1)];

        assert_eq!(
            pair_tasks(&stored, &incoming).unwrap_err(),
            ReconcileError::TaskCountMismatch { stored: 1, incoming: 2 },
        );
    }

    #[test]
    fn rejects_answer_count_mismatch_with_task_index() {
        let stored = vec![stored_task("t1", &["a1"]), stored_task("t2", &["a2", "a3"])];
        let incoming = vec![payload(1), payload(3)];

        assert_eq!(
            pair_tasks(&stored, &incoming).unwrap_err(),
            ReconcileError::AnswerCountMismatch { task_index: 1, stored: 2, incoming: 3 },
        );
    }

    #[test]
    fn empty_aggregate_pairs_to_empty_plan() {
        assert!(pair_tasks(&[], &[]).unwrap().is_empty());
    }
}
