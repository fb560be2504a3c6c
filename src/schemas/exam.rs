use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::epoch_seconds;
use crate::db::models::{Answer, Exam, Task};
use crate::db::types::Subject;
use crate::repositories::exams::ExamAuthorRow;
use crate::schemas::comment::CommentResponse;

fn default_scores() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerPayload {
    #[validate(length(min = 1, max = 1000, message = "text must be 1..=1000 characters"))]
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TaskPayload {
    #[validate(length(min = 1, max = 5000, message = "question must be 1..=5000 characters"))]
    pub(crate) question: String,
    #[serde(default = "default_scores")]
    #[validate(range(min = 1, max = 100, message = "scores must be 1..=100"))]
    pub(crate) scores: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Vec<AnswerPayload>,
}

/// Write payload for both creating and replacing an exam aggregate. On
/// update the Nth task pairs with the Nth stored task, and likewise for
/// answers within each task.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamWrite {
    #[validate(length(min = 1, max = 300, message = "title must be 1..=300 characters"))]
    pub(crate) title: String,
    #[validate(range(min = 1, max = 11, message = "classroom must be 1..=11"))]
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    #[serde(default)]
    #[validate(length(max = 10000, message = "description is too long"))]
    pub(crate) description: String,
    #[serde(default = "default_true")]
    pub(crate) is_show: bool,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) tasks: Vec<TaskPayload>,
}

/// Author block embedded in exam and comment responses. The email is
/// only serialized when the deployment opts in.
#[derive(Debug, Serialize)]
pub(crate) struct AuthorResponse {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    pub(crate) avatar: Option<String>,
}

impl AuthorResponse {
    pub(crate) fn new(
        id: String,
        first_name: String,
        last_name: String,
        email: String,
        avatar: Option<String>,
        include_email: bool,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email: include_email.then_some(email),
            avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamListItem {
    pub(crate) id: String,
    pub(crate) author: AuthorResponse,
    pub(crate) title: String,
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    pub(crate) publish_time: i64,
    pub(crate) edit_time: i64,
}

impl ExamListItem {
    pub(crate) fn from_row(row: ExamAuthorRow, include_email: bool) -> Self {
        Self {
            id: row.id,
            author: AuthorResponse::new(
                row.author_id,
                row.author_first_name,
                row.author_last_name,
                row.author_email,
                row.author_avatar,
                include_email,
            ),
            title: row.title,
            classroom: row.classroom,
            subject: row.subject,
            publish_time: epoch_seconds(row.publish_time),
            edit_time: epoch_seconds(row.edit_time),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamListResponse {
    pub(crate) data: Vec<ExamListItem>,
    pub(crate) count: i64,
}

/// Catalog card for a single exam: scalar fields plus comments and the
/// derived task count and score ceiling, but no task bodies.
#[derive(Debug, Serialize)]
pub(crate) struct ExamRetrieveResponse {
    pub(crate) id: String,
    pub(crate) author: AuthorResponse,
    pub(crate) title: String,
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    pub(crate) description: String,
    pub(crate) is_show: bool,
    pub(crate) publish_time: i64,
    pub(crate) edit_time: i64,
    pub(crate) count_task: usize,
    pub(crate) max_scores: i32,
    pub(crate) comments: Vec<CommentResponse>,
}

impl ExamRetrieveResponse {
    pub(crate) fn from_parts(
        row: ExamAuthorRow,
        tasks: &[Task],
        comments: Vec<CommentResponse>,
        include_email: bool,
    ) -> Self {
        Self {
            id: row.id,
            author: AuthorResponse::new(
                row.author_id,
                row.author_first_name,
                row.author_last_name,
                row.author_email,
                row.author_avatar,
                include_email,
            ),
            title: row.title,
            classroom: row.classroom,
            subject: row.subject,
            description: row.description,
            is_show: row.is_show,
            publish_time: epoch_seconds(row.publish_time),
            edit_time: epoch_seconds(row.edit_time),
            count_task: tasks.len(),
            max_scores: max_scores(tasks),
            comments,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) task_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer) -> Self {
        Self { id: answer.id, task_id: answer.task_id, text: answer.text, is_correct: answer.is_correct }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) question: String,
    pub(crate) scores: i32,
    pub(crate) many_option: bool,
    pub(crate) answers: Vec<AnswerResponse>,
}

impl TaskResponse {
    pub(crate) fn from_parts(task: Task, answers: Vec<Answer>) -> Self {
        let many_option = many_option(&answers);
        Self {
            id: task.id,
            exam_id: task.exam_id,
            question: task.question,
            scores: task.scores,
            many_option,
            answers: answers.into_iter().map(AnswerResponse::from_db).collect(),
        }
    }
}

/// Full exam body used by the taking flow and by write-endpoint responses.
#[derive(Debug, Serialize)]
pub(crate) struct ExamWithTasksResponse {
    pub(crate) id: String,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) classroom: i16,
    pub(crate) subject: Subject,
    pub(crate) description: String,
    pub(crate) is_show: bool,
    pub(crate) publish_time: i64,
    pub(crate) edit_time: i64,
    pub(crate) max_scores: i32,
    pub(crate) tasks: Vec<TaskResponse>,
}

impl ExamWithTasksResponse {
    pub(crate) fn from_parts(exam: Exam, tasks: Vec<(Task, Vec<Answer>)>) -> Self {
        let max_scores = tasks.iter().map(|(task, _)| task.scores).sum();
        Self {
            id: exam.id,
            author_id: exam.author_id,
            title: exam.title,
            classroom: exam.classroom,
            subject: exam.subject,
            description: exam.description,
            is_show: exam.is_show,
            publish_time: epoch_seconds(exam.publish_time),
            edit_time: epoch_seconds(exam.edit_time),
            max_scores,
            tasks: tasks
                .into_iter()
                .map(|(task, answers)| TaskResponse::from_parts(task, answers))
                .collect(),
        }
    }
}

/// Sum of per-task scores, the ceiling a perfect run can reach.
pub(crate) fn max_scores(tasks: &[Task]) -> i32 {
    tasks.iter().map(|task| task.scores).sum()
}

/// A task is multi-select when more than one of its answers is correct.
pub(crate) fn many_option(answers: &[Answer]) -> bool {
    answers.iter().filter(|answer| answer.is_correct).count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(scores: i32) -> Task {
        Task {
            id: "t".into(),
            exam_id: "e".into(),
            question: "q".into(),
            scores,
            position: 0,
        }
    }

    fn answer(is_correct: bool) -> Answer {
        Answer {
            id: "a".into(),
            task_id: "t".into(),
            text: "x".into(),
            is_correct,
            position: 0,
        }
    }

    #[test]
    fn max_scores_sums_task_scores() {
        assert_eq!(max_scores(&[]), 0);
        assert_eq!(max_scores(&[task(1), task(3), task(2)]), 6);
    }

    #[test]
    fn many_option_requires_at_least_two_correct() {
        assert!(!many_option(&[]));
        assert!(!many_option(&[answer(true), answer(false)]));
        assert!(many_option(&[answer(true), answer(false), answer(true)]));
    }

    #[test]
    fn author_email_hidden_unless_enabled() {
        let with = AuthorResponse::new(
            "u".into(),
            "A".into(),
            "B".into(),
            "a@b.c".into(),
            None,
            true,
        );
        let without = AuthorResponse::new(
            "u".into(),
            "A".into(),
            "B".into(),
            "a@b.c".into(),
            None,
            false,
        );
        assert_eq!(with.email.as_deref(), Some("a@b.c"));
        assert!(without.email.is_none());

        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("email").is_none());
    }

    #[test]
    fn exam_write_rejects_out_of_range_classroom() {
        let payload: ExamWrite = serde_json::from_value(serde_json::json!({
            "title": "Algebra basics",
            "classroom": 12,
            "subject": "al",
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn task_scores_default_to_one() {
        let payload: TaskPayload = serde_json::from_value(serde_json::json!({
            "question": "2 + 2?",
            "answers": [{"text": "4", "is_correct": true}],
        }))
        .unwrap();
        assert_eq!(payload.scores, 1);
    }
}
