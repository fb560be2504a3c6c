use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::epoch_seconds;
use crate::db::models::{ErrorStatistics, Statistics};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StatisticsCreate {
    pub(crate) exam_id: String,
    #[validate(range(min = 0, message = "total must be non-negative"))]
    pub(crate) total: i32,
}

/// Finish payload. The wrong answers travel as the question texts so the
/// record survives later edits to the exam.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StatisticsFinish {
    #[validate(range(min = 0, message = "grade must be non-negative"))]
    pub(crate) grade: i32,
    #[serde(default)]
    pub(crate) errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamRef {
    pub(crate) id: String,
    pub(crate) title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatisticsResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam: ExamRef,
    pub(crate) grade: i32,
    pub(crate) total: i32,
    pub(crate) start_time: i64,
    pub(crate) end_time: Option<i64>,
    pub(crate) errors: Vec<String>,
}

impl StatisticsResponse {
    pub(crate) fn from_parts(
        stats: Statistics,
        exam_title: String,
        errors: Vec<ErrorStatistics>,
    ) -> Self {
        Self {
            id: stats.id,
            user_id: stats.user_id,
            exam: ExamRef { id: stats.exam_id, title: exam_title },
            grade: stats.grade,
            total: stats.total,
            start_time: epoch_seconds(stats.start_time),
            end_time: stats.end_time.map(epoch_seconds),
            errors: errors.into_iter().map(|row| row.question).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn unfinished_attempt_serializes_null_end_time() {
        let response = StatisticsResponse::from_parts(
            Statistics {
                id: "s1".into(),
                user_id: "u1".into(),
                exam_id: "e1".into(),
                grade: 0,
                total: 10,
                start_time: datetime!(2025-01-02 10:20:30),
                end_time: None,
            },
            "Algebra basics".into(),
            vec![],
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["end_time"], serde_json::Value::Null);
        assert_eq!(json["exam"]["title"], "Algebra basics");
        assert_eq!(json["start_time"], 1_735_813_230);
    }

    #[test]
    fn errors_flatten_to_question_texts() {
        let response = StatisticsResponse::from_parts(
            Statistics {
                id: "s1".into(),
                user_id: "u1".into(),
                exam_id: "e1".into(),
                grade: 7,
                total: 10,
                start_time: datetime!(2025-01-02 10:20:30),
                end_time: Some(datetime!(2025-01-02 10:50:30)),
            },
            "Algebra basics".into(),
            vec![
                ErrorStatistics {
                    id: "er1".into(),
                    statistics_id: "s1".into(),
                    question: "2 + 2?".into(),
                    position: 0,
                },
                ErrorStatistics {
                    id: "er2".into(),
                    statistics_id: "s1".into(),
                    question: "3 * 3?".into(),
                    position: 1,
                },
            ],
        );
        assert_eq!(response.errors, vec!["2 + 2?", "3 * 3?"]);
    }
}
