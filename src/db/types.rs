use serde::{Deserialize, Serialize};
use sqlx::Type;

/// School subject codes, stored as a Postgres enum. The two-letter codes are
/// the wire format the frontend already speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "subject")]
pub(crate) enum Subject {
    #[sqlx(rename = "al")]
    #[serde(rename = "al")]
    Algebra,
    #[sqlx(rename = "as")]
    #[serde(rename = "as")]
    Astronomy,
    #[sqlx(rename = "bi")]
    #[serde(rename = "bi")]
    Biology,
    #[sqlx(rename = "ch")]
    #[serde(rename = "ch")]
    Chemistry,
    #[sqlx(rename = "en")]
    #[serde(rename = "en")]
    English,
    #[sqlx(rename = "gm")]
    #[serde(rename = "gm")]
    Geometry,
    #[sqlx(rename = "hi")]
    #[serde(rename = "hi")]
    History,
    #[sqlx(rename = "ph")]
    #[serde(rename = "ph")]
    Physics,
    #[sqlx(rename = "ru")]
    #[serde(rename = "ru")]
    Russian,
    #[sqlx(rename = "cs")]
    #[serde(rename = "cs")]
    ComputerScience,
    #[sqlx(rename = "ss")]
    #[serde(rename = "ss")]
    SocialStudies,
    #[sqlx(rename = "gg")]
    #[serde(rename = "gg")]
    Geography,
    #[sqlx(rename = "fl")]
    #[serde(rename = "fl")]
    ForeignLanguage,
    #[sqlx(rename = "li")]
    #[serde(rename = "li")]
    Literature,
    #[sqlx(rename = "ob")]
    #[serde(rename = "ob")]
    LifeSafety,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_serializes_to_two_letter_code() {
        let json = serde_json::to_string(&Subject::Algebra).unwrap();
        assert_eq!(json, "\"al\"");
    }

    #[test]
    fn subject_deserializes_from_two_letter_code() {
        let subject: Subject = serde_json::from_str("\"ob\"").unwrap();
        assert_eq!(subject, Subject::LifeSafety);
    }

    #[test]
    fn unknown_subject_code_is_rejected() {
        assert!(serde_json::from_str::<Subject>("\"zz\"").is_err());
    }
}
