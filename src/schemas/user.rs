use serde::{Deserialize, Serialize};

use crate::core::time::epoch_seconds;
use crate::db::models::User;

#[derive(Debug, Deserialize)]
pub(crate) struct UserCreate {
    pub(crate) email: String,
    #[serde(alias = "firstName")]
    pub(crate) first_name: String,
    #[serde(alias = "lastName")]
    pub(crate) last_name: String,
    pub(crate) password: String,
    #[serde(default)]
    #[serde(alias = "isTeacher")]
    pub(crate) is_teacher: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) is_teacher: bool,
    pub(crate) is_active: bool,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_teacher: user.is_teacher,
            is_active: user.is_active,
            created_at: epoch_seconds(user.created_at),
            updated_at: epoch_seconds(user.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) avatar: Option<String>,
    pub(crate) updated_at: i64,
}

impl ProfileResponse {
    pub(crate) fn from_db(profile: crate::db::models::Profile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            avatar: profile.avatar,
            updated_at: epoch_seconds(profile.updated_at),
        }
    }
}
