pub(crate) mod answers;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod errors;
pub(crate) mod exams;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod profiles;
pub(crate) mod router;
pub(crate) mod statistics;
pub(crate) mod tasks;
pub(crate) mod validation;
