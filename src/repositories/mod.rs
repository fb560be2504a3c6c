pub(crate) mod answers;
pub(crate) mod comments;
pub(crate) mod exams;
pub(crate) mod profiles;
pub(crate) mod statistics;
pub(crate) mod tasks;
pub(crate) mod users;
