//! Internal helpers shared by the domain services.

use serde_json::json;

use crate::domain::ports::{
    AchievementRepositoryError, PasswordHashError, TagRepositoryError, TaskRepositoryError,
    UserPersistenceError, XpLedgerRepositoryError,
};
use crate::domain::{Error, TagKind};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername => Error::conflict("username is already taken"),
        UserPersistenceError::DuplicateEmail => Error::conflict("email is already registered"),
    }
}

pub(crate) fn map_ledger_error(error: XpLedgerRepositoryError) -> Error {
    match error {
        XpLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("xp ledger unavailable: {message}"))
        }
        XpLedgerRepositoryError::Query { message } => {
            Error::internal(format!("xp ledger error: {message}"))
        }
        XpLedgerRepositoryError::UnknownUser => Error::not_found("user not found"),
    }
}

pub(crate) fn map_task_error(error: TaskRepositoryError) -> Error {
    match error {
        TaskRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("task repository unavailable: {message}"))
        }
        TaskRepositoryError::Query { message } => {
            Error::internal(format!("task repository error: {message}"))
        }
        TaskRepositoryError::UnknownTag { kind, id } => {
            Error::not_found(format!("{} {id} not found", kind.noun()))
        }
    }
}

pub(crate) fn map_tag_error(error: TagRepositoryError) -> Error {
    match error {
        TagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tag repository unavailable: {message}"))
        }
        TagRepositoryError::Query { message } => {
            Error::internal(format!("tag repository error: {message}"))
        }
        TagRepositoryError::Duplicate { kind, name } => {
            Error::conflict(format!("{} \"{name}\" already exists", kind.noun()))
        }
    }
}

pub(crate) fn map_achievement_error(error: AchievementRepositoryError) -> Error {
    match error {
        AchievementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("achievement repository unavailable: {message}"))
        }
        AchievementRepositoryError::Query { message } => {
            Error::internal(format!("achievement repository error: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn tag_not_found(kind: TagKind) -> Error {
    Error::not_found(format!("{} not found", kind.noun()))
}

pub(crate) fn task_not_found() -> Error {
    Error::not_found("Task not found")
}

/// Invalid-request error carrying the offending field.
pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": "invalid_field",
    }))
}

/// Saturating conversion for collection lengths reported as counters.
pub(crate) fn to_count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
