//! Shared request parsing helpers for the HTTP adapter.
//!
//! Every helper yields an `invalid_request` [`Error`] whose details name the
//! offending JSON field and a stable `code`.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::PageRequestError;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Detail codes attached to validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidEnum,
    InvalidPage,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidField => "invalid_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidEnum => "invalid_enum",
            Self::InvalidPage => "invalid_page",
        }
    }
}

fn field_error(field: &str, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn value_error(
    field: &str,
    code: ValidationCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {field}"),
    )
}

/// Wrap a domain validation failure that already names its field.
pub(crate) fn invalid_field_error(field: &str, error: impl fmt::Display) -> Error {
    field_error(field, ValidationCode::InvalidField, error.to_string())
}

pub(crate) fn invalid_enum_error(field: &str, value: &str, expected: &str) -> Error {
    value_error(
        field,
        ValidationCode::InvalidEnum,
        format!("{field} must be one of {expected}"),
        value,
    )
}

pub(crate) fn page_error(error: &PageRequestError) -> Error {
    let field = match error {
        PageRequestError::PageOutOfRange => "page",
        PageRequestError::LimitNotAllowed { .. } => "limit",
    };
    field_error(field, ValidationCode::InvalidPage, error.to_string())
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        value_error(
            field,
            ValidationCode::InvalidUuid,
            format!("{field} must be a valid UUID"),
            value,
        )
    })
}

pub(crate) fn parse_uuid_list(values: Vec<String>, field: &str) -> Result<Vec<Uuid>, Error> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(&value).map_err(|_| {
                Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(
                    json!({
                        "field": field,
                        "index": index,
                        "value": value,
                        "code": ValidationCode::InvalidUuid.as_str(),
                    }),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            value_error(
                field,
                ValidationCode::InvalidTimestamp,
                format!("{field} must be an RFC 3339 timestamp"),
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Split a comma-separated query value, dropping blanks.
pub(crate) fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Deserialize a field where absence and explicit `null` mean different
/// things: missing yields `None`, `null` yields `Some(None)`.
///
/// Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
