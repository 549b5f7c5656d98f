//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a client-supplied expense id. Runs before any store access.
pub(crate) fn parse_expense_id(value: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidId("Invalid expense ID format".to_string()))
}

pub(crate) fn normalize_required_text(value: Option<&str>, label: &str) -> ResultEngine<String> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(EngineError::InvalidRequest(format!("{label} is required"))),
    }
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_email(value: Option<&str>) -> ResultEngine<String> {
    let email = normalize_required_text(value, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(EngineError::InvalidRequest("invalid email".to_string()));
    }
    Ok(email)
}

/// Unicode lower-casing applied to stored search columns and to keywords
/// alike, so matching never depends on the store's own case rules.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Parse an expense date: RFC 3339, or a bare `YYYY-MM-DD` read as midnight in
/// the server time zone.
pub(crate) fn parse_expense_date(value: &str, tz: Tz) -> ResultEngine<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            EngineError::InvalidRequest(format!(
                "invalid date `{value}`: expected RFC 3339 or YYYY-MM-DD"
            ))
        })
}
