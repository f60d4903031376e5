// convert.rs — Column ↔ domain-type conversions shared by the row mappers.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Render a timestamp for storage (RFC 3339, UTC).
pub(crate) fn ts_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn ts_from_sql(column: &'static str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::MalformedTimestamp {
            column,
            value: value.to_string(),
        })
}

/// Serialize a value into a JSON TEXT column.
pub(crate) fn json_to_sql<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

/// Deserialize a JSON TEXT column.
pub(crate) fn json_from_sql<T: DeserializeOwned>(value: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(value)?)
}

/// Render a unit enum (serde string form) for a plain TEXT column,
/// without the JSON quotes.
pub(crate) fn enum_to_sql<T: Serialize>(value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(StoreError::Serialization(<serde_json::Error as serde::ser::Error>::custom(
            format!("expected string-serializable enum, got {other}"),
        ))),
    }
}

/// Parse a unit enum from its plain TEXT column form.
pub(crate) fn enum_from_sql<T: DeserializeOwned>(value: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_value(serde_json::Value::String(
        value.to_string(),
    ))?)
}
