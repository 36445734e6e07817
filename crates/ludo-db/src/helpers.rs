//! Conversions between snapshot JSON rows and libSQL values.
//!
//! Export turns each `libsql::Row` into a camelCase JSON object using the
//! table descriptor; restore does the reverse and rejects values that do not
//! fit the column before any statement runs.

use chrono::{DateTime, Utc};
use ludo_core::snapshot::Row;
use serde_json::{Number, Value};

use crate::error::DatabaseError;
use crate::schema::{Column, ColumnKind, TableSpec};

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Convert a stored value to its wire representation.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for values the column kind cannot hold.
pub fn sql_to_json(column: &Column, value: libsql::Value) -> Result<Value, DatabaseError> {
    let mismatch = |found: &str| {
        DatabaseError::InvalidState(format!(
            "column '{}' holds {found}, expected {:?}",
            column.name, column.kind
        ))
    };

    match (column.kind, value) {
        (_, libsql::Value::Null) => Ok(Value::Null),
        (ColumnKind::Bool, libsql::Value::Integer(n)) => Ok(Value::Bool(n != 0)),
        (ColumnKind::Integer, libsql::Value::Integer(n)) => Ok(Value::from(n)),
        #[allow(clippy::cast_precision_loss)]
        (ColumnKind::Real, libsql::Value::Integer(n)) => Ok(real(n as f64)),
        (ColumnKind::Real, libsql::Value::Real(f)) => Ok(real(f)),
        (ColumnKind::Text, libsql::Value::Text(s)) => Ok(Value::String(s)),
        (_, libsql::Value::Integer(_)) => Err(mismatch("an integer")),
        (_, libsql::Value::Real(_)) => Err(mismatch("a real")),
        (_, libsql::Value::Text(_)) => Err(mismatch("text")),
        (_, libsql::Value::Blob(_)) => Err(mismatch("a blob")),
    }
}

fn real(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// Convert a wire value to the value bound for `column`.
///
/// A missing field is treated like `null`.
///
/// # Errors
///
/// A human-readable reason when the value does not fit the column.
pub fn json_to_sql(column: &Column, value: Option<&Value>) -> Result<libsql::Value, String> {
    let value = match value {
        None | Some(Value::Null) if column.nullable => return Ok(libsql::Value::Null),
        None | Some(Value::Null) => return Err(format!("'{}' is required", column.field)),
        Some(value) => value,
    };

    let converted = match (column.kind, value) {
        (ColumnKind::Integer, Value::Number(n)) => n.as_i64().map(libsql::Value::Integer),
        (ColumnKind::Real, Value::Number(n)) => n.as_f64().map(libsql::Value::Real),
        (ColumnKind::Text, Value::String(s)) => Some(libsql::Value::Text(s.clone())),
        (ColumnKind::Bool, Value::Bool(b)) => Some(libsql::Value::Integer(i64::from(*b))),
        (ColumnKind::Bool, Value::Number(n)) => match n.as_i64() {
            Some(flag @ (0 | 1)) => Some(libsql::Value::Integer(flag)),
            _ => None,
        },
        _ => None,
    };

    converted.ok_or_else(|| {
        format!(
            "'{}' must be {}, got {value}",
            column.field,
            expected(column.kind)
        )
    })
}

const fn expected(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "an integer",
        ColumnKind::Real => "a number",
        ColumnKind::Text => "a string",
        ColumnKind::Bool => "a boolean",
    }
}

/// Read one stored row as a wire object keyed by camelCase field.
///
/// # Errors
///
/// Returns `DatabaseError` if a column cannot be read or converted.
pub fn row_to_json(spec: &TableSpec, row: &libsql::Row) -> Result<Row, DatabaseError> {
    let mut out = Row::new();
    for (idx, column) in (0_i32..).zip(spec.columns) {
        let value = row.get_value(idx)?;
        out.insert(column.field.to_string(), sql_to_json(column, value)?);
    }
    Ok(out)
}

/// Bind values for one wire row, in column order.
///
/// Primary-key fields must be present; fields that are not columns (such as
/// joined display data) are ignored.
///
/// # Errors
///
/// A human-readable reason naming the offending field.
pub fn json_to_params(spec: &TableSpec, row: &Row) -> Result<Vec<libsql::Value>, String> {
    spec.columns
        .iter()
        .map(|column| {
            let value = row.get(column.field);
            if spec.is_primary_key(column.field) && !value.is_some_and(Value::is_i64) {
                return Err(format!(
                    "primary key '{}' must be an integer",
                    column.field
                ));
            }
            json_to_sql(column, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ludo_core::entity::EntityKind;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::schema::table_spec;

    fn column(kind: EntityKind, field: &str) -> &'static Column {
        table_spec(kind).column(field).unwrap()
    }

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn parse_rfc3339_and_sqlite_formats() {
        assert!(parse_datetime("2026-02-09T14:30:00+00:00").is_ok());
        assert!(parse_datetime("2026-02-09 14:30:00").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn bool_round_trips_through_integer() {
        let is_active = column(EntityKind::Users, "isActive");
        assert_eq!(
            sql_to_json(is_active, libsql::Value::Integer(1)).unwrap(),
            json!(true)
        );
        assert!(matches!(
            json_to_sql(is_active, Some(&json!(false))),
            Ok(libsql::Value::Integer(0))
        ));
        assert!(matches!(
            json_to_sql(is_active, Some(&json!(1))),
            Ok(libsql::Value::Integer(1))
        ));
    }

    #[test]
    fn real_column_accepts_integers() {
        let rating = column(EntityKind::Products, "rating");
        assert_eq!(
            sql_to_json(rating, libsql::Value::Integer(4)).unwrap(),
            json!(4.0)
        );
        assert!(matches!(
            json_to_sql(rating, Some(&json!(4))),
            Ok(libsql::Value::Real(r)) if (r - 4.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn nullable_column_accepts_missing() {
        let payment = column(EntityKind::Orders, "paymentMethodId");
        assert!(matches!(json_to_sql(payment, None), Ok(libsql::Value::Null)));
        assert!(matches!(
            json_to_sql(payment, Some(&Value::Null)),
            Ok(libsql::Value::Null)
        ));
    }

    #[rstest]
    #[case::missing_required(EntityKind::Roles, "name", None, "is required")]
    #[case::null_required(EntityKind::Users, "email", Some(Value::Null), "is required")]
    #[case::text_for_integer(EntityKind::Products, "priceCents", Some(json!("12")), "an integer")]
    #[case::fraction_for_integer(EntityKind::Products, "stock", Some(json!(1.5)), "an integer")]
    #[case::number_for_text(EntityKind::Roles, "name", Some(json!(3)), "a string")]
    #[case::two_for_bool(EntityKind::Users, "isActive", Some(json!(2)), "a boolean")]
    fn rejects_values_that_do_not_fit(
        #[case] kind: EntityKind,
        #[case] field: &str,
        #[case] value: Option<Value>,
        #[case] needle: &str,
    ) {
        let reason = json_to_sql(column(kind, field), value.as_ref()).unwrap_err();
        assert!(reason.contains(needle), "{reason}");
    }

    #[test]
    fn params_follow_column_order_and_skip_extras() {
        let params = json_to_params(
            table_spec(EntityKind::Roles),
            &row(json!({
                "description": null,
                "name": "admin",
                "id": 1,
                "members": [{"id": 10}]
            })),
        )
        .unwrap();
        assert!(matches!(
            params.as_slice(),
            [
                libsql::Value::Integer(1),
                libsql::Value::Text(name),
                libsql::Value::Null,
            ] if name == "admin"
        ));
    }

    #[test]
    fn primary_key_must_be_present() {
        let reason = json_to_params(
            table_spec(EntityKind::UserRoles),
            &row(json!({"userId": 10, "assignedAt": "2026-01-01T00:00:00Z"})),
        )
        .unwrap_err();
        assert!(reason.contains("roleId"), "{reason}");
    }
}
