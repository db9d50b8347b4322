// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! JSON in records orientation: one top-level array, one flat object per row.

use super::CodecError;
use crate::table::{Column, Table, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashMap;

/// Column names that are worth probing for date/time values.
static DATE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:timestamp.*|.*_at|.*_time|modified|date|datetime)$").expect("valid regex")
});

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const ISO_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub(super) fn decode(bytes: &[u8]) -> Result<Table, CodecError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let JsonValue::Array(records) = root else {
        return Err(CodecError::Invalid(
            "expected a JSON array of records".to_string(),
        ));
    };

    let mut names: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Value>> = Vec::new();

    for (row, record) in records.into_iter().enumerate() {
        let JsonValue::Object(fields) = record else {
            return Err(CodecError::Invalid(format!(
                "record {row} is not a JSON object"
            )));
        };
        for (key, value) in fields {
            let column = match index.get(&key) {
                Some(&column) => column,
                None => {
                    // Columns first seen late are null for earlier rows.
                    names.push(key.clone());
                    cells.push(vec![Value::Null; row]);
                    index.insert(key.clone(), names.len() - 1);
                    names.len() - 1
                }
            };
            let cell = scalar(value).ok_or_else(|| {
                CodecError::Invalid(format!("nested value in column {key} at record {row}"))
            })?;
            cells[column].push(cell);
        }
        for column in cells.iter_mut() {
            if column.len() <= row {
                column.push(Value::Null);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let values = if DATE_COLUMN.is_match(&name) {
                parse_dates(values)
            } else {
                values
            };
            Column::new(name, values)
        })
        .collect();
    Ok(Table::new(columns)?)
}

pub(super) fn encode(table: &Table) -> Result<Vec<u8>, CodecError> {
    let names: Vec<&str> = table.column_names().collect();
    let mut records = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut record = Map::with_capacity(names.len());
        for (name, value) in names.iter().zip(table.row(row)) {
            record.insert((*name).to_string(), to_json(value));
        }
        records.push(JsonValue::Object(record));
    }
    Ok(serde_json::to_vec(&JsonValue::Array(records))?)
}

fn scalar(value: JsonValue) -> Option<Value> {
    match value {
        JsonValue::Null => Some(Value::Null),
        JsonValue::Bool(b) => Some(Value::Bool(b)),
        JsonValue::Number(n) => Some(if let Some(i) = n.as_i64() {
            Value::Int(i)
        } else if let Some(u) = n.as_u64() {
            Value::UInt(u)
        } else {
            n.as_f64().map(Value::Float).unwrap_or(Value::Null)
        }),
        JsonValue::String(s) => Some(Value::Str(s)),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::Number(Number::from(*i)),
        Value::UInt(u) => JsonValue::Number(Number::from(*u)),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Date(d) => JsonValue::String(format!("{}T00:00:00.000", d.format("%Y-%m-%d"))),
        Value::Timestamp(ts) => JsonValue::String(ts.format(ISO_OUTPUT).to_string()),
    }
}

/// Convert a column to timestamps when every non-null value is an ISO-8601
/// date or date-time string; otherwise leave it untouched.
fn parse_dates(values: Vec<Value>) -> Vec<Value> {
    let parsed: Option<Vec<Value>> = values
        .iter()
        .map(|value| match value {
            v if v.is_null() => Some(Value::Null),
            Value::Str(s) => parse_datetime(s).map(Value::Timestamp),
            _ => None,
        })
        .collect();

    match parsed {
        Some(converted) if converted.iter().any(|v| !v.is_null()) => converted,
        _ => values,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{DataType, IntWidth};

    #[test]
    fn decodes_records_in_key_order() {
        let input = br#"[{"student_id":1234,"name":"John Smith","gpa":3.5},{"student_id":1235,"name":"Jane Doe","gpa":null}]"#;
        let table = decode(input).expect("decode");
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["student_id", "name", "gpa"]);
        assert_eq!(
            table.column("student_id").expect("id").dtype(),
            &DataType::Integer(IntWidth::I64)
        );
        assert_eq!(table.column("gpa").expect("gpa").values()[1], Value::Null);
    }

    #[test]
    fn missing_keys_become_nulls() {
        let input = br#"[{"id":"A1"},{"id":"A2","email":"a@b.c"}]"#;
        let table = decode(input).expect("decode");
        let email = table.column("email").expect("email");
        assert_eq!(
            email.values(),
            &[Value::Null, Value::Str("a@b.c".to_string())]
        );
    }

    #[test]
    fn encode_is_a_single_array_in_column_order() {
        let input = r#"[{"id":"A1","name":"John Smith","score":3.0,"active":true},{"id":"A2","name":null,"score":4.25,"active":false}]"#;
        let table = decode(input.as_bytes()).expect("decode");
        let encoded = String::from_utf8(encode(&table).expect("encode")).expect("utf8");
        assert_eq!(encoded, input);
    }

    #[test]
    fn unsigned_integers_beyond_i64_are_written_back_exactly() {
        let input = r#"[{"id":"A1","account":18446744073709551615,"name":"John Smith"},{"id":"A2","account":12,"name":"Jane Doe"}]"#;
        let table = decode(input.as_bytes()).expect("decode");
        let account = table.column("account").expect("account");
        assert_eq!(account.dtype(), &DataType::Integer(IntWidth::U64));
        assert_eq!(account.values(), &[Value::UInt(u64::MAX), Value::Int(12)]);

        let encoded = String::from_utf8(encode(&table).expect("encode")).expect("utf8");
        assert_eq!(encoded, input);
    }

    #[test]
    fn date_named_columns_are_normalised_to_iso() {
        let input = br#"[{"id":"A1","created_at":"2024-01-05 10:30:00"},{"id":"A2","created_at":"2024-02-01"}]"#;
        let table = decode(input).expect("decode");
        assert!(matches!(
            table.column("created_at").expect("created_at").dtype(),
            DataType::Timestamp { .. }
        ));
        let encoded = String::from_utf8(encode(&table).expect("encode")).expect("utf8");
        assert_eq!(
            encoded,
            r#"[{"id":"A1","created_at":"2024-01-05T10:30:00.000"},{"id":"A2","created_at":"2024-02-01T00:00:00.000"}]"#
        );
    }

    #[test]
    fn date_named_columns_with_free_text_stay_textual() {
        let input = br#"[{"updated_at":"yesterday"},{"updated_at":"2024-01-01"}]"#;
        let table = decode(input).expect("decode");
        assert_eq!(
            table.column("updated_at").expect("column").dtype(),
            &DataType::Utf8
        );
    }

    #[test]
    fn rejects_non_record_layouts() {
        assert!(matches!(
            decode(br#"{"id":1}"#),
            Err(CodecError::Invalid(_))
        ));
        assert!(matches!(decode(br#"[1,2]"#), Err(CodecError::Invalid(_))));
        assert!(matches!(
            decode(br#"[{"id":{"nested":true}}]"#),
            Err(CodecError::Invalid(_))
        ));
        assert!(matches!(decode(b"[{\"id\":"), Err(CodecError::Json(_))));
    }

    #[test]
    fn empty_array_is_an_empty_table() {
        let table = decode(b"[]").expect("decode");
        assert!(table.is_empty());
    }
}
