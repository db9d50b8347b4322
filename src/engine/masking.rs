// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Column masking.  The table is taken by value, so the caller's copy can
//! never be observed half-masked.

use crate::error::ObfuscationError;
use crate::table::Table;
use tracing::{debug, info, warn};

/// A masked table together with the columns that were overwritten, in the
/// order they were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Masked {
    pub table: Table,
    pub columns: Vec<String>,
}

impl Masked {
    pub fn masked_count(&self) -> usize {
        self.columns.len()
    }
}

/// The PII list minus the primary key, de-duplicated, in request order.
pub fn effective_fields<'a>(pii_fields: &'a [String], primary_key: &str) -> Vec<&'a str> {
    let mut fields: Vec<&str> = Vec::with_capacity(pii_fields.len());
    for field in pii_fields {
        if field != primary_key && !fields.contains(&field.as_str()) {
            fields.push(field);
        }
    }
    fields
}

/// Overwrite every requested column (except the primary key) with `token`.
/// Names that are not columns are skipped; masking nothing at all is an
/// error because downstream consumers assume the PII is gone.
pub fn mask(
    mut table: Table,
    pii_fields: &[String],
    primary_key: &str,
    token: &str,
) -> Result<Masked, ObfuscationError> {
    let fields = effective_fields(pii_fields, primary_key);
    debug!(?fields, "filtered PII fields");

    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        match table.column_mut(field) {
            Some(column) => {
                column.overwrite_with(token);
                info!(column = field, "obfuscated column");
                columns.push(field.to_string());
            }
            None => debug!(column = field, "PII field is not a column, skipping"),
        }
    }

    if columns.is_empty() {
        warn!("no PII columns found to obfuscate");
        return Err(ObfuscationError::NoColumnsObfuscated);
    }

    info!(count = columns.len(), "obfuscated PII fields");
    Ok(Masked { table, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::table::{Column, DataType, Value};

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn students() -> Table {
        Table::new(vec![
            Column::new("student_id", vec![Value::Int(1234), Value::Int(1235)]),
            Column::new(
                "name",
                vec![Value::Str("John Smith".into()), Value::Str("Jane Doe".into())],
            ),
            Column::new("graduated", vec![Value::Bool(true), Value::Null]),
        ])
        .expect("table")
    }

    #[test]
    fn effective_fields_drop_key_and_duplicates() {
        let pii = fields(&["name", "student_id", "email", "name"]);
        assert_eq!(effective_fields(&pii, "student_id"), vec!["name", "email"]);
    }

    #[test]
    fn masks_requested_columns_only() {
        let original = students();
        let masked = mask(
            original.clone(),
            &fields(&["graduated", "missing", "name"]),
            "student_id",
            "***",
        )
        .expect("mask");

        assert_eq!(masked.columns, vec!["graduated", "name"]);
        assert_eq!(masked.masked_count(), 2);
        for name in ["graduated", "name"] {
            let column = masked.table.column(name).expect("column");
            assert_eq!(column.dtype(), &DataType::Utf8);
            assert!(column.values().iter().all(|v| *v == Value::Str("***".into())));
        }
        assert_eq!(
            masked.table.column("student_id"),
            original.column("student_id")
        );
        assert_eq!(masked.table.row_count(), original.row_count());
    }

    #[test]
    fn primary_key_survives_even_when_listed() {
        let masked = mask(
            students(),
            &fields(&["student_id", "name"]),
            "student_id",
            "****",
        )
        .expect("mask");
        assert_eq!(masked.columns, vec!["name"]);
        assert_eq!(
            masked.table.column("student_id").expect("id").values(),
            &[Value::Int(1234), Value::Int(1235)]
        );
        assert_eq!(
            masked.table.column("name").expect("name").values()[0],
            Value::Str("****".into())
        );
    }

    #[test]
    fn masking_nothing_is_an_error() {
        let err = mask(students(), &fields(&["email"]), "student_id", "***").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoColumnsObfuscated);

        let err = mask(students(), &fields(&["student_id"]), "student_id", "***").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoColumnsObfuscated);
    }
}
