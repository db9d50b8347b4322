// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Primary-key heuristic.  A pure function of the table and the PII list:
//! no state, no I/O, same answer every time.

use crate::table::{Column, Table};
use std::collections::HashSet;

/// Columns that could serve as the primary key: textual or integer, no
/// nulls, no duplicates, and every value the same rendered width (so codes
/// like `1S34` qualify while free text does not).
pub fn candidates(table: &Table) -> Vec<&str> {
    table
        .columns()
        .iter()
        .filter(|column| qualifies(column))
        .map(Column::name)
        .collect()
}

/// Pick the primary key: the leftmost column when it is a safe candidate,
/// otherwise the first safe candidate.  Columns listed as PII are never
/// safe because they are about to be masked.
pub fn detect_primary_key<'t>(table: &'t Table, pii_fields: &[String]) -> Option<&'t str> {
    let safe: Vec<&str> = candidates(table)
        .into_iter()
        .filter(|name| !pii_fields.iter().any(|field| field == name))
        .collect();

    let first = table.column_names().next()?;
    if safe.contains(&first) {
        return Some(first);
    }
    safe.first().copied()
}

fn qualifies(column: &Column) -> bool {
    let dtype = column.dtype();
    if !(dtype.is_textual() || dtype.is_integer()) {
        return false;
    }

    let mut seen = HashSet::with_capacity(column.len());
    let mut width = None;
    for value in column.values() {
        if value.is_null() {
            return false;
        }
        let text = value.to_text();
        let len = text.chars().count();
        match width {
            None => width = Some(len),
            Some(expected) if expected != len => return false,
            Some(_) => {}
        }
        if !seen.insert(text) {
            return false;
        }
    }
    true
}
