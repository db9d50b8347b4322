// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Delimited text with a header row.

use super::CodecError;
use crate::table::{Column, DataType, FloatWidth, Table, Value, render_float};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::collections::HashSet;

/// Cell spellings read as missing values.
const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

pub(super) fn decode(bytes: &[u8]) -> Result<Table, CodecError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CodecError::Invalid(
            "no columns to parse from input".to_string(),
        ));
    }

    let names = unique_names(headers.iter());
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Ok(Table::new(columns)?)
}

pub(super) fn encode(table: &Table) -> Result<Vec<u8>, CodecError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        writer.write_record(table.row(row).map(Value::to_text))?;
    }
    writer
        .into_inner()
        .map_err(|err| CodecError::Io(err.into_error()))
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ...
fn unique_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (index, header) in headers.enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {index}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while !seen.insert(name.clone()) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Missing,
    Int,
    Float,
    Text,
}

fn classify(cell: &str) -> CellKind {
    if NA_VALUES.contains(&cell) {
        return CellKind::Missing;
    }
    if is_integer_literal(cell) {
        // Only canonical spellings that fit 64 bits are numbers.  `007`, `+7`
        // and over-long digit strings are identifiers: keep them verbatim.
        let canonical = match cell.parse::<i64>() {
            Ok(value) => Some(value.to_string()),
            Err(_) => cell.parse::<u64>().ok().map(|value| value.to_string()),
        };
        return match canonical {
            Some(text) if text == cell => CellKind::Int,
            _ => CellKind::Text,
        };
    }
    match cell.parse::<f64>() {
        Ok(value) if render_float(value) == cell => CellKind::Float,
        _ => CellKind::Text,
    }
}

fn is_integer_literal(cell: &str) -> bool {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn integer_value(cell: &str) -> Value {
    match cell.parse::<i64>() {
        Ok(value) => Value::Int(value),
        Err(_) => cell
            .parse::<u64>()
            .map(Value::UInt)
            .unwrap_or_else(|_| Value::Str(cell.to_string())),
    }
}

/// A column is numeric only when every present cell has the same numeric
/// kind, so writing it back reproduces the input text.  Anything else is
/// text.
fn infer_column(name: String, raw: Vec<String>) -> Column {
    let kinds: Vec<CellKind> = raw.iter().map(|cell| classify(cell)).collect();
    let mut present = kinds.iter().copied().filter(|k| *k != CellKind::Missing);
    let uniform = match present.next() {
        None => return Column::with_dtype(name, DataType::Null, vec![Value::Null; raw.len()]),
        Some(first) => present.all(|k| k == first).then_some(first),
    };

    match uniform {
        Some(CellKind::Int) => {
            let values = cells(&raw, &kinds, integer_value);
            let dtype = DataType::infer(&values);
            if dtype.is_integer() {
                return Column::with_dtype(name, dtype, values);
            }
        }
        Some(CellKind::Float) => {
            let values = cells(&raw, &kinds, |cell| {
                cell.parse()
                    .map(Value::Float)
                    .unwrap_or_else(|_| Value::Str(cell.to_string()))
            });
            return Column::with_dtype(name, DataType::Float(FloatWidth::F64), values);
        }
        _ => {}
    }

    let values = cells(&raw, &kinds, |cell| Value::Str(cell.to_string()));
    Column::with_dtype(name, DataType::Utf8, values)
}

fn cells(raw: &[String], kinds: &[CellKind], convert: impl Fn(&str) -> Value) -> Vec<Value> {
    raw.iter()
        .zip(kinds)
        .map(|(cell, kind)| match kind {
            CellKind::Missing => Value::Null,
            _ => convert(cell),
        })
        .collect()
}
