// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Scalar cell values and the per-column dtypes inferred from them.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integer above `i64::MAX`; smaller values are always `Int`.
    UInt(u64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// `NaN` floats count as missing, matching how tabular tools treat them.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Plain-text rendering used for CSV cells and for the fixed-width check
    /// in primary-key detection.  Nulls render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) if f.is_nan() => String::new(),
            Value::Float(f) => render_float(*f),
            Value::Str(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Timestamp(ts) if ts.nanosecond() == 0 => {
                ts.format("%Y-%m-%d %H:%M:%S").to_string()
            }
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        }
    }

    fn shape(&self) -> Option<Shape> {
        match self {
            v if v.is_null() => None,
            Value::Bool(_) => Some(Shape::Bool),
            Value::Int(_) | Value::UInt(_) => Some(Shape::Int),
            Value::Float(_) => Some(Shape::Float),
            Value::Str(_) => Some(Shape::Str),
            Value::Date(_) => Some(Shape::Date),
            Value::Timestamp(_) => Some(Shape::Timestamp),
            Value::Null => None,
        }
    }
}

/// Render a float so that whole numbers keep a trailing `.0` (`3.0`, not `3`)
/// and everything else uses the shortest representation that round-trips.
pub fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Bool,
    Int,
    Float,
    Str,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

/// Column dtype.  Storage widths, units and timezones are tracked so columnar
/// formats can write back exactly what they read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Boolean,
    Integer(IntWidth),
    Float(FloatWidth),
    Utf8,
    LargeUtf8,
    Date,
    Timestamp { unit: TimeUnit, tz: Option<String> },
    /// Values of more than one incompatible kind.
    Mixed,
    /// A source type the table does not interpret (decimal, binary, list...),
    /// named as the source reports it.  Cells hold a text rendering.
    Opaque(String),
}

impl DataType {
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Utf8 | DataType::LargeUtf8)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Integer(_))
    }

    /// Infer the narrowest dtype describing every non-null value.  Integers
    /// mixed with floats widen to float; dates mixed with timestamps widen to
    /// timestamp; any other mixture is [`DataType::Mixed`].  Integers above
    /// `i64::MAX` make the column unsigned, which negative values then rule out.
    pub fn infer(values: &[Value]) -> DataType {
        let mut seen: Option<Shape> = None;
        for shape in values.iter().filter_map(Value::shape) {
            seen = match (seen, shape) {
                (None, s) => Some(s),
                (Some(a), b) if a == b => Some(a),
                (Some(Shape::Int), Shape::Float) | (Some(Shape::Float), Shape::Int) => {
                    Some(Shape::Float)
                }
                (Some(Shape::Date), Shape::Timestamp) | (Some(Shape::Timestamp), Shape::Date) => {
                    Some(Shape::Timestamp)
                }
                _ => return DataType::Mixed,
            };
        }

        match seen {
            None => DataType::Null,
            Some(Shape::Bool) => DataType::Boolean,
            Some(Shape::Int) => integer_width(values),
            Some(Shape::Float) => DataType::Float(FloatWidth::F64),
            Some(Shape::Str) => DataType::Utf8,
            Some(Shape::Date) => DataType::Date,
            Some(Shape::Timestamp) => DataType::Timestamp {
                unit: TimeUnit::Nanosecond,
                tz: None,
            },
        }
    }
}

fn integer_width(values: &[Value]) -> DataType {
    let unsigned = values.iter().any(|v| matches!(v, Value::UInt(_)));
    let negative = values.iter().any(|v| matches!(v, Value::Int(i) if *i < 0));
    match (unsigned, negative) {
        (false, _) => DataType::Integer(IntWidth::I64),
        (true, false) => DataType::Integer(IntWidth::U64),
        (true, true) => DataType::Mixed,
    }
}
