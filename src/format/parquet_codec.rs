// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Parquet via Arrow record batches.  Column types are read from the Arrow
//! schema and written back unchanged, so only masked columns change type.

use super::CodecError;
use crate::table::{ArrowSource, Column, DataType, FloatWidth, IntWidth, Table, TimeUnit, Value};
use arrow::array::cast::AsArray;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int8Array,
    Int16Array, Int32Array, Int64Array, LargeStringArray, NullArray, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray, UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use arrow::compute::concat_batches;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType as ArrowType, Date32Type, Field, FieldRef, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, Schema, TimeUnit as ArrowTimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::sync::Arc;

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(super) fn decode(bytes: &[u8]) -> Result<Table, CodecError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| decode_column(field, array))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::new(columns)?.with_metadata(schema.metadata().clone()))
}

/// Types the table understands are decoded to values; anything else gets a
/// text view.  Either way the Arrow array rides along for the write back.
fn decode_column(field: &FieldRef, array: &ArrayRef) -> Result<Column, CodecError> {
    let (dtype, values) = match dtype_from_arrow(field.data_type()) {
        Some(dtype) => {
            let mut values = Vec::with_capacity(array.len());
            append_values(array.as_ref(), &dtype, &mut values)?;
            (dtype, values)
        }
        None => (
            DataType::Opaque(field.data_type().to_string()),
            rendered(array.as_ref())?,
        ),
    };
    Ok(Column::with_dtype(field.name().clone(), dtype, values)
        .with_arrow_source(ArrowSource::new(field.clone(), array.clone())))
}

pub(super) fn encode(table: &Table) -> Result<Vec<u8>, CodecError> {
    let mut fields = Vec::with_capacity(table.column_count());
    let mut arrays = Vec::with_capacity(table.column_count());
    for column in table.columns() {
        let (field, array) = encode_column(column)?;
        fields.push(field);
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields).with_metadata(table.metadata().clone()));
    let options = RecordBatchOptions::new().with_row_count(Some(table.row_count()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buffer)
}

/// Untouched source columns are written back as read.  Rebuilt columns keep
/// the source field's name, nullability and metadata; only the type follows
/// the new values.
fn encode_column(column: &Column) -> Result<(FieldRef, ArrayRef), CodecError> {
    if let Some(source) = column.arrow_source()
        && let Some(array) = source.array()
    {
        return Ok((source.field().clone(), array.clone()));
    }

    let array = to_array(column)?;
    let field = match column.arrow_source() {
        Some(source) => {
            let nullable = source.field().is_nullable() || array.null_count() > 0;
            source
                .field()
                .as_ref()
                .clone()
                .with_data_type(array.data_type().clone())
                .with_nullable(nullable)
        }
        None => Field::new(column.name(), array.data_type().clone(), true),
    };
    Ok((Arc::new(field), array))
}

fn dtype_from_arrow(arrow_type: &ArrowType) -> Option<DataType> {
    Some(match arrow_type {
        ArrowType::Null => DataType::Null,
        ArrowType::Boolean => DataType::Boolean,
        ArrowType::Int8 => DataType::Integer(IntWidth::I8),
        ArrowType::Int16 => DataType::Integer(IntWidth::I16),
        ArrowType::Int32 => DataType::Integer(IntWidth::I32),
        ArrowType::Int64 => DataType::Integer(IntWidth::I64),
        ArrowType::UInt8 => DataType::Integer(IntWidth::U8),
        ArrowType::UInt16 => DataType::Integer(IntWidth::U16),
        ArrowType::UInt32 => DataType::Integer(IntWidth::U32),
        ArrowType::UInt64 => DataType::Integer(IntWidth::U64),
        ArrowType::Float32 => DataType::Float(FloatWidth::F32),
        ArrowType::Float64 => DataType::Float(FloatWidth::F64),
        ArrowType::Utf8 => DataType::Utf8,
        ArrowType::LargeUtf8 => DataType::LargeUtf8,
        ArrowType::Date32 => DataType::Date,
        ArrowType::Timestamp(unit, tz) => DataType::Timestamp {
            unit: match unit {
                ArrowTimeUnit::Second => TimeUnit::Second,
                ArrowTimeUnit::Millisecond => TimeUnit::Millisecond,
                ArrowTimeUnit::Microsecond => TimeUnit::Microsecond,
                ArrowTimeUnit::Nanosecond => TimeUnit::Nanosecond,
            },
            tz: tz.as_ref().map(|tz| tz.to_string()),
        },
        _ => return None,
    })
}

/// Display rendering of each cell, nulls kept as nulls.
fn rendered(array: &dyn Array) -> Result<Vec<Value>, CodecError> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array, &options)?;
    Ok((0..array.len())
        .map(|row| {
            if array.is_null(row) {
                Value::Null
            } else {
                Value::Str(formatter.value(row).to_string())
            }
        })
        .collect())
}

fn append_values(array: &dyn Array, dtype: &DataType, out: &mut Vec<Value>) -> Result<(), CodecError> {
    match dtype {
        DataType::Null => out.extend(std::iter::repeat_n(Value::Null, array.len())),
        DataType::Boolean => {
            let typed = array.as_boolean_opt().ok_or_else(schema_mismatch)?;
            out.extend(typed.iter().map(|cell| cell.map(Value::Bool).unwrap_or(Value::Null)));
        }
        DataType::Integer(width) => match width {
            IntWidth::I8 => push_primitive::<Int8Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::I16 => push_primitive::<Int16Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::I32 => push_primitive::<Int32Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::I64 => push_primitive::<Int64Type>(array, out, |v| Ok(Value::Int(v)))?,
            IntWidth::U8 => push_primitive::<UInt8Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::U16 => push_primitive::<UInt16Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::U32 => push_primitive::<UInt32Type>(array, out, |v| Ok(Value::Int(v.into())))?,
            IntWidth::U64 => push_primitive::<UInt64Type>(array, out, |v| {
                Ok(i64::try_from(v).map(Value::Int).unwrap_or(Value::UInt(v)))
            })?,
        },
        DataType::Float(FloatWidth::F32) => {
            push_primitive::<Float32Type>(array, out, |v| Ok(Value::Float(v.into())))?
        }
        DataType::Float(FloatWidth::F64) => {
            push_primitive::<Float64Type>(array, out, |v| Ok(Value::Float(v)))?
        }
        DataType::Utf8 => {
            let typed = array.as_string_opt::<i32>().ok_or_else(schema_mismatch)?;
            out.extend(typed.iter().map(|cell| {
                cell.map(|s| Value::Str(s.to_string())).unwrap_or(Value::Null)
            }));
        }
        DataType::LargeUtf8 => {
            let typed = array.as_string_opt::<i64>().ok_or_else(schema_mismatch)?;
            out.extend(typed.iter().map(|cell| {
                cell.map(|s| Value::Str(s.to_string())).unwrap_or(Value::Null)
            }));
        }
        DataType::Date => push_primitive::<Date32Type>(array, out, date_from_days)?,
        DataType::Timestamp { unit, .. } => {
            let unit = *unit;
            match unit {
                TimeUnit::Second => push_primitive::<TimestampSecondType>(array, out, |v| {
                    timestamp_from(v, unit)
                })?,
                TimeUnit::Millisecond => {
                    push_primitive::<TimestampMillisecondType>(array, out, |v| {
                        timestamp_from(v, unit)
                    })?
                }
                TimeUnit::Microsecond => {
                    push_primitive::<TimestampMicrosecondType>(array, out, |v| {
                        timestamp_from(v, unit)
                    })?
                }
                TimeUnit::Nanosecond => {
                    push_primitive::<TimestampNanosecondType>(array, out, |v| {
                        timestamp_from(v, unit)
                    })?
                }
            }
        }
        DataType::Mixed | DataType::Opaque(_) => return Err(schema_mismatch()),
    }
    Ok(())
}

fn push_primitive<T: ArrowPrimitiveType>(
    array: &dyn Array,
    out: &mut Vec<Value>,
    convert: impl Fn(T::Native) -> Result<Value, CodecError>,
) -> Result<(), CodecError> {
    let typed = array.as_primitive_opt::<T>().ok_or_else(schema_mismatch)?;
    for cell in typed.iter() {
        out.push(match cell {
            Some(v) => convert(v)?,
            None => Value::Null,
        });
    }
    Ok(())
}

fn schema_mismatch() -> CodecError {
    CodecError::Invalid("column data does not match its schema type".to_string())
}

fn date_from_days(days: i32) -> Result<Value, CodecError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(Value::Date)
        .ok_or_else(|| CodecError::Invalid(format!("date out of range: {days} days")))
}

fn timestamp_from(value: i64, unit: TimeUnit) -> Result<Value, CodecError> {
    let (secs, nanos) = match unit {
        TimeUnit::Second => (value, 0),
        TimeUnit::Millisecond => (value.div_euclid(1_000), value.rem_euclid(1_000) * 1_000_000),
        TimeUnit::Microsecond => (
            value.div_euclid(1_000_000),
            value.rem_euclid(1_000_000) * 1_000,
        ),
        TimeUnit::Nanosecond => (
            value.div_euclid(1_000_000_000),
            value.rem_euclid(1_000_000_000),
        ),
    };
    DateTime::from_timestamp(secs, nanos as u32)
        .map(|dt| Value::Timestamp(dt.naive_utc()))
        .ok_or_else(|| CodecError::Invalid(format!("timestamp out of range: {value}")))
}

fn timestamp_to(ts: &NaiveDateTime, unit: TimeUnit) -> Result<i64, CodecError> {
    let utc = ts.and_utc();
    match unit {
        TimeUnit::Second => Ok(utc.timestamp()),
        TimeUnit::Millisecond => Ok(utc.timestamp_millis()),
        TimeUnit::Microsecond => Ok(utc.timestamp_micros()),
        TimeUnit::Nanosecond => utc
            .timestamp_nanos_opt()
            .ok_or_else(|| CodecError::Invalid(format!("timestamp out of range: {ts}"))),
    }
}

fn unexpected(column: &Column, value: &Value) -> CodecError {
    CodecError::Invalid(format!(
        "column {} of type {:?} holds {:?}",
        column.name(),
        column.dtype(),
        value
    ))
}

fn ints<T: TryFrom<i64> + TryFrom<u64>>(column: &Column) -> Result<Vec<Option<T>>, CodecError> {
    let out_of_range = |value: &Value| {
        CodecError::Invalid(format!(
            "value {} out of range for column {}",
            value.to_text(),
            column.name()
        ))
    };
    column
        .values()
        .iter()
        .map(|value| match value {
            Value::Int(i) => <T as TryFrom<i64>>::try_from(*i)
                .map(Some)
                .map_err(|_| out_of_range(value)),
            Value::UInt(u) => <T as TryFrom<u64>>::try_from(*u)
                .map(Some)
                .map_err(|_| out_of_range(value)),
            v if v.is_null() => Ok(None),
            other => Err(unexpected(column, other)),
        })
        .collect()
}

fn floats(column: &Column) -> Result<Vec<Option<f64>>, CodecError> {
    column
        .values()
        .iter()
        .map(|value| match value {
            Value::Float(f) => Ok(Some(*f)),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::UInt(u) => Ok(Some(*u as f64)),
            Value::Null => Ok(None),
            other => Err(unexpected(column, other)),
        })
        .collect()
}

fn texts(column: &Column) -> Vec<Option<String>> {
    column
        .values()
        .iter()
        .map(|value| match value {
            Value::Str(s) => Some(s.clone()),
            v if v.is_null() => None,
            other => Some(other.to_text()),
        })
        .collect()
}

fn days(column: &Column) -> Result<Vec<Option<i32>>, CodecError> {
    column
        .values()
        .iter()
        .map(|value| match value {
            Value::Date(d) => Ok(Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
            Value::Timestamp(ts) => Ok(Some(ts.date().num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
            v if v.is_null() => Ok(None),
            other => Err(unexpected(column, other)),
        })
        .collect()
}

fn instants(column: &Column, unit: TimeUnit) -> Result<Vec<Option<i64>>, CodecError> {
    column
        .values()
        .iter()
        .map(|value| match value {
            Value::Timestamp(ts) => timestamp_to(ts, unit).map(Some),
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| unexpected(column, value))
                .and_then(|ts| timestamp_to(&ts, unit))
                .map(Some),
            v if v.is_null() => Ok(None),
            other => Err(unexpected(column, other)),
        })
        .collect()
}

fn to_array(column: &Column) -> Result<ArrayRef, CodecError> {
    let array: ArrayRef = match column.dtype() {
        DataType::Null => Arc::new(NullArray::new(column.len())),
        DataType::Boolean => {
            let cells = column
                .values()
                .iter()
                .map(|value| match value {
                    Value::Bool(b) => Ok(Some(*b)),
                    v if v.is_null() => Ok(None),
                    other => Err(unexpected(column, other)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(BooleanArray::from(cells))
        }
        DataType::Integer(width) => match width {
            IntWidth::I8 => Arc::new(Int8Array::from(ints::<i8>(column)?)),
            IntWidth::I16 => Arc::new(Int16Array::from(ints::<i16>(column)?)),
            IntWidth::I32 => Arc::new(Int32Array::from(ints::<i32>(column)?)),
            IntWidth::I64 => Arc::new(Int64Array::from(ints::<i64>(column)?)),
            IntWidth::U8 => Arc::new(UInt8Array::from(ints::<u8>(column)?)),
            IntWidth::U16 => Arc::new(UInt16Array::from(ints::<u16>(column)?)),
            IntWidth::U32 => Arc::new(UInt32Array::from(ints::<u32>(column)?)),
            IntWidth::U64 => Arc::new(UInt64Array::from(ints::<u64>(column)?)),
        },
        DataType::Float(FloatWidth::F32) => {
            let cells = floats(column)?
                .into_iter()
                .map(|cell| cell.map(|f| f as f32))
                .collect::<Vec<_>>();
            Arc::new(Float32Array::from(cells))
        }
        DataType::Float(FloatWidth::F64) => Arc::new(Float64Array::from(floats(column)?)),
        DataType::Utf8 | DataType::Mixed | DataType::Opaque(_) => {
            Arc::new(StringArray::from(texts(column)))
        }
        DataType::LargeUtf8 => Arc::new(LargeStringArray::from(texts(column))),
        DataType::Date => Arc::new(Date32Array::from(days(column)?)),
        DataType::Timestamp { unit, tz } => {
            let cells = instants(column, *unit)?;
            match unit {
                TimeUnit::Second => {
                    Arc::new(TimestampSecondArray::from(cells).with_timezone_opt(tz.clone()))
                }
                TimeUnit::Millisecond => {
                    Arc::new(TimestampMillisecondArray::from(cells).with_timezone_opt(tz.clone()))
                }
                TimeUnit::Microsecond => {
                    Arc::new(TimestampMicrosecondArray::from(cells).with_timezone_opt(tz.clone()))
                }
                TimeUnit::Nanosecond => {
                    Arc::new(TimestampNanosecondArray::from(cells).with_timezone_opt(tz.clone()))
                }
            }
        }
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let day = NaiveDate::from_ymd_opt(2024, 5, 17).expect("date");
        let stamp = day.and_hms_milli_opt(9, 15, 30, 250).expect("timestamp");
        Table::new(vec![
            Column::with_dtype(
                "student_id",
                DataType::Integer(IntWidth::I32),
                vec![Value::Int(1234), Value::Int(1235)],
            ),
            Column::with_dtype(
                "name",
                DataType::Utf8,
                vec![Value::Str("John Smith".into()), Value::Null],
            ),
            Column::with_dtype(
                "notes",
                DataType::LargeUtf8,
                vec![Value::Str("first".into()), Value::Str("second".into())],
            ),
            Column::with_dtype(
                "credits",
                DataType::Integer(IntWidth::U16),
                vec![Value::Int(120), Value::Null],
            ),
            Column::with_dtype(
                "gpa",
                DataType::Float(FloatWidth::F32),
                vec![Value::Float(3.5), Value::Float(2.25)],
            ),
            Column::with_dtype(
                "enrolled",
                DataType::Boolean,
                vec![Value::Bool(true), Value::Bool(false)],
            ),
            Column::with_dtype("graduation", DataType::Date, vec![Value::Date(day), Value::Null]),
            Column::with_dtype(
                "updated_at",
                DataType::Timestamp {
                    unit: TimeUnit::Millisecond,
                    tz: Some("UTC".to_string()),
                },
                vec![Value::Timestamp(stamp), Value::Timestamp(stamp)],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn round_trip_preserves_types_and_values() {
        let table = sample_table();
        let bytes = encode(&table).expect("encode");
        let decoded = decode(&bytes).expect("decode");
        assert_eq!(decoded, table);
    }

    #[test]
    fn overwritten_columns_come_back_textual() {
        let mut table = sample_table();
        let mut columns: Vec<Column> = table.columns().to_vec();
        columns[0].overwrite_with("***");
        table = Table::new(columns).expect("table");

        let decoded = decode(&encode(&table).expect("encode")).expect("decode");
        let id = decoded.column("student_id").expect("id");
        assert_eq!(id.dtype(), &DataType::Utf8);
        assert_eq!(id.values(), &[Value::Str("***".into()), Value::Str("***".into())]);
        assert_eq!(
            decoded.column("gpa").expect("gpa").dtype(),
            &DataType::Float(FloatWidth::F32)
        );
    }

    /// Writes a file the way an external producer would: a decimal column,
    /// a required key and a pandas block in the schema metadata.
    fn producer_file() -> Vec<u8> {
        use arrow::array::Decimal128Array;
        use std::collections::HashMap;

        let schema = Arc::new(
            Schema::new(vec![
                Field::new("student_id", ArrowType::Int64, false),
                Field::new("name", ArrowType::Utf8, false),
                Field::new("fees", ArrowType::Decimal128(10, 2), true),
            ])
            .with_metadata(HashMap::from([(
                "pandas".to_string(),
                r#"{"index_columns": []}"#.to_string(),
            )])),
        );
        let fees = Decimal128Array::from(vec![Some(925_050), None])
            .with_precision_and_scale(10, 2)
            .expect("decimal");
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1234, 1235])),
                Arc::new(StringArray::from(vec!["John Smith", "Jane Doe"])),
                Arc::new(fees),
            ],
        )
        .expect("batch");
        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");
        buffer
    }

    fn read_back(bytes: Vec<u8>) -> RecordBatch {
        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
            .expect("builder")
            .build()
            .expect("reader");
        let batches = reader.collect::<Result<Vec<_>, _>>().expect("batches");
        concat_batches(&batches[0].schema(), &batches).expect("concat")
    }

    fn mask_name(table: Table) -> Table {
        let mut columns = table.columns().to_vec();
        for column in columns.iter_mut().filter(|c| c.name() == "name") {
            column.overwrite_with("***");
        }
        Table::new(columns)
            .expect("table")
            .with_metadata(table.metadata().clone())
    }

    #[test]
    fn unknown_types_decode_as_text_and_pass_through() {
        let table = decode(&producer_file()).expect("decode");
        let fees = table.column("fees").expect("fees");
        assert_eq!(fees.dtype(), &DataType::Opaque("Decimal128(10, 2)".to_string()));
        assert_eq!(fees.values(), &[Value::Str("9250.50".into()), Value::Null]);

        let out = read_back(encode(&mask_name(table)).expect("encode"));
        let original = read_back(producer_file());
        assert_eq!(
            out.schema().field_with_name("fees").expect("fees").data_type(),
            &ArrowType::Decimal128(10, 2)
        );
        assert_eq!(
            out.column_by_name("fees").expect("fees"),
            original.column_by_name("fees").expect("fees")
        );
    }

    #[test]
    fn nullability_and_schema_metadata_survive_masking() {
        let table = decode(&producer_file()).expect("decode");
        let out = read_back(encode(&mask_name(table)).expect("encode"));
        let schema = out.schema();

        let id = schema.field_with_name("student_id").expect("id");
        assert!(!id.is_nullable());
        assert_eq!(id.data_type(), &ArrowType::Int64);
        let name = schema.field_with_name("name").expect("name");
        assert!(!name.is_nullable());
        assert_eq!(name.data_type(), &ArrowType::Utf8);
        assert!(schema.field_with_name("fees").expect("fees").is_nullable());
        assert_eq!(
            schema.metadata().get("pandas").map(String::as_str),
            Some(r#"{"index_columns": []}"#)
        );
    }

    #[test]
    fn unsigned_values_above_i64_round_trip() {
        let table = Table::new(vec![Column::with_dtype(
            "account",
            DataType::Integer(IntWidth::U64),
            vec![Value::UInt(u64::MAX), Value::Int(7)],
        )])
        .expect("table");
        let decoded = decode(&encode(&table).expect("encode")).expect("decode");
        assert_eq!(decoded, table);
    }

    #[test]
    fn garbage_bytes_are_a_parquet_error() {
        let err = decode(b"student_id,name\n1,a\n").unwrap_err();
        assert!(matches!(err, CodecError::Parquet(_)), "got {err:?}");
    }

    #[test]
    fn timestamps_convert_across_units() {
        let value = timestamp_from(-1_500, TimeUnit::Millisecond).expect("timestamp");
        let Value::Timestamp(ts) = value else {
            panic!("expected timestamp");
        };
        assert_eq!(ts.to_string(), "1969-12-31 23:59:58.500");
        assert_eq!(timestamp_to(&ts, TimeUnit::Millisecond).expect("millis"), -1_500);
    }
}
