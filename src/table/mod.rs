// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! In-memory columnar table shared by every format adapter and the masking
//! engine.  Columns keep their source order and all share one row count.

pub mod value;

pub use value::{DataType, FloatWidth, IntWidth, TimeUnit, Value, render_float};

use arrow::array::ArrayRef;
use arrow::datatypes::FieldRef;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("column {name} has {actual} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// Arrow field and array a column was decoded from.  Columnar encoders
/// write an untouched column back from here; once the column is overwritten
/// only the field survives, keeping its nullability and metadata.
#[derive(Debug, Clone)]
pub struct ArrowSource {
    field: FieldRef,
    array: Option<ArrayRef>,
}

impl ArrowSource {
    pub fn new(field: FieldRef, array: ArrayRef) -> Self {
        Self {
            field,
            array: Some(array),
        }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    /// The source data, or `None` once the column's values have changed.
    pub fn array(&self) -> Option<&ArrayRef> {
        self.array.as_ref()
    }
}

/// A named column with its inferred (or source-declared) dtype.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Vec<Value>,
    source: Option<ArrowSource>,
}

/// Columns compare by content; where they were decoded from does not matter.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.dtype == other.dtype && self.values == other.values
    }
}

impl Column {
    /// Build a column and infer its dtype from the values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let dtype = DataType::infer(&values);
        Self {
            name: name.into(),
            dtype,
            values,
            source: None,
        }
    }

    /// Build a column with a dtype declared by the source format.
    pub fn with_dtype(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
            source: None,
        }
    }

    pub fn with_arrow_source(mut self, source: ArrowSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrow_source(&self) -> Option<&ArrowSource> {
        self.source.as_ref()
    }

    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every cell with `token`.  The column becomes textual.
    pub fn overwrite_with(&mut self, token: &str) {
        let rows = self.values.len();
        self.values = vec![Value::Str(token.to_string()); rows];
        self.dtype = DataType::Utf8;
        if let Some(source) = self.source.as_mut() {
            source.array = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
    /// Schema-level key/value metadata from the source (e.g. the `pandas`
    /// block in Parquet files), written back by formats that carry it.
    metadata: HashMap<String, String>,
}

impl Table {
    /// Assemble a table, checking that names are unique and every column has
    /// the same number of rows.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != rows {
                return Err(TableError::RaggedColumn {
                    name: column.name().to_string(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            columns,
            rows,
            metadata: HashMap::new(),
        })
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table is empty when it has no rows, whatever its column count.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Cells of row `index` in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(move |c| &c.values[index])
    }
}
