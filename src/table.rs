//! In-memory columnar tables.
//!
//! A [`Table`] wraps an Arrow [`RecordBatch`]: an ordered set of named,
//! typed columns of equal length. The engine reads two column types,
//! nullable 64-bit floats and nullable UTF-8 strings. Columns of any other
//! type can be stored and passed through, but reading one of their cells
//! fails with [`TableError::UnsupportedColumnType`].
//!
//! Arrays are reference counted, so a query that passes a column through
//! unchanged shares it with the input instead of copying it.

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray, UInt64Array},
    compute::take,
    datatypes::{DataType, Field, Schema, SchemaRef},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("schema has {fields} fields but {columns} columns were supplied")]
    FieldCountMismatch { fields: usize, columns: usize },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' is declared {declared} but holds {found} data")]
    TypeMismatch {
        column: String,
        declared: DataType,
        found: DataType,
    },

    /// Data whose type has no [`Value`] representation.
    #[error("unsupported column type for '{column}': {found}")]
    UnsupportedColumnType { column: String, found: String },

    #[error("invalid table layout: {0}")]
    InvalidLayout(String),

    #[error("arrow error: {0}")]
    Arrow(String),
}

impl From<ArrowError> for TableError {
    fn from(err: ArrowError) -> Self {
        TableError::Arrow(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Build a table, checking that every column matches its field's type
    /// and that all columns have the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use arrow::array::Float64Array;
    /// use arrow::datatypes::{DataType, Field};
    /// use lakeql::{Table, Value};
    ///
    /// let table = Table::try_new(
    ///     vec![Field::new("Close", DataType::Float64, true)],
    ///     vec![Arc::new(Float64Array::from(vec![Some(10.5), None]))],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.value(0, 0), Ok(Value::Float(10.5)));
    /// assert_eq!(table.value(0, 1), Ok(Value::Null));
    /// ```
    pub fn try_new(fields: Vec<Field>, columns: Vec<ArrayRef>) -> Result<Self, TableError> {
        let num_rows = columns.first().map_or(0, |c| c.len());
        Self::with_row_count(fields, columns, num_rows)
    }

    /// Same as [`Table::try_new`] with an explicit row count, which is what
    /// gives a table without columns its length.
    pub fn with_row_count(
        fields: Vec<Field>,
        columns: Vec<ArrayRef>,
        num_rows: usize,
    ) -> Result<Self, TableError> {
        if fields.len() != columns.len() {
            return Err(TableError::FieldCountMismatch {
                fields: fields.len(),
                columns: columns.len(),
            });
        }

        for (field, column) in fields.iter().zip(&columns) {
            if column.data_type() != field.data_type() {
                return Err(TableError::TypeMismatch {
                    column: field.name().clone(),
                    declared: field.data_type().clone(),
                    found: column.data_type().clone(),
                });
            }
            if column.len() != num_rows {
                return Err(TableError::LengthMismatch {
                    column: field.name().clone(),
                    expected: num_rows,
                    found: column.len(),
                });
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(Table { batch })
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.batch.schema_ref().fields().get(index).map(|f| &**f)
    }

    /// Linear, case-sensitive scan; the first matching name wins.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .position(|f| f.name() == name)
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column(&self, index: usize) -> Option<&ArrayRef> {
        self.batch.columns().get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        self.index_of(name).and_then(|i| self.column(i))
    }

    /// Cell at (`column`, `row`) as a [`Value`]. Null and out-of-range cells
    /// are `Null`; a valid cell of a type other than float64 or utf8 is an
    /// error.
    pub fn value(&self, column: usize, row: usize) -> Result<Value, TableError> {
        let Some(array) = self.column(column) else {
            return Ok(Value::Null);
        };
        if row >= array.len() || array.is_null(row) {
            return Ok(Value::Null);
        }

        let value = match array.data_type() {
            DataType::Float64 => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|a| Value::Float(a.value(row))),
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|a| Value::Text(a.value(row).to_string())),
            _ => None,
        };

        value.ok_or_else(|| TableError::UnsupportedColumnType {
            column: self
                .field(column)
                .map_or_else(String::new, |f| f.name().clone()),
            found: array.data_type().to_string(),
        })
    }
}

/// Gathers `rows` of `array`, in the given order, into a new array.
pub fn take_rows(array: &dyn Array, rows: &[usize]) -> Result<ArrayRef, TableError> {
    let indices = UInt64Array::from_iter_values(rows.iter().map(|&row| row as u64));
    Ok(take(array, &indices, None)?)
}
