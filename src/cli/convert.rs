//! JSON / CSV -> Table conversion utilities

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field},
};
use csv::{ReaderBuilder, Trim};
use serde_json::Value as JsonValue;

use super::CliError;
use crate::table::{Table, TableError};

/// Convert a JSON document to a table.
///
/// Two layouts are accepted:
///
/// - rows: `[{"Date": "2024-01-02", "Close": 10.5}, ...]`; columns appear in
///   the order their keys are first seen and missing keys are null
/// - columns: `{"Date": [...], "Close": [...]}`; arrays must share a length
pub fn json_to_table(v: JsonValue) -> Result<Table, TableError> {
    match v {
        JsonValue::Array(rows) => rows_to_table(rows),
        JsonValue::Object(columns) => {
            let mut named = Vec::with_capacity(columns.len());
            for (name, cells) in columns {
                match cells {
                    JsonValue::Array(cells) => named.push((name, cells)),
                    other => {
                        return Err(TableError::InvalidLayout(format!(
                            "column '{}' must be an array, got {}",
                            name,
                            json_type_name(&other)
                        )));
                    }
                }
            }
            build_table(named)
        }
        other => Err(TableError::InvalidLayout(format!(
            "expected an array of rows or an object of columns, got {}",
            json_type_name(&other)
        ))),
    }
}

fn rows_to_table(rows: Vec<JsonValue>) -> Result<Table, TableError> {
    let mut named: Vec<(String, Vec<JsonValue>)> = vec![];

    for (row_index, row) in rows.into_iter().enumerate() {
        let JsonValue::Object(row) = row else {
            return Err(TableError::InvalidLayout(format!(
                "row {} must be an object, got {}",
                row_index,
                json_type_name(&row)
            )));
        };

        for (key, cell) in row {
            let position = match named.iter().position(|(name, _)| *name == key) {
                Some(position) => position,
                None => {
                    // Earlier rows had no value for this column.
                    named.push((key, vec![JsonValue::Null; row_index]));
                    named.len() - 1
                }
            };
            named[position].1.push(cell);
        }

        for (_, cells) in named.iter_mut() {
            if cells.len() < row_index + 1 {
                cells.push(JsonValue::Null);
            }
        }
    }

    build_table(named)
}

fn build_table(named: Vec<(String, Vec<JsonValue>)>) -> Result<Table, TableError> {
    let mut fields = Vec::with_capacity(named.len());
    let mut columns = Vec::with_capacity(named.len());

    for (name, cells) in named {
        let column = infer_json_column(&name, cells)?;
        fields.push(Field::new(name, column.data_type().clone(), true));
        columns.push(column);
    }

    Table::try_new(fields, columns)
}

/// Numbers make a float column, strings a string column. A column with only
/// nulls is a string column.
fn infer_json_column(name: &str, cells: Vec<JsonValue>) -> Result<ArrayRef, TableError> {
    let mut data_type = None;

    for cell in &cells {
        let cell_type = match cell {
            JsonValue::Null => continue,
            JsonValue::Number(_) => DataType::Float64,
            JsonValue::String(_) => DataType::Utf8,
            other => {
                return Err(TableError::UnsupportedColumnType {
                    column: name.to_string(),
                    found: json_type_name(other).to_string(),
                });
            }
        };

        match data_type {
            None => data_type = Some(cell_type),
            Some(ref seen) if *seen != cell_type => {
                return Err(TableError::UnsupportedColumnType {
                    column: name.to_string(),
                    found: "mixed numbers and strings".to_string(),
                });
            }
            Some(_) => {}
        }
    }

    let array: ArrayRef = match data_type {
        Some(DataType::Float64) => Arc::new(Float64Array::from(
            cells.iter().map(JsonValue::as_f64).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .into_iter()
                .map(|cell| match cell {
                    JsonValue::String(s) => Some(s),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
    };
    Ok(array)
}

fn json_type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Convert CSV text with a header row to a table.
///
/// Cells are trimmed and an empty cell is null. A column whose non-empty
/// cells all parse as numbers is a float column; any other column, including
/// one with no values at all, is a string column. Every record must have as
/// many fields as the header.
pub fn csv_to_table(input: &str) -> Result<Table, CliError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![vec![]; headers.len()];

    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push((!cell.is_empty()).then(|| cell.to_string()));
        }
    }

    let mut fields = Vec::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());

    for (name, column) in headers.into_iter().zip(cells) {
        let column = infer_csv_column(column);
        fields.push(Field::new(name, column.data_type().clone(), true));
        columns.push(column);
    }

    Ok(Table::try_new(fields, columns)?)
}

fn infer_csv_column(cells: Vec<Option<String>>) -> ArrayRef {
    let mut values = cells.iter().flatten().peekable();
    let numeric = values.peek().is_some() && values.all(|cell| cell.parse::<f64>().is_ok());

    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(|s| s.parse::<f64>().ok()))
            .collect();
        Arc::new(Float64Array::from(values)) as ArrayRef
    } else {
        Arc::new(StringArray::from(cells)) as ArrayRef
    }
}
