//! Result presentation for query output tables.
//!
//! Two formats are supported:
//!
//! - **Text** via [`to_text()`] - a fixed-width grid, one line per row,
//!   20 characters per column, floats with two decimals, `NULL` for
//!   missing cells and `unsupported` for cells of other column types
//! - **JSON** via [`to_json()`] / [`to_json_pretty()`] - an array of row
//!   objects whose keys follow the schema order
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field};
//! use lakeql::Table;
//! use lakeql::output::to_json;
//!
//! let table = Table::try_new(
//!     vec![
//!         Field::new("Region", DataType::Utf8, true),
//!         Field::new("COUNT", DataType::Float64, true),
//!     ],
//!     vec![
//!         Arc::new(StringArray::from(vec!["A"])),
//!         Arc::new(Float64Array::from(vec![2.0])),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(to_json(&table), r#"[{"Region":"A","COUNT":2.0}]"#);
//! ```

use std::fmt::Write;

use serde_json::{Map, Number, Value as JsonValue};

use crate::{table::Table, value::Value};

const CELL_WIDTH: usize = 20;

pub struct TextPrinter {
    width: usize,
}

impl Default for TextPrinter {
    fn default() -> Self {
        TextPrinter { width: CELL_WIDTH }
    }
}

impl TextPrinter {
    pub fn print(&self, table: &Table) -> String {
        let mut out = String::new();

        for field in table.schema().fields() {
            let _ = write!(out, "{:<width$}", field.name(), width = self.width);
        }
        out.push('\n');

        for row in 0..table.num_rows() {
            for index in 0..table.num_columns() {
                match table.value(index, row) {
                    Ok(value) => self.print_cell(&mut out, &value),
                    Err(_) => {
                        let _ = write!(out, "{:<width$}", "unsupported", width = self.width);
                    }
                }
            }
            out.push('\n');
        }

        out
    }

    fn print_cell(&self, out: &mut String, value: &Value) {
        let width = self.width;
        let _ = match value {
            Value::Null => write!(out, "{:<width$}", "NULL"),
            Value::Float(n) => write!(out, "{:<width$.2}", n),
            Value::Text(s) => write!(out, "{:<width$}", s),
            Value::Bool(b) => write!(out, "{:<width$}", b),
        };
    }
}

/// Converts an output table to a JSON array of row objects.
///
/// Non-finite floats (from division by zero) have no JSON form and become
/// `null`, as do cells of unsupported column types.
pub fn table_to_json(table: &Table) -> JsonValue {
    let rows = (0..table.num_rows())
        .map(|row| {
            let mut object = Map::with_capacity(table.num_columns());
            for (index, field) in table.schema().fields().iter().enumerate() {
                let value = table.value(index, row).unwrap_or(Value::Null);
                object.insert(field.name().clone(), value_to_json(value));
            }
            JsonValue::Object(object)
        })
        .collect();

    JsonValue::Array(rows)
}

fn value_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Float(n) => Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s),
    }
}

/// Renders a table as a fixed-width text grid.
pub fn to_text(table: &Table) -> String {
    TextPrinter::default().print(table)
}

/// Renders a table as compact JSON.
pub fn to_json(table: &Table) -> String {
    table_to_json(table).to_string()
}

/// Renders a table as JSON with 2-space indentation.
pub fn to_json_pretty(table: &Table) -> String {
    serde_json::to_string_pretty(&table_to_json(table)).unwrap_or_default()
}
