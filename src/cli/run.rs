//! Execute lakeql queries against a JSON or CSV table

use std::path::Path;

use super::{CliError, csv_to_table, json_to_table};
use crate::{
    Engine, EvalMode, Query, Table,
    output::{to_json, to_json_pretty, to_text},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Array of row objects or object of column arrays
    #[default]
    Json,
    /// Header row followed by one record per row
    Csv,
}

impl InputFormat {
    /// `.csv` files (any case) are CSV; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Fixed-width grid
    #[default]
    Text,
    /// Array of row objects
    Json,
}

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The query to execute
    pub query: String,
    /// Table input
    pub input: Option<String>,
    /// How to read the input
    pub input_format: InputFormat,
    /// How to render the result
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// How operand errors inside binary expressions are handled
    pub mode: EvalMode,
}

/// Result of a run operation
#[derive(Debug)]
pub enum RunResult {
    /// Syntax validation passed; carries the canonical rendering
    SyntaxValid(String),
    /// Query executed successfully
    Success(Table),
}

/// Parse the query and, unless only syntax is checked, run it against the
/// input table.
pub fn execute_run(options: &RunOptions) -> Result<RunResult, CliError> {
    let query: Query = options.query.parse()?;

    if options.syntax_only {
        return Ok(RunResult::SyntaxValid(query.to_string()));
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let table = match options.input_format {
        InputFormat::Json => json_to_table(serde_json::from_str(input)?)?,
        InputFormat::Csv => csv_to_table(input)?,
    };

    tracing::debug!(
        table = %query.table_name,
        rows = table.num_rows(),
        columns = table.num_columns(),
        format = ?options.input_format,
        mode = ?options.mode,
        "loaded input table"
    );

    let result = Engine::with_mode(options.mode).execute(&query, &table)?;
    Ok(RunResult::Success(result))
}

/// Render an output table in the requested format.
pub fn render(table: &Table, format: OutputFormat, pretty: bool) -> String {
    match format {
        OutputFormat::Text => to_text(table),
        OutputFormat::Json if pretty => to_json_pretty(table),
        OutputFormat::Json => to_json(table),
    }
}
