//! CLI support for lakeql
//!
//! Provides programmatic access to the lakeql CLI functionality so the same
//! run path can be embedded in other tools.

mod convert;
mod docs;
mod run;

pub use convert::{csv_to_table, json_to_table};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use run::{InputFormat, OutputFormat, RunOptions, RunResult, execute_run, render};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid table: {0}")]
    Table(#[from] crate::TableError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe a JSON or CSV table to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'lakeql docs' to see available categories.")]
    UnknownCategory(String),
}
