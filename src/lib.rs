pub mod aggregate;
pub mod ast;
pub mod cli;
pub mod engine;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod table;
pub mod value;

pub use aggregate::Aggregate;
pub use ast::{BinOp, Expr, Query, Token};
pub use engine::{Engine, execute_query, group_key};
pub use evaluator::{EvalError, EvalMode, Evaluator};
pub use lexer::{LexError, Lexer, Position};
pub use output::{to_json, to_json_pretty, to_text};
pub use parser::{ParseError, Parser};
pub use table::{Table, TableError};
pub use value::Value;
