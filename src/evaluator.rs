use thiserror::Error;

use crate::{
    ast::{BinOp, Expr},
    table::{Table, TableError},
    value::Value,
};

/// Errors that can occur while executing a query against a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// No column with this exact name in the input table
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The `WHERE` condition produced something other than a boolean
    #[error("WHERE clause must evaluate to boolean, got {found} at row {row}")]
    TypeError { row: usize, found: &'static str },

    /// An aggregate called with the wrong number of arguments
    #[error("{function} expects {expected} argument(s), got {found}")]
    ArityError {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported aggregate function: {0}")]
    UnsupportedFunction(String),

    /// An expression whose shape is not allowed where it appears
    #[error("unsupported expression {expr} in {context}")]
    UnsupportedExpression { expr: String, context: &'static str },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// How errors raised while evaluating the operands of a binary expression
/// are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalMode {
    /// Operand errors are absorbed and the operand becomes `Null`, which then
    /// coerces like any other null (`0.0` for arithmetic, `false` for logic).
    #[default]
    Lenient,

    /// Operand errors abort the evaluation.
    Strict,
}

/// Evaluates expressions against a single row of a table.
///
/// Evaluation is pure: it reads the table and never mutates anything, so
/// rows can be evaluated in any order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    mode: EvalMode,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: EvalMode) -> Self {
        Evaluator { mode }
    }

    /// Evaluates `expr` at `row`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use arrow::array::Float64Array;
    /// use arrow::datatypes::{DataType, Field};
    /// use lakeql::{Evaluator, Expr, Table, Value};
    ///
    /// let table = Table::try_new(
    ///     vec![Field::new("Close", DataType::Float64, true)],
    ///     vec![Arc::new(Float64Array::from(vec![10.0]))],
    /// )
    /// .unwrap();
    ///
    /// let expr: Expr = "SELECT Close * 2 FROM t".parse::<lakeql::Query>().unwrap().projections[0].clone();
    /// assert_eq!(Evaluator::new().eval(&expr, &table, 0).unwrap(), Value::Float(20.0));
    /// ```
    pub fn eval(&self, expr: &Expr, table: &Table, row: usize) -> Result<Value, EvalError> {
        match expr {
            Expr::Column(name) => column_value(table, name, row),
            Expr::Literal(text) => Ok(match text.parse::<f64>() {
                Ok(n) => Value::Float(n),
                Err(_) => Value::Text(text.clone()),
            }),
            Expr::Binary { left, op, right } => {
                let left_val = self.eval_operand(left, table, row)?;
                let right_val = self.eval_operand(right, table, row)?;
                Ok(apply_binop(*op, &left_val, &right_val))
            }
            // Only meaningful as the argument of COUNT(*)
            Expr::Star => Ok(Value::Text("*".to_string())),
            Expr::Function { .. } => Err(EvalError::UnsupportedExpression {
                expr: expr.to_string(),
                context: "row-wise evaluation (aggregates need a set of rows)",
            }),
        }
    }

    fn eval_operand(&self, expr: &Expr, table: &Table, row: usize) -> Result<Value, EvalError> {
        match self.eval(expr, table, row) {
            Ok(value) => Ok(value),
            Err(err) => match self.mode {
                EvalMode::Lenient => {
                    tracing::trace!(row, error = %err, "operand error absorbed as null");
                    Ok(Value::Null)
                }
                EvalMode::Strict => Err(err),
            },
        }
    }
}

/// Reads the cell of column `name` at `row`.
pub fn column_value(table: &Table, name: &str, row: usize) -> Result<Value, EvalError> {
    let index = table
        .index_of(name)
        .ok_or_else(|| EvalError::ColumnNotFound(name.to_string()))?;

    Ok(table.value(index, row)?)
}

/// Applies a binary operator to two already evaluated operands.
///
/// Ordering and arithmetic coerce both sides to floats; `=` compares the
/// values exactly, so operands of different types are never equal.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::And => Value::Bool(left.to_bool() && right.to_bool()),
        BinOp::Or => Value::Bool(left.to_bool() || right.to_bool()),
        BinOp::GreaterThan => Value::Bool(left.to_float() > right.to_float()),
        BinOp::LessThan => Value::Bool(left.to_float() < right.to_float()),
        BinOp::Equal => Value::Bool(left == right),
        BinOp::Add => Value::Float(left.to_float() + right.to_float()),
        BinOp::Subtract => Value::Float(left.to_float() - right.to_float()),
        BinOp::Multiply => Value::Float(left.to_float() * right.to_float()),
        BinOp::Divide => Value::Float(left.to_float() / right.to_float()),
    }
}
