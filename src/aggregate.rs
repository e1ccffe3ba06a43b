//! Aggregate reducers shared by whole-table and per-group aggregation.

use crate::{
    ast::Expr,
    evaluator::{EvalError, Evaluator},
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl Aggregate {
    /// Case-insensitive lookup by function name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(Aggregate::Count),
            "SUM" => Some(Aggregate::Sum),
            "AVG" => Some(Aggregate::Avg),
            "MAX" => Some(Aggregate::Max),
            "MIN" => Some(Aggregate::Min),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
        }
    }

    /// Reduce the gathered non-null values. `AVG`, `MAX` and `MIN` of no
    /// values are `0.0`.
    pub fn reduce(self, values: &[f64]) -> f64 {
        let Some((&first, rest)) = values.split_first() else {
            return 0.0;
        };

        match self {
            Aggregate::Count => values.len() as f64,
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Max => rest
                .iter()
                .fold(first, |max, &v| if v > max { v } else { max }),
            Aggregate::Min => rest
                .iter()
                .fold(first, |min, &v| if v < min { v } else { min }),
        }
    }
}

/// Evaluates the aggregate call `name(args)` over `rows` of `table`.
pub fn eval_aggregate(
    evaluator: &Evaluator,
    name: &str,
    args: &[Expr],
    table: &Table,
    rows: &[usize],
) -> Result<f64, EvalError> {
    let aggregate =
        Aggregate::from_name(name).ok_or_else(|| EvalError::UnsupportedFunction(name.to_string()))?;

    let [arg] = args else {
        return Err(EvalError::ArityError {
            function: aggregate.name().to_string(),
            expected: 1,
            found: args.len(),
        });
    };

    if aggregate == Aggregate::Count && *arg == Expr::Star {
        return Ok(rows.len() as f64);
    }

    let mut values = Vec::with_capacity(rows.len());
    for &row in rows {
        let value = evaluator.eval(arg, table, row)?;
        if !value.is_null() {
            values.push(value.to_float());
        }
    }

    Ok(aggregate.reduce(&values))
}
