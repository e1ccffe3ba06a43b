//! Query execution.
//!
//! [`Engine::execute`] runs a parsed [`Query`] against a [`Table`] in three
//! steps:
//!
//! 1. **Filter** - evaluate `WHERE` on every row and keep the indices of the
//!    rows where it is `true`, in ascending order.
//! 2. **Classify** - pick one of three shapes:
//!    - every projection is an aggregate: one output row over all survivors
//!      (a `GROUP BY` clause is ignored in this case);
//!    - a `GROUP BY` clause is present: one output row per group;
//!    - otherwise a plain projection, one output row per survivor.
//! 3. **Build** - assemble a new output table. The input is never modified.

use std::{collections::BTreeMap, sync::Arc};

use arrow::{
    array::{ArrayRef, Float64Array, Float64Builder},
    datatypes::{DataType, Field},
};

use crate::{
    aggregate::eval_aggregate,
    ast::{Expr, Query},
    evaluator::{EvalError, EvalMode, Evaluator},
    table::{Table, take_rows},
    value::Value,
};

/// Executes queries. Holds no state besides its evaluation mode, so one
/// engine can serve any number of queries, including from several threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    evaluator: Evaluator,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: EvalMode) -> Self {
        Engine {
            evaluator: Evaluator::with_mode(mode),
        }
    }

    /// Executes `query` against `table`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use arrow::array::Float64Array;
    /// use arrow::datatypes::{DataType, Field};
    /// use lakeql::{Engine, Query, Table};
    ///
    /// let table = Table::try_new(
    ///     vec![Field::new("Close", DataType::Float64, true)],
    ///     vec![Arc::new(Float64Array::from(vec![900.0, 1200.0]))],
    /// )
    /// .unwrap();
    ///
    /// let query: Query = "SELECT Close FROM prices WHERE Close > 1000".parse().unwrap();
    /// let result = Engine::new().execute(&query, &table).unwrap();
    /// assert_eq!(result.num_rows(), 1);
    /// ```
    pub fn execute(&self, query: &Query, table: &Table) -> Result<Table, EvalError> {
        let rows = self.filter(table, query.filter.as_ref())?;
        tracing::debug!(
            table = %query.table_name,
            input_rows = table.num_rows(),
            surviving_rows = rows.len(),
            "filtered rows"
        );

        if query.is_all_aggregate() {
            tracing::debug!("executing whole-table aggregation");
            return self.aggregate(&query.projections, table, &rows);
        }

        if !query.group_by.is_empty() {
            tracing::debug!(keys = query.group_by.len(), "executing grouped aggregation");
            return self.group(query, table, &rows);
        }

        tracing::debug!("executing projection");
        self.project(&query.projections, table, &rows)
    }

    /// Returns the ascending indices of the rows where `condition` is true.
    /// Without a condition every row passes.
    pub fn filter(&self, table: &Table, condition: Option<&Expr>) -> Result<Vec<usize>, EvalError> {
        let Some(condition) = condition else {
            return Ok((0..table.num_rows()).collect());
        };

        let mut passing = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            match self.evaluator.eval(condition, table, row)? {
                Value::Bool(true) => passing.push(row),
                Value::Bool(false) => {}
                other => {
                    return Err(EvalError::TypeError {
                        row,
                        found: other.type_name(),
                    });
                }
            }
        }
        Ok(passing)
    }

    fn project(&self, projections: &[Expr], table: &Table, rows: &[usize]) -> Result<Table, EvalError> {
        if let Some(call) = projections.iter().find(|e| e.is_aggregate()) {
            return Err(EvalError::UnsupportedExpression {
                expr: call.to_string(),
                context: "a projection list mixing aggregates and plain expressions",
            });
        }

        // Survivors are a strictly increasing subset, so equal length means
        // every row survived and arrays can be shared as-is.
        let all_rows = rows.len() == table.num_rows();
        let pass_through = |index: usize| -> Result<Option<(Field, ArrayRef)>, EvalError> {
            let (Some(field), Some(array)) = (table.field(index), table.column(index)) else {
                return Ok(None);
            };
            let array = if all_rows {
                Arc::clone(array)
            } else {
                take_rows(array.as_ref(), rows)?
            };
            Ok(Some((field.clone(), array)))
        };

        let mut fields = Vec::with_capacity(projections.len());
        let mut columns = Vec::with_capacity(projections.len());

        for (i, expr) in projections.iter().enumerate() {
            match expr {
                Expr::Column(name) => {
                    let index = table
                        .index_of(name)
                        .ok_or_else(|| EvalError::ColumnNotFound(name.clone()))?;
                    if let Some((field, array)) = pass_through(index)? {
                        fields.push(field);
                        columns.push(array);
                    }
                }
                Expr::Star => {
                    for index in 0..table.num_columns() {
                        if let Some((field, array)) = pass_through(index)? {
                            fields.push(field);
                            columns.push(array);
                        }
                    }
                }
                _ => {
                    let mut builder = Float64Builder::with_capacity(rows.len());
                    for &row in rows {
                        match self.evaluator.eval(expr, table, row)? {
                            Value::Null => builder.append_null(),
                            value => builder.append_value(value.to_float()),
                        }
                    }
                    fields.push(Field::new(format!("expr_{}", i), DataType::Float64, true));
                    columns.push(Arc::new(builder.finish()) as ArrayRef);
                }
            }
        }

        Ok(Table::with_row_count(fields, columns, rows.len())?)
    }

    fn aggregate(&self, projections: &[Expr], table: &Table, rows: &[usize]) -> Result<Table, EvalError> {
        let mut fields = Vec::with_capacity(projections.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(projections.len());

        for (i, expr) in projections.iter().enumerate() {
            let Expr::Function { name, args } = expr else {
                return Err(EvalError::UnsupportedExpression {
                    expr: expr.to_string(),
                    context: "an aggregate-only projection list",
                });
            };

            let value = eval_aggregate(&self.evaluator, name, args, table, rows)?;
            fields.push(Field::new(format!("expr_{}", i), DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(vec![value])));
        }

        Ok(Table::with_row_count(fields, columns, 1)?)
    }

    fn group(&self, query: &Query, table: &Table, rows: &[usize]) -> Result<Table, EvalError> {
        let outputs = self.group_outputs(&query.projections, table)?;

        // Keys sort lexicographically; that is the only ordering of groups.
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for &row in rows {
            let mut parts = Vec::with_capacity(query.group_by.len());
            for expr in &query.group_by {
                parts.push(self.evaluator.eval(expr, table, row)?);
            }
            groups.entry(group_key(&parts)).or_default().push(row);
        }
        tracing::debug!(groups = groups.len(), "grouped rows");

        // Buckets are created on first insert, so never empty.
        let first_rows: Vec<usize> = groups.values().filter_map(|members| members.first().copied()).collect();

        let mut fields = Vec::with_capacity(outputs.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(outputs.len());

        for output in outputs {
            match output {
                GroupOutput::Representative { index, field } => {
                    if let Some(array) = table.column(index) {
                        columns.push(take_rows(array.as_ref(), &first_rows)?);
                        fields.push(field);
                    }
                }
                GroupOutput::Aggregate { name, args, field } => {
                    let mut builder = Float64Builder::with_capacity(groups.len());
                    for members in groups.values() {
                        builder.append_value(eval_aggregate(&self.evaluator, name, args, table, members)?);
                    }
                    columns.push(Arc::new(builder.finish()));
                    fields.push(field);
                }
            }
        }

        Ok(Table::with_row_count(fields, columns, groups.len())?)
    }

    /// Resolves each projection of a grouped query before any row is read,
    /// so a bad projection fails even when no rows survive.
    fn group_outputs<'q>(&self, projections: &'q [Expr], table: &Table) -> Result<Vec<GroupOutput<'q>>, EvalError> {
        projections
            .iter()
            .map(|expr| match expr {
                Expr::Column(name) => {
                    let (index, field) = table
                        .index_of(name)
                        .and_then(|index| table.field(index).map(|field| (index, field.clone())))
                        .ok_or_else(|| EvalError::ColumnNotFound(name.clone()))?;
                    Ok(GroupOutput::Representative { index, field })
                }
                Expr::Function { name, args } => Ok(GroupOutput::Aggregate {
                    name,
                    args,
                    field: Field::new(name.to_uppercase(), DataType::Float64, true),
                }),
                other => Err(EvalError::UnsupportedExpression {
                    expr: other.to_string(),
                    context: "a GROUP BY projection list",
                }),
            })
            .collect()
    }
}

/// One output column of a grouped query.
enum GroupOutput<'q> {
    /// Value taken from the first row of each group
    Representative { index: usize, field: Field },
    /// Aggregate evaluated over each group's rows
    Aggregate {
        name: &'q str,
        args: &'q [Expr],
        field: Field,
    },
}

/// Canonical GROUP BY key: the rendered values joined with `|`.
///
/// Values of different types that render the same (the float `5` and the
/// string `"5"`) produce the same key and end up in the same group.
pub fn group_key(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Executes `query` against `table` with the default (lenient) engine.
pub fn execute_query(query: &Query, table: &Table) -> Result<Table, EvalError> {
    Engine::new().execute(query, table)
}
