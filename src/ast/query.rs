use std::fmt;

use crate::ast::Expr;

/// Complete parsed query.
///
/// Built once by the parser and read-only thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Projected expressions, in output order (never empty)
    pub projections: Vec<Expr>,

    /// Table named in `FROM`
    pub table_name: String,

    /// Optional `WHERE` condition
    pub filter: Option<Expr>,

    /// `GROUP BY` expressions (possibly empty)
    pub group_by: Vec<Expr>,
}

impl Query {
    /// True when every projection is an aggregate call.
    pub fn is_all_aggregate(&self) -> bool {
        self.projections.iter().all(Expr::is_aggregate)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {}", join(&self.projections))?;
        write!(f, " FROM {}", self.table_name)?;

        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }

        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", join(&self.group_by))?;
        }

        Ok(())
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
