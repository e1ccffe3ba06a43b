use std::fmt;

use crate::ast::BinOp;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Expressions are built once by the parser and never mutated afterwards.
/// Parentheses have no node of their own; they only steer parse order.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a table column by case-sensitive name
    ///
    /// # Example
    /// ```text
    /// Close
    /// ```
    Column(String),

    /// Raw literal lexeme
    ///
    /// Evaluates to a float when the text parses as one, otherwise to the
    /// text itself.
    ///
    /// # Example
    /// ```text
    /// 1000.5
    /// ```
    Literal(String),

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Aggregate function call
    ///
    /// The name keeps the case it was written in. Argument count and content
    /// are only checked when the call is evaluated.
    ///
    /// # Examples
    /// ```text
    /// COUNT(*)
    /// AVG((High + Low) / 2)
    /// ```
    Function { name: String, args: Vec<Expr> },

    /// The bare `*`, as in `COUNT(*)` or `SELECT *`
    Star,
}

impl Expr {
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Function { .. })
    }
}

/// Canonical rendering. Every binary node is wrapped in parentheses so the
/// text parses back into the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(text) => write!(f, "{}", text),
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Star => write!(f, "*"),
        }
    }
}
