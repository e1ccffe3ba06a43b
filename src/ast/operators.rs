use std::fmt;

use crate::ast::Token;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`=`), exact match with no coercion
    Equal,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
}

impl BinOp {
    /// Maps an operator token to its binary operator, if it is one.
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Eq => Some(BinOp::Equal),
            Token::Lt => Some(BinOp::LessThan),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Subtract),
            Token::Star => Some(BinOp::Multiply),
            Token::Slash => Some(BinOp::Divide),
            Token::And => Some(BinOp::And),
            Token::Or => Some(BinOp::Or),
            _ => None,
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> i8 {
        match self {
            BinOp::Multiply | BinOp::Divide => 3,
            BinOp::Add | BinOp::Subtract => 2,
            BinOp::Equal | BinOp::LessThan | BinOp::GreaterThan => 2,
            BinOp::And => 1,
            BinOp::Or => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Equal => "=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
