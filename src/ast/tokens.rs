use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords (matched case-insensitively)
    /// `SELECT`
    Select,

    /// `FROM`
    From,

    /// `WHERE`
    Where,

    /// `GROUP`, only meaningful when followed by `BY`
    Group,

    /// `BY`
    By,

    /// Logical AND (word, not symbol)
    ///
    /// # Examples
    /// ```text
    /// Close > 1000 AND Volume < 5000
    /// ```
    And,

    /// Logical OR (word, not symbol)
    Or,

    /// `NOT` is recognised by the lexer but has no place in the grammar yet.
    Not,

    // Identifiers and literals
    /// Column, table, or function name.
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or
    /// underscores. Carries the original-case text.
    ///
    /// # Examples
    /// ```text
    /// Close
    /// market_cap
    /// _internal
    /// ```
    Identifier(String),

    /// Numeric literal, kept as its raw lexeme.
    ///
    /// Whether it is a number is decided at evaluation time.
    ///
    /// # Examples
    /// ```text
    /// 1000
    /// 123.45
    /// .5
    /// ```
    Literal(String),

    // Comparison
    /// Greater than
    Gt,

    /// Less than
    Lt,

    /// Equality
    Eq,

    // Arithmetic
    /// Addition
    Plus,

    /// Subtraction
    Minus,

    /// Multiplication, or the `*` wildcard depending on parse position
    Star,

    /// Division
    Slash,

    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma for separating projections and arguments
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Comparison and equality operators share one precedence level with
    /// `+`/`-` but stay a distinct kind from the arithmetic tokens.
    pub fn is_comparison(&self) -> bool {
        matches!(self, Token::Gt | Token::Lt | Token::Eq)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "SELECT"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::Group => write!(f, "GROUP"),
            Token::By => write!(f, "BY"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Literal(text) => write!(f, "{}", text),
            Token::Gt => write!(f, ">"),
            Token::Lt => write!(f, "<"),
            Token::Eq => write!(f, "="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
