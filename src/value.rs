use std::fmt;

/// A dynamically typed cell value produced while evaluating an expression
/// against one row.
///
/// Columns only ever hold floats and strings; booleans appear as the result
/// of comparisons and logical operators.
///
/// # Examples
///
/// ```
/// use lakeql::Value;
///
/// assert_eq!(Value::Text("12.5".into()).to_float(), 12.5);
/// assert_eq!(Value::Text("abc".into()).to_float(), 0.0);
/// assert!(Value::Float(-1.0).to_bool());
/// assert!(!Value::Null.to_bool());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing cell, or the absorbed result of a failed sub-evaluation
    Null,

    /// Result of a comparison or logical operator
    Bool(bool),

    /// 64-bit floating point number
    Float(f64),

    /// UTF-8 string
    Text(String),
}

impl Value {
    /// Numeric coercion used by arithmetic and ordering comparisons.
    ///
    /// Strings that parse as a float yield that float; every other
    /// non-float value yields `0.0`.
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Float(n) => *n,
            Value::Text(s) => s.parse::<f64>().unwrap_or(0.0),
            Value::Bool(_) | Value::Null => 0.0,
        }
    }

    /// Truthiness used by `AND` / `OR`.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Float(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Null => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
        }
    }
}

/// Plain rendering, also used to build GROUP BY keys. `5.0` renders as `5`,
/// so a float and a string with the same text are indistinguishable here.
/// Floats never use exponent notation: `0.000001` renders as written.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}
