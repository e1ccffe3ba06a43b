//! Documentation content for lakeql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Aggregates,
    GroupBy,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "select" => Some(Self::Syntax),
            "operators" | "ops" | "where" => Some(Self::Operators),
            "aggregates" | "aggregate" | "functions" => Some(Self::Aggregates),
            "group_by" | "group" | "grouping" => Some(Self::GroupBy),
            "types" | "type" | "nulls" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"LAKEQL DOCUMENTATION

LakeQL runs a small subset of SQL against a single in-memory table. Tables are
read as JSON (an array of row objects or an object of column arrays) or as CSV
with a header row; files ending in .csv are read as CSV.

DOCUMENTATION CATEGORIES

  syntax            SELECT / FROM / WHERE / GROUP BY structure
  operators         Arithmetic, comparison and logical operators, precedence
  aggregates        COUNT, SUM, AVG, MAX, MIN
  group-by          Grouping rules and output ordering
  types             Column types, literals, nulls and coercion

QUICK REFERENCE

  SELECT Date, Close FROM prices WHERE Close > 1000
  SELECT (Open + Close) / 2 FROM prices
  SELECT COUNT(*), AVG(Volume) FROM prices
  SELECT Region, COUNT(*) FROM prices GROUP BY Region

Run 'lakeql doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Aggregates) => Ok(AGGREGATES_DOC),
        Some(DocCategory::GroupBy) => Ok(GROUP_BY_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

  SELECT <projection>, ... FROM <table> [WHERE <expr>] [GROUP BY <expr>, ...]

Keywords are case-insensitive; column names are case-sensitive.

PROJECTIONS

  *                 Every column, unchanged
  Close             A column, passed through with its name and type
  Close * 2         Any expression; output column is a float named expr_<n>
  SUM(Volume)       An aggregate call

Projections that are all aggregates produce a single row. Aggregates cannot
be mixed with plain expressions unless the query has GROUP BY.

NOT SUPPORTED

  Quoted strings, >=, <=, !=, <>, NOT, unary minus, ORDER BY, LIMIT, HAVING,
  joins and subqueries.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

PRECEDENCE (tightest first)

  * /               3
  + - > < =         2
  AND               1
  OR                0

Operators of equal precedence group left to right. Use parentheses to
override: (Open + Close) / 2.

SEMANTICS

  + - * /           Both sides coerced to numbers; x / 0 is Inf or NaN
  > <               Both sides coerced to numbers
  =                 Exact match, no coercion; a number never equals a string
  AND OR            Booleans as-is, non-zero numbers and non-empty strings
                    are true, NULL is false

WHERE must produce a boolean for every row; WHERE Close alone is an error.
"#;

const AGGREGATES_DOC: &str = r#"AGGREGATES

  COUNT(*)          Number of rows
  COUNT(expr)       Number of rows where expr is not NULL
  SUM(expr)         Sum of non-NULL values
  AVG(expr)         Mean of non-NULL values, 0 when there are none
  MAX(expr)         Largest non-NULL value, 0 when there are none
  MIN(expr)         Smallest non-NULL value, 0 when there are none

Function names are case-insensitive. Each takes exactly one argument.
Aggregates cannot be nested inside other expressions.
"#;

const GROUP_BY_DOC: &str = r#"GROUP BY

  SELECT Region, COUNT(*), AVG(Close) FROM prices GROUP BY Region

Rows are grouped by the text of their GROUP BY values joined with '|'.
Groups are returned sorted by that text, so 10 sorts before 9.

Each projection must be a column or an aggregate call:

  column            Value from the first row of the group
  aggregate         Computed over the group's rows; output column is named
                    after the function in upper case (COUNT, AVG, ...)

If every projection is an aggregate the GROUP BY clause is ignored and a
single row is returned.
"#;

const TYPES_DOC: &str = r#"TYPES

COLUMNS

  float64           JSON numbers, or CSV columns of numbers
  utf8              JSON strings, or any other CSV column

Every column is nullable and empty CSV cells are NULL. JSON booleans,
arrays, objects, or a column mixing numbers and strings are rejected.

LITERALS

  Only numeric literals exist: 42, 3.14, .5

COERCION

  To number         Strings that parse as numbers use that value; anything
                    else is 0
  To boolean        See 'lakeql doc operators'

NULLS

  A NULL cell passes through column projections unchanged; operators coerce
  it (0 for arithmetic, false for AND/OR). In the default (lenient) mode a
  failing operand, such as an unknown column inside an expression, also
  becomes NULL; --strict reports the error instead.
"#;
