//! # LakeQL - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for LakeQL, a small
//! SQL subset evaluated against in-memory columnar tables.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (columns, literals, operations, calls)
//! - **[operators]** - Binary operators and their precedence
//! - **[query]** - Complete query structure
//!
//! ## Quick Start
//!
//! ```text
//! SELECT Date, Close FROM prices WHERE Close > 1000 AND Volume < 5000
//! ```
//!
//! This query keeps rows whose close is above 1000 with volume below 5000
//! and returns their date and close.
//!
//! ## Grammar
//!
//! ```text
//! Query    := SELECT ProjList FROM Ident [WHERE Expr] [GROUP BY ExprList]
//! ProjList := Proj (',' Proj)*
//! Proj     := '*' | Expr
//! Expr     := Primary (BinOp Primary)*        -- precedence climbing
//! Primary  := Ident | Ident '(' ('*' | ExprList)? ')' | Literal | '(' Expr ')'
//! ```
//!
//! ### Precedence
//!
//! | Level | Operators        |
//! |-------|------------------|
//! | 3     | `*` `/`          |
//! | 2     | `+` `-` `>` `<` `=` |
//! | 1     | `AND`            |
//! | 0     | `OR`             |
//!
//! Operators of equal precedence associate to the left, so
//! `Close > 1 = 0` parses as `((Close > 1) = 0)`.
//!
//! ### Rendering
//!
//! Every node implements `Display`. Binary nodes are always parenthesised,
//! which makes the rendering canonical and re-parseable:
//!
//! ```text
//! SELECT Date FROM prices WHERE (((Open + Close) / 2) > 5000)
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod query;

pub use tokens::Token;
pub use expressions::Expr;
pub use operators::BinOp;
pub use query::Query;
