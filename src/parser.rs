use std::{mem, str::FromStr};

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Query, Token},
    lexer::{LexError, Lexer, Position},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required and something else was found.
    #[error("expected {expected}, got '{found}' at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// The token cannot start an expression.
    #[error("unexpected token '{found}' in expression at {position}")]
    UnexpectedPrimary { found: String, position: Position },

    #[error("expected table name after FROM, got '{found}' at {position}")]
    MissingTableName { found: String, position: Position },

    /// The query was complete but more input followed.
    #[error("unexpected trailing input '{found}' at {position}")]
    TrailingInput { found: String, position: Position },
}

/// Binding bound that admits every operator, `OR` included. Non-operator
/// tokens have precedence -1 and so still end the expression.
const LOWEST_PRECEDENCE: i8 = -1;

/// Recursive-descent parser with one token of lookahead.
///
/// Expressions are parsed by precedence climbing over [`BinOp::precedence`].
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    position: Position,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_position();
        Ok(Parser {
            lexer,
            current_token,
            position,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.position = self.lexer.token_position();
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_token.to_string(),
                position: self.position,
            });
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Precedence of the current token as a binary operator; anything that is
    /// not an operator ends the expression.
    fn current_precedence(&self) -> i8 {
        BinOp::from_token(&self.current_token).map_or(-1, BinOp::precedence)
    }

    /// Parse primary expressions: column references, function calls,
    /// literals and parenthesised sub-expressions.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.parse_call(name)
                } else {
                    Ok(Expr::Column(name))
                }
            }
            Token::Literal(text) => {
                self.advance()?;
                Ok(Expr::Literal(text))
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression(LOWEST_PRECEDENCE)?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            token => Err(ParseError::UnexpectedPrimary {
                found: token.to_string(),
                position: self.position,
            }),
        }
    }

    /// Argument list after a function name: `(*)`, `()` or `(expr, ...)`.
    fn parse_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(Token::LParen)?;

        let mut args = vec![];
        if self.check(&Token::Star) {
            self.advance()?;
            args.push(Expr::Star);
        } else if !self.check(&Token::RParen) {
            args = self.parse_expression_list()?;
        }

        self.expect(Token::RParen)?;
        Ok(Expr::Function { name, args })
    }

    /// Precedence climbing: keep folding operators that bind tighter than
    /// `min_precedence` into the left operand.
    pub fn parse_expression(&mut self, min_precedence: i8) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        while min_precedence < self.current_precedence() {
            let Some(op) = BinOp::from_token(&self.current_token) else {
                break;
            };
            self.advance()?;

            let right = self.parse_expression(op.precedence())?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression(LOWEST_PRECEDENCE)?];
        while self.check(&Token::Comma) {
            self.advance()?;
            exprs.push(self.parse_expression(LOWEST_PRECEDENCE)?);
        }
        Ok(exprs)
    }

    fn parse_projection(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Star) {
            self.advance()?;
            return Ok(Expr::Star);
        }
        self.parse_expression(LOWEST_PRECEDENCE)
    }

    fn parse_table_name(&mut self) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            token => Err(ParseError::MissingTableName {
                found: token.to_string(),
                position: self.position,
            }),
        }
    }

    /// Parse a complete query; the whole input must be consumed.
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        self.expect(Token::Select)?;

        let mut projections = vec![self.parse_projection()?];
        while self.check(&Token::Comma) {
            self.advance()?;
            projections.push(self.parse_projection()?);
        }

        self.expect(Token::From)?;
        let table_name = self.parse_table_name()?;

        let filter = if self.check(&Token::Where) {
            self.advance()?;
            Some(self.parse_expression(LOWEST_PRECEDENCE)?)
        } else {
            None
        };

        let mut group_by = vec![];
        if self.check(&Token::Group) {
            self.advance()?;
            self.expect(Token::By)?;
            group_by = self.parse_expression_list()?;
        }

        if !self.check(&Token::Eof) {
            return Err(ParseError::TrailingInput {
                found: self.current_token.to_string(),
                position: self.position,
            });
        }

        tracing::trace!(table = %table_name, projections = projections.len(), "parsed query");

        Ok(Query {
            projections,
            table_name,
            filter,
            group_by,
        })
    }
}

impl FromStr for Query {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(Lexer::new(s))?.parse_query()
    }
}
