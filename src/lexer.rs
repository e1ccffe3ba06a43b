use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Location of a character in the query text. Lines and columns are 1-based,
/// the offset counts characters from the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },
}

/// Digits in any script. Identifiers and numeric literals classify them the
/// same way; a literal that does not parse as a float evaluates as text.
fn is_digit(ch: char) -> bool {
    ch.is_numeric()
}

/// Single forward pass over the query text.
///
/// The lexer keeps nothing but its cursor and cannot be rewound.
pub struct Lexer {
    input: Vec<char>,
    cursor: Position,
    token_start: Position,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            cursor: Position::start(),
            token_start: Position::start(),
        }
    }

    /// Where the most recently returned token began.
    pub fn token_position(&self) -> Position {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.cursor.offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        self.cursor.offset += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphabetic() || is_digit(ch) || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Digits with at most one `.`; a second `.` ends the literal and is left
    /// for the next token.
    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if is_digit(ch) {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        number
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.cursor;

        let token = match self.current_char() {
            None => Token::Eof,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_word();

                match word.to_ascii_uppercase().as_str() {
                    "SELECT" => Token::Select,
                    "FROM" => Token::From,
                    "WHERE" => Token::Where,
                    "GROUP" => Token::Group,
                    "BY" => Token::By,
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Identifier(word),
                }
            }
            Some(ch) if is_digit(ch) || ch == '.' => Token::Literal(self.read_number()),
            Some('>') => self.single(Token::Gt),
            Some('<') => self.single(Token::Lt),
            Some('=') => self.single(Token::Eq),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(',') => self.single(Token::Comma),
            Some(character) => {
                return Err(LexError::UnexpectedCharacter {
                    character,
                    position: self.cursor,
                });
            }
        };

        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("select FROM Where group By and OR not");
    assert_eq!(lexer.next_token(), Ok(Token::Select));
    assert_eq!(lexer.next_token(), Ok(Token::From));
    assert_eq!(lexer.next_token(), Ok(Token::Where));
    assert_eq!(lexer.next_token(), Ok(Token::Group));
    assert_eq!(lexer.next_token(), Ok(Token::By));
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_where_clause() {
    let mut lexer = Lexer::new("WHERE Close > 1000");
    assert_eq!(lexer.next_token(), Ok(Token::Where));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("Close".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Gt));
    assert_eq!(lexer.next_token(), Ok(Token::Literal("1000".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_token_position_tracks_lines() {
    let mut lexer = Lexer::new("SELECT\n  Close");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let pos = lexer.token_position();
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 3);
    assert_eq!(pos.offset, 9);
}

#[test]
fn test_non_ascii_digits() {
    let mut lexer = Lexer::new("\u{0663}\u{0664} x\u{0663}");
    assert_eq!(lexer.next_token(), Ok(Token::Literal("\u{0663}\u{0664}".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("x\u{0663}".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}
