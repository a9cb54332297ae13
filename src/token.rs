use std::{fmt::Display, rc::Rc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    And,
    Class,
    Else,
    Fun,
    For,
    If,
    Or,
    Print,
    Return,
    Super,
    This,
    Var,
    While,
}

impl Keyword {
    /// Keywords that may begin a declaration or statement.
    /// The parser resynchronizes on these after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            Keyword::Class
                | Keyword::Fun
                | Keyword::Var
                | Keyword::For
                | Keyword::If
                | Keyword::While
                | Keyword::Print
                | Keyword::Return
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // Guaranteed single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Slash, // Double slash means the start of a comment, so we don't emit a '//' token by itself.

    // Literals.
    Identifier(Rc<str>),
    String(Rc<str>),
    Number(f64),
    True,
    False,
    Nil,

    // Keywords.
    Keyword(Keyword),

    // End-of-file token.
    Eof,
}

/// A scanned token together with the exact source text it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct Lexeme {
    pub token: Token,
    pub content: Rc<str>,
    pub line: usize,
}

impl Lexeme {
    pub fn is_eof(&self) -> bool {
        self.token == Token::Eof
    }
}

impl Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
