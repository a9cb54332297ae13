use std::rc::Rc;

use phf::phf_map;
use tracing::debug;

use crate::token::{Keyword, Lexeme, Token};

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "and" => Keyword::And,
    "class" => Keyword::Class,
    "else" => Keyword::Else,
    "for" => Keyword::For,
    "fun" => Keyword::Fun,
    "if" => Keyword::If,
    "or" => Keyword::Or,
    "print" => Keyword::Print,
    "return" => Keyword::Return,
    "super" => Keyword::Super,
    "this" => Keyword::This,
    "var" => Keyword::Var,
    "while" => Keyword::While,
};

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub line: usize,
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanErrorKind {
    #[error("Unexpected character.")]
    UnexpectedCharacter,

    #[error("Unterminated string.")]
    UnterminatedString,
}

/// Everything a single scan produced: the lexemes, always terminated by
/// exactly one EOF lexeme, plus every lexical error encountered on the way.
#[derive(Debug, Clone, Default)]
pub struct Scanned {
    pub lexemes: Vec<Lexeme>,
    pub errors: Vec<ScanError>,
}

impl Scanned {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn scan(source: &str) -> Scanned {
    let mut scanned = Scanned::default();
    for item in Scanner::new(source) {
        match item {
            Ok(lexeme) => scanned.lexemes.push(lexeme),
            Err(e) => scanned.errors.push(e),
        }
    }

    debug!(
        lexemes = scanned.lexemes.len(),
        errors = scanned.errors.len(),
        "finished scanning"
    );
    scanned
}

/// Byte-oriented scanner. Never looks more than two bytes ahead.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
    line_number: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: 0,
            line_number: 1,
            finished: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.position += 1;
        Some(b)
    }

    /// Attempt to match against the next byte. If it matched, consume it
    /// and return a slice from the given start index up to and including the matched byte.
    fn match_char(&mut self, expected: u8, start_index: usize) -> Option<&'a str> {
        if self.peek() == Some(expected) {
            self.position += 1;
            Some(&self.source[start_index..self.position])
        } else {
            None
        }
    }

    /// Consume bytes until the predicate holds for the next one, or the input ends.
    /// The byte satisfying the predicate is left unconsumed.
    fn advance_until(&mut self, predicate: impl Fn(u8) -> bool, start_index: usize) -> &'a str {
        while let Some(b) = self.peek() {
            if predicate(b) {
                break;
            }
            if b == b'\n' {
                self.line_number += 1;
            }
            self.position += 1;
        }
        &self.source[start_index..self.position]
    }

    fn new_lexeme(&self, token: Token, content: &str) -> Lexeme {
        Lexeme::new(token, Rc::from(content), self.line_number)
    }

    fn new_error(&self, kind: ScanErrorKind) -> ScanError {
        ScanError::new(kind, self.line_number)
    }

    fn new_identifier(&self, content: &'a str) -> Lexeme {
        let token = KEYWORDS
            .get(content)
            .map(|keyword| Token::Keyword(*keyword))
            .unwrap_or_else(|| match content {
                // Handle literals that look like keywords, and handle identifiers.
                "nil" => Token::Nil,
                "false" => Token::False,
                "true" => Token::True,
                identifier => Token::Identifier(Rc::from(identifier)),
            });
        self.new_lexeme(token, content)
    }

    fn skip_comment(&mut self) {
        // The newline is left in place so the main loop counts it.
        let start = self.position;
        self.advance_until(|b| b == b'\n', start);
    }

    fn new_string_literal(&mut self, opening_quote_index: usize) -> Result<Lexeme, ScanError> {
        let value = self.advance_until(|b| b == b'"', opening_quote_index + 1);

        // Check if we found the closing quote or not.
        match self.advance() {
            Some(b'"') => {
                // The lexeme keeps its quotes; only the value drops them.
                let content = &self.source[opening_quote_index..self.position];
                Ok(self.new_lexeme(Token::String(Rc::from(value)), content))
            }
            _ => Err(self.new_error(ScanErrorKind::UnterminatedString)),
        }
    }

    fn new_number_literal(&mut self, start_index: usize) -> Lexeme {
        let mut content = self.advance_until(|b| !b.is_ascii_digit(), start_index);

        if let (Some(b'.'), Some(b'0'..=b'9')) = (self.peek(), self.peek_next()) {
            // Found a decimal point and a digit behind it, continue advancing.
            self.position += 1;
            content = self.advance_until(|b| !b.is_ascii_digit(), start_index);
        }

        let number = content
            .parse()
            .expect("digits with an optional fraction always parse as f64");
        self.new_lexeme(Token::Number(number), content)
    }

    fn one_or_two(&mut self, start_index: usize, single: Token, double: Token) -> Lexeme {
        match self.match_char(b'=', start_index) {
            Some(content) => self.new_lexeme(double, content),
            None => self.new_lexeme(single, &self.source[start_index..self.position]),
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Lexeme, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let start_index = self.position;
            let Some(start_byte) = self.advance() else {
                self.finished = true;
                break Some(Ok(self.new_lexeme(Token::Eof, "")));
            };

            // Empty when the start byte is part of a multi-byte character;
            // such bytes are only ever reported as unexpected.
            let content = self
                .source
                .get(start_index..self.position)
                .unwrap_or_default();
            let maybe_lexeme = match start_byte {
                b'(' => Some(Ok(self.new_lexeme(Token::LeftParen, content))),
                b')' => Some(Ok(self.new_lexeme(Token::RightParen, content))),
                b'{' => Some(Ok(self.new_lexeme(Token::LeftBrace, content))),
                b'}' => Some(Ok(self.new_lexeme(Token::RightBrace, content))),
                b',' => Some(Ok(self.new_lexeme(Token::Comma, content))),
                b'.' => Some(Ok(self.new_lexeme(Token::Dot, content))),
                b'-' => Some(Ok(self.new_lexeme(Token::Minus, content))),
                b'+' => Some(Ok(self.new_lexeme(Token::Plus, content))),
                b';' => Some(Ok(self.new_lexeme(Token::Semicolon, content))),
                b'*' => Some(Ok(self.new_lexeme(Token::Star, content))),
                b'!' => Some(Ok(self.one_or_two(start_index, Token::Bang, Token::BangEqual))),
                b'=' => Some(Ok(self.one_or_two(start_index, Token::Equal, Token::EqualEqual))),
                b'<' => Some(Ok(self.one_or_two(start_index, Token::Less, Token::LessEqual))),
                b'>' => Some(Ok(self.one_or_two(
                    start_index,
                    Token::Greater,
                    Token::GreaterEqual,
                ))),
                b'/' => {
                    if self.match_char(b'/', start_index).is_some() {
                        self.skip_comment();
                        None
                    } else {
                        Some(Ok(self.new_lexeme(Token::Slash, content)))
                    }
                }
                b'"' => Some(self.new_string_literal(start_index)),
                b'0'..=b'9' => Some(Ok(self.new_number_literal(start_index))),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    let content = self.advance_until(
                        |b| !(b.is_ascii_alphanumeric() || b == b'_'),
                        start_index,
                    );
                    Some(Ok(self.new_identifier(content)))
                }
                b' ' | b'\r' | b'\t' => None, // ignore whitespace
                b'\n' => {
                    self.line_number += 1;
                    None
                }
                _ => Some(Err(self.new_error(ScanErrorKind::UnexpectedCharacter))),
            };

            // If we found a lexeme or an error, return it. If not, keep looking.
            if let Some(item) = maybe_lexeme {
                break Some(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        scan(source).lexemes.into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn scans_operators_and_punctuation() {
        assert_eq!(
            tokens("(){},.-+;*! != = == < <= > >= /"),
            vec![
                Token::LeftParen,
                Token::RightParen,
                Token::LeftBrace,
                Token::RightBrace,
                Token::Comma,
                Token::Dot,
                Token::Minus,
                Token::Plus,
                Token::Semicolon,
                Token::Star,
                Token::Bang,
                Token::BangEqual,
                Token::Equal,
                Token::EqualEqual,
                Token::Less,
                Token::LessEqual,
                Token::Greater,
                Token::GreaterEqual,
                Token::Slash,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_keep_their_lexeme() {
        let scanned = scan("a >= b");
        assert_eq!(scanned.lexemes[1].content.as_ref(), ">=");
    }

    #[test]
    fn keywords_literals_and_identifiers() {
        assert_eq!(
            tokens("var _x1 = nil and true or false while class"),
            vec![
                Token::Keyword(Keyword::Var),
                Token::Identifier(Rc::from("_x1")),
                Token::Equal,
                Token::Nil,
                Token::Keyword(Keyword::And),
                Token::True,
                Token::Keyword(Keyword::Or),
                Token::False,
                Token::Keyword(Keyword::While),
                Token::Keyword(Keyword::Class),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            tokens("12.5 7."),
            vec![Token::Number(12.5), Token::Number(7.0), Token::Dot, Token::Eof]
        );
    }

    #[test]
    fn comments_produce_no_tokens_and_newlines_count() {
        let scanned = scan("// a comment\n1 / 2 // trailing\n\n");
        let lines: Vec<_> = scanned.lexemes.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![2, 2, 2, 4]);
        assert_eq!(scanned.lexemes[1].token, Token::Slash);
    }

    #[test]
    fn string_literal_spans_lines() {
        let scanned = scan("\"one\ntwo\" x");
        assert_eq!(scanned.lexemes[0].token, Token::String(Rc::from("one\ntwo")));
        assert_eq!(scanned.lexemes[0].content.as_ref(), "\"one\ntwo\"");
        assert_eq!(scanned.lexemes[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_reported_without_a_token() {
        let scanned = scan("print \"oops\n");
        assert_eq!(
            scanned.errors,
            vec![ScanError::new(ScanErrorKind::UnterminatedString, 2)]
        );
        assert_eq!(
            scanned.lexemes.iter().map(|l| &l.token).collect::<Vec<_>>(),
            vec![&Token::Keyword(Keyword::Print), &Token::Eof]
        );
    }

    #[test]
    fn unexpected_characters_do_not_stop_scanning() {
        let scanned = scan("1 @\n# 2");
        assert_eq!(
            scanned.errors,
            vec![
                ScanError::new(ScanErrorKind::UnexpectedCharacter, 1),
                ScanError::new(ScanErrorKind::UnexpectedCharacter, 2),
            ]
        );
        assert_eq!(
            tokens("1 @\n# 2"),
            vec![Token::Number(1.0), Token::Number(2.0), Token::Eof]
        );
    }

    #[test]
    fn non_ascii_bytes_are_each_unexpected() {
        // 'é' is two bytes in UTF-8.
        let scanned = scan("print 1; é");
        assert_eq!(
            scanned.errors,
            vec![
                ScanError::new(ScanErrorKind::UnexpectedCharacter, 1),
                ScanError::new(ScanErrorKind::UnexpectedCharacter, 1),
            ]
        );
        assert_eq!(
            scanned.lexemes.iter().map(|l| &l.token).collect::<Vec<_>>(),
            vec![
                &Token::Keyword(Keyword::Print),
                &Token::Number(1.0),
                &Token::Semicolon,
                &Token::Eof,
            ]
        );

        let scanned = scan("λx = \"ünï\";");
        assert_eq!(scanned.errors.len(), 2);
        assert_eq!(scanned.lexemes[0].token, Token::Identifier(Rc::from("x")));
        assert_eq!(scanned.lexemes[2].token, Token::String(Rc::from("ünï")));
        assert!(scanned.lexemes.last().expect("eof lexeme").is_eof());
    }

    #[test]
    fn always_ends_with_a_single_eof_on_the_last_line() {
        for source in ["", "1;\n2;\n", "\"unterminated", "@\n\n"] {
            let scanned = scan(source);
            let eofs: Vec<_> = scanned.lexemes.iter().filter(|l| l.is_eof()).collect();
            assert_eq!(eofs.len(), 1, "{source:?}");
            let last = scanned.lexemes.last().expect("eof lexeme");
            assert!(last.is_eof());
            assert_eq!(last.line, source.matches('\n').count() + 1, "{source:?}");
        }
    }
}
