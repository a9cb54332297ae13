use std::{error::Error, fmt::Display, iter::Peekable};

use tracing::{debug, trace};

use crate::{
    diagnostics::{Diagnostic, Location},
    expr::{AssignExpr, BinaryExpr, Expr, Literal, LogicalExpr, UnaryExpr},
    printer,
    stmt::{IfStmt, Stmt, VarDeclaration, WhileStmt},
    token::{Keyword, Lexeme, Token},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    pub line: usize,
}

impl ParseError {
    pub(crate) fn at(lexeme: &Lexeme, kind: ParseErrorKind) -> Self {
        Self {
            kind,
            location: Location::of(lexeme),
            line: lexeme.line,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Diagnostic::from(self).fmt(f)
    }
}

impl Error for ParseError {}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Expect ')' after expression.")]
    ExpectedRightParenAfterExpr,

    #[error("Expect expression.")]
    ExpectedExpression,

    #[error("Expect ';' after value.")]
    ExpectedSemicolonAfterValue,

    #[error("Expect ';' after expression.")]
    ExpectedSemicolonAfterExpr,

    #[error("Expect variable name.")]
    ExpectedVariableName,

    #[error("Expect ';' after variable declaration.")]
    ExpectedSemicolonAfterVarDeclaration,

    #[error("Expect '(' after 'if'.")]
    ExpectedLeftParenAfterIf,

    #[error("Expect ')' after if condition.")]
    ExpectedRightParenAfterIfCondition,

    #[error("Expect '(' after 'while'.")]
    ExpectedLeftParenAfterWhile,

    #[error("Expect ')' after condition.")]
    ExpectedRightParenAfterCondition,

    #[error("Expect '}}' after block.")]
    ExpectedRightBraceAfterBlock,

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
}

/// The statements that parsed cleanly plus every syntax error found.
/// Statements are only safe to run when `errors` is empty.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub statements: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a full program. The lexemes must end with an EOF lexeme, as
/// [`crate::scanner::scan`] guarantees.
pub fn parse(lexemes: impl IntoIterator<Item = Lexeme>) -> Parsed {
    Parser::new(lexemes.into_iter()).parse()
}

pub struct Parser<I>
where
    I: Iterator<Item = Lexeme>,
{
    tokens: Peekable<I>,
    errors: Vec<ParseError>,
}

macro_rules! binary_expression_impl {
    ($self:ident, $inner_parser:ident, $variant:ident, $node:ident, $matcher:pat) => {{
        let mut current = $self.$inner_parser()?;

        while let $matcher = &$self.peek().token {
            let operator = $self.advance();
            let right = $self.$inner_parser()?;

            current = Expr::$variant(Box::new($node {
                left: current,
                operator,
                right,
            }));
        }

        Ok(current)
    }};
}

impl<I> Parser<I>
where
    I: Iterator<Item = Lexeme>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens: tokens.peekable(),
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Parsed {
        let mut statements = Vec::new();
        while !self.peek().is_eof() {
            if let Some(stmt) = self.declaration() {
                trace!(stmt = %printer::print_stmt(&stmt), "parsed statement");
                statements.push(stmt);
            }
        }

        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "finished parsing"
        );
        Parsed {
            statements,
            errors: self.errors,
        }
    }

    fn peek(&mut self) -> &Lexeme {
        self.tokens.peek().expect("skipped past EOF token")
    }

    fn advance(&mut self) -> Lexeme {
        self.tokens.next().expect("peeked item already consumed")
    }

    fn check(&mut self, token: &Token) -> bool {
        &self.peek().token == token
    }

    fn match_token(&mut self, token: Token) -> Option<Lexeme> {
        if self.check(&token) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        self.match_token(Token::Keyword(keyword)).is_some()
    }

    /// Consume the next lexeme if it is the expected token. A mismatching
    /// lexeme is left in place so recovery can inspect it.
    fn ensure_next_token(
        &mut self,
        token: Token,
        error_on_mismatch: ParseErrorKind,
    ) -> Result<Lexeme, ParseError> {
        match self.match_token(token) {
            Some(lexeme) => Ok(lexeme),
            None => Err(ParseError::at(self.peek(), error_on_mismatch)),
        }
    }

    fn ensure_identifier(&mut self, error_on_mismatch: ParseErrorKind) -> Result<Lexeme, ParseError> {
        if let Token::Identifier(_) = self.peek().token {
            Ok(self.advance())
        } else {
            Err(ParseError::at(self.peek(), error_on_mismatch))
        }
    }

    /// Discard lexemes until a likely statement boundary.
    fn synchronize(&mut self) {
        loop {
            match &self.peek().token {
                Token::Eof => break,
                Token::Semicolon => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                    if let Token::Keyword(keyword) = &self.peek().token {
                        if keyword.starts_statement() {
                            break;
                        }
                    }
                }
            }
        }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_keyword(Keyword::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!(error = %e, "recovering from syntax error");
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.ensure_identifier(ParseErrorKind::ExpectedVariableName)?;
        let initializer = match self.match_token(Token::Equal) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.ensure_next_token(
            Token::Semicolon,
            ParseErrorKind::ExpectedSemicolonAfterVarDeclaration,
        )?;

        Ok(Stmt::VarDeclaration(VarDeclaration::new(name, initializer)))
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_keyword(Keyword::If) {
            self.if_statement()
        } else if self.match_keyword(Keyword::While) {
            self.while_statement()
        } else if self.match_keyword(Keyword::Print) {
            self.print_statement()
        } else if self.match_token(Token::LeftBrace).is_some() {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.ensure_next_token(Token::LeftParen, ParseErrorKind::ExpectedLeftParenAfterIf)?;
        let condition = self.expression()?;
        self.ensure_next_token(
            Token::RightParen,
            ParseErrorKind::ExpectedRightParenAfterIfCondition,
        )?;

        let then_branch = self.statement()?;
        // A dangling `else` belongs to the nearest `if`.
        let else_branch = if self.match_keyword(Keyword::Else) {
            Some(self.statement()?)
        } else {
            None
        };

        Ok(Stmt::If(Box::new(IfStmt::new(
            condition,
            then_branch,
            else_branch,
        ))))
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.ensure_next_token(Token::LeftParen, ParseErrorKind::ExpectedLeftParenAfterWhile)?;
        let condition = self.expression()?;
        self.ensure_next_token(
            Token::RightParen,
            ParseErrorKind::ExpectedRightParenAfterCondition,
        )?;
        let body = self.statement()?;

        Ok(Stmt::While(Box::new(WhileStmt::new(condition, body))))
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.ensure_next_token(Token::Semicolon, ParseErrorKind::ExpectedSemicolonAfterValue)?;
        Ok(Stmt::Print(value))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(&Token::RightBrace) && !self.peek().is_eof() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.ensure_next_token(Token::RightBrace, ParseErrorKind::ExpectedRightBraceAfterBlock)?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.ensure_next_token(Token::Semicolon, ParseErrorKind::ExpectedSemicolonAfterExpr)?;
        Ok(expr.into())
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;

        let Some(equals) = self.match_token(Token::Equal) else {
            return Ok(expr);
        };
        let value = self.assignment()?;

        match expr {
            Expr::Variable(name) => Ok(Expr::Assign(Box::new(AssignExpr { name, value }))),
            other => {
                // Reported, but the parse carries on with the left-hand side.
                self.errors.push(ParseError::at(
                    &equals,
                    ParseErrorKind::InvalidAssignmentTarget,
                ));
                Ok(other)
            }
        }
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(
            self,
            logic_and,
            Logical,
            LogicalExpr,
            Token::Keyword(Keyword::Or)
        )
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(
            self,
            equality,
            Logical,
            LogicalExpr,
            Token::Keyword(Keyword::And)
        )
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(
            self,
            comparison,
            Binary,
            BinaryExpr,
            Token::BangEqual | Token::EqualEqual
        )
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(
            self,
            term,
            Binary,
            BinaryExpr,
            Token::Greater | Token::GreaterEqual | Token::Less | Token::LessEqual
        )
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(self, factor, Binary, BinaryExpr, Token::Minus | Token::Plus)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        binary_expression_impl!(self, unary, Binary, BinaryExpr, Token::Slash | Token::Star)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if let Token::Bang | Token::Minus = self.peek().token {
            let operator = self.advance();
            let unary = UnaryExpr {
                operator,
                right: self.unary()?,
            };
            return Ok(Expr::Unary(Box::new(unary)));
        };

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let next_token = self.peek();
        let maybe_parsed = match &next_token.token {
            Token::Number(n) => Some(Expr::Literal(Literal::Number(*n))),
            Token::String(s) => Some(Expr::Literal(Literal::String(s.clone()))),
            Token::True => Some(Expr::Literal(Literal::Boolean(true))),
            Token::False => Some(Expr::Literal(Literal::Boolean(false))),
            Token::Nil => Some(Expr::Literal(Literal::Nil)),
            Token::Identifier(_) => Some(Expr::Variable(next_token.clone())),
            _ => None,
        };

        if let Some(parsed) = maybe_parsed {
            self.advance();
            return Ok(parsed);
        }

        if self.match_token(Token::LeftParen).is_some() {
            let inner_expr = self.expression()?;
            self.ensure_next_token(
                Token::RightParen,
                ParseErrorKind::ExpectedRightParenAfterExpr,
            )?;
            return Ok(Expr::Grouping(Box::new(inner_expr)));
        }

        Err(ParseError::at(
            self.peek(),
            ParseErrorKind::ExpectedExpression,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn parse_source(source: &str) -> Parsed {
        let scanned = scan(source);
        assert!(!scanned.has_errors(), "unexpected scan errors in {source:?}");
        parse(scanned.lexemes)
    }

    fn printed(source: &str) -> Vec<String> {
        let parsed = parse_source(source);
        assert!(
            !parsed.has_errors(),
            "unexpected parse errors: {:?}",
            parsed.errors
        );
        parsed.statements.iter().map(printer::print_stmt).collect()
    }

    fn error_messages(source: &str) -> Vec<String> {
        parse_source(source)
            .errors
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(printed("1 + 2 * 3;"), vec!["(; (+ 1 (* 2 3)))"]);
        assert_eq!(printed("(1 + 2) * 3;"), vec!["(; (* (group (+ 1 2)) 3))"]);
        assert_eq!(
            printed("!a == b < -c;"),
            vec!["(; (== (! a) (< b (- c))))"]
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(printed("1 - 2 - 3;"), vec!["(; (- (- 1 2) 3))"]);
        assert_eq!(printed("8 / 4 / 2;"), vec!["(; (/ (/ 8 4) 2))"]);
    }

    #[test]
    fn logical_operators_bind_looser_than_equality() {
        assert_eq!(
            printed("a or b and c == d;"),
            vec!["(; (or a (and b (== c d))))"]
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(printed("a = b = 3;"), vec!["(; (= a (= b 3)))"]);
    }

    #[test]
    fn parses_statements() {
        assert_eq!(
            printed("var x; var y = \"s\"; print x; { x = 1; } if (x) print 1; else print 2; while (y) y = nil;"),
            vec![
                "(var x)",
                "(var y \"s\")",
                "(print x)",
                "(block (; (= x 1)))",
                "(if x (print 1) (print 2))",
                "(while y (; (= y nil)))",
            ]
        );
    }

    #[test]
    fn else_binds_to_nearest_if() {
        assert_eq!(
            printed("if (a) if (b) print 1; else print 2;"),
            vec!["(if a (if b (print 1) (print 2)))"]
        );
    }

    #[test]
    fn invalid_assignment_target_keeps_parsing() {
        let parsed = parse_source("a + b = c; print 1;");
        assert_eq!(
            parsed.errors,
            vec![ParseError {
                kind: ParseErrorKind::InvalidAssignmentTarget,
                location: Location::At("=".into()),
                line: 1,
            }]
        );
        let printed: Vec<_> = parsed.statements.iter().map(printer::print_stmt).collect();
        assert_eq!(printed, vec!["(; (+ a b))", "(print 1)"]);
    }

    #[test]
    fn reports_missing_tokens_at_the_offending_lexeme() {
        assert_eq!(
            error_messages("print (1;"),
            vec!["[line 1] Error at ';': Expect ')' after expression."]
        );
        assert_eq!(
            error_messages("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
        assert_eq!(
            error_messages("{ var a = 1;"),
            vec!["[line 1] Error at end: Expect '}' after block."]
        );
        assert_eq!(
            error_messages("var 1 = 2;"),
            vec!["[line 1] Error at '1': Expect variable name."]
        );
        assert_eq!(
            error_messages("while x) print x;"),
            vec!["[line 1] Error at 'x': Expect '(' after 'while'."]
        );
    }

    #[test]
    fn string_lexemes_are_reported_with_their_quotes() {
        assert_eq!(
            error_messages("print \"a\" \"b\";"),
            vec!["[line 1] Error at '\"b\"': Expect ';' after value."]
        );
    }

    #[test]
    fn reports_every_broken_statement_in_one_pass() {
        let parsed = parse_source("print 1 +;\nvar = 2;\nprint 3;");
        assert_eq!(
            parsed.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at '=': Expect variable name.",
            ]
        );
        let printed: Vec<_> = parsed.statements.iter().map(printer::print_stmt).collect();
        assert_eq!(printed, vec!["(print 3)"]);
    }

    #[test]
    fn reserved_keywords_are_not_expressions() {
        assert_eq!(
            error_messages("print this;"),
            vec!["[line 1] Error at 'this': Expect expression."]
        );
    }

    #[test]
    fn recovers_at_statement_boundaries() {
        let parsed = parse_source("var a = 1;\nvar b = ;\nprint a;");
        assert_eq!(
            parsed.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["[line 2] Error at ';': Expect expression."]
        );
        let printed: Vec<_> = parsed.statements.iter().map(printer::print_stmt).collect();
        assert_eq!(printed, vec!["(var a 1)", "(print a)"]);
    }

    #[test]
    fn recovers_before_a_statement_keyword() {
        let parsed = parse_source("print 1 + ) 2\nprint 3;");
        assert_eq!(parsed.errors.len(), 1);
        let printed: Vec<_> = parsed.statements.iter().map(printer::print_stmt).collect();
        assert_eq!(printed, vec!["(print 3)"]);
    }

    #[test]
    fn recovers_inside_blocks() {
        let parsed = parse_source("{ print ; print 2; }");
        assert_eq!(parsed.errors.len(), 1);
        let printed: Vec<_> = parsed.statements.iter().map(printer::print_stmt).collect();
        assert_eq!(printed, vec!["(block (print 2))"]);
    }
}
