use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::token::Lexeme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Assign(Box<AssignExpr>),
    Binary(Box<BinaryExpr>),
    Grouping(Box<Expr>),
    Literal(Literal),
    Logical(Box<LogicalExpr>),
    Unary(Box<UnaryExpr>),
    Variable(Lexeme),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub operator: Lexeme,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Expr,
    pub operator: Lexeme,
    pub right: Expr,
}

/// `and` / `or`, kept apart from [`BinaryExpr`] because the right operand
/// is only evaluated when the left one doesn't already decide the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpr {
    pub left: Expr,
    pub operator: Lexeme,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignExpr {
    pub name: Lexeme,
    pub value: Expr,
}
