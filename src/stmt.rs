use serde::{Deserialize, Serialize};

use crate::{expr::Expr, token::Lexeme};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Print(Expr),
    Expression(Expr),
    VarDeclaration(VarDeclaration),
    Block(Vec<Stmt>),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct VarDeclaration {
    pub name: Lexeme,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Stmt,
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Self::Expression(expr)
    }
}
