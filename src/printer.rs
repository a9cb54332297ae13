//! Lisp-style rendering of parsed programs, used for `--print-ast` and for
//! checking tree shapes in tests.

use itertools::Itertools;

use crate::{
    expr::{Expr, Literal},
    stmt::Stmt,
    value::Value,
};

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Assign(assign) => parenthesize("=", [assign.name.to_string(), print_expr(&assign.value)]),
        Expr::Binary(binary) => parenthesize(
            &binary.operator.content,
            [print_expr(&binary.left), print_expr(&binary.right)],
        ),
        Expr::Grouping(inner) => parenthesize("group", [print_expr(inner)]),
        Expr::Literal(Literal::String(s)) => format!("\"{s}\""),
        Expr::Literal(literal) => Value::from(literal).to_string(),
        Expr::Logical(logical) => parenthesize(
            &logical.operator.content,
            [print_expr(&logical.left), print_expr(&logical.right)],
        ),
        Expr::Unary(unary) => parenthesize(&unary.operator.content, [print_expr(&unary.right)]),
        Expr::Variable(name) => name.to_string(),
    }
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Print(expr) => parenthesize("print", [print_expr(expr)]),
        Stmt::Expression(expr) => parenthesize(";", [print_expr(expr)]),
        Stmt::VarDeclaration(decl) => {
            let name = decl.name.to_string();
            match &decl.initializer {
                Some(initializer) => parenthesize("var", [name, print_expr(initializer)]),
                None => parenthesize("var", [name]),
            }
        }
        Stmt::Block(statements) => parenthesize("block", statements.iter().map(print_stmt)),
        Stmt::If(if_stmt) => {
            let mut parts = vec![
                print_expr(&if_stmt.condition),
                print_stmt(&if_stmt.then_branch),
            ];
            parts.extend(if_stmt.else_branch.as_ref().map(print_stmt));
            parenthesize("if", parts)
        }
        Stmt::While(while_stmt) => parenthesize(
            "while",
            [print_expr(&while_stmt.condition), print_stmt(&while_stmt.body)],
        ),
    }
}

pub fn print_program(statements: &[Stmt]) -> String {
    statements.iter().map(print_stmt).join("\n")
}

fn parenthesize(name: &str, parts: impl IntoIterator<Item = String>) -> String {
    let mut parts = parts.into_iter().peekable();
    if parts.peek().is_none() {
        format!("({name})")
    } else {
        format!("({name} {})", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        expr::{BinaryExpr, UnaryExpr},
        token::{Lexeme, Token},
    };

    #[test]
    fn prints_nested_expressions() {
        let expr = Expr::Binary(Box::new(BinaryExpr {
            left: Expr::Unary(Box::new(UnaryExpr {
                operator: Lexeme::new(Token::Minus, Rc::from("-"), 1),
                right: Expr::Literal(Literal::Number(123.0)),
            })),
            operator: Lexeme::new(Token::Star, Rc::from("*"), 1),
            right: Expr::Grouping(Box::new(Expr::Literal(Literal::Number(45.67)))),
        }));

        assert_eq!(print_expr(&expr), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn prints_empty_blocks_and_literals() {
        let program = vec![
            Stmt::Block(vec![]),
            Stmt::Print(Expr::Literal(Literal::Nil)),
            Stmt::Expression(Expr::Literal(Literal::Boolean(false))),
        ];

        assert_eq!(print_program(&program), "(block)\n(print nil)\n(; false)");
    }
}
