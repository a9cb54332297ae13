use std::{error::Error, fmt::Display, io::Write, rc::Rc};

use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, Location},
    environment::Environment,
    expr::{AssignExpr, BinaryExpr, Expr, Literal, LogicalExpr, UnaryExpr},
    stmt::{IfStmt, Stmt, VarDeclaration, WhileStmt},
    token::{Keyword, Lexeme, Token},
    value::Value,
};

#[derive(derive_new::new)]
pub struct Interpreter {
    #[new(default)]
    environment: Environment,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.eval(&mut self.environment)
    }

    /// Runs a whole program. A top-level expression statement also prints its value.
    /// Stops at the first error; output written before it stays written.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), ExecError> {
        debug!(statements = statements.len(), "interpreting");
        for stmt in statements {
            match stmt {
                Stmt::Expression(expr) => {
                    let value = self.evaluate_expr(expr)?;
                    writeln!(self.output, "{value}")?;
                }
                _ => self.execute(stmt)?,
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), ExecError> {
        match stmt {
            Stmt::Print(expr) => {
                let value = self.evaluate_expr(expr)?;
                writeln!(self.output, "{value}")?;
            }
            Stmt::Expression(expr) => {
                self.evaluate_expr(expr)?;
            }
            Stmt::VarDeclaration(VarDeclaration { name, initializer }) => {
                let value = match initializer {
                    Some(initializer) => self.evaluate_expr(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(name.content.clone(), value);
            }
            Stmt::Block(statements) => self.execute_block(statements)?,
            Stmt::If(if_stmt) => {
                let IfStmt {
                    condition,
                    then_branch,
                    else_branch,
                } = if_stmt.as_ref();
                if self.evaluate_expr(condition)?.as_bool() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
            }
            Stmt::While(while_stmt) => {
                let WhileStmt { condition, body } = while_stmt.as_ref();
                while self.evaluate_expr(condition)?.as_bool() {
                    self.execute(body)?;
                }
            }
        }
        Ok(())
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), ExecError> {
        self.environment.push_scope();
        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));
        self.environment.pop_scope();
        result
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("failed to write program output: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub location: Location,
    pub line: usize,
}

impl RuntimeError {
    pub(crate) fn at(lexeme: &Lexeme, kind: RuntimeErrorKind) -> Self {
        Self {
            kind,
            location: Location::of(lexeme),
            line: lexeme.line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,

    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,

    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Diagnostic::from(self).fmt(f)
    }
}

impl Error for RuntimeError {}

pub trait Evaluate {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError>;
}

pub trait StaticEvaluate: Evaluate {
    fn static_eval(&self) -> Value;
}

impl<T> Evaluate for T
where
    T: StaticEvaluate,
{
    fn eval(&self, _env: &mut Environment) -> Result<Value, RuntimeError> {
        Ok(self.static_eval())
    }
}

impl StaticEvaluate for Literal {
    fn static_eval(&self) -> Value {
        self.into()
    }
}

impl Evaluate for Expr {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError> {
        match self {
            Expr::Assign(inner) => inner.as_ref().eval(env),
            Expr::Unary(inner) => inner.as_ref().eval(env),
            Expr::Grouping(inner) => inner.as_ref().eval(env),
            Expr::Literal(inner) => inner.eval(env),
            Expr::Logical(inner) => inner.as_ref().eval(env),
            Expr::Binary(inner) => inner.as_ref().eval(env),
            Expr::Variable(name) => env.get(&name.content).cloned().ok_or_else(|| {
                RuntimeError::at(
                    name,
                    RuntimeErrorKind::UndefinedVariable(name.content.to_string()),
                )
            }),
        }
    }
}

impl Evaluate for AssignExpr {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError> {
        let value = self.value.eval(env)?;
        env.assign(&self.name.content, value.clone()).ok_or_else(|| {
            RuntimeError::at(
                &self.name,
                RuntimeErrorKind::UndefinedVariable(self.name.content.to_string()),
            )
        })?;
        Ok(value)
    }
}

impl Evaluate for UnaryExpr {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError> {
        let inner = self.right.eval(env)?;

        match self.operator.token {
            Token::Minus => match inner {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::at(
                    &self.operator,
                    RuntimeErrorKind::OperandMustBeNumber,
                )),
            },
            Token::Bang => Ok((!inner.as_bool()).into()),
            _ => unreachable!("operator {:?} used in UnaryExpr: {:?}", self.operator, self),
        }
    }
}

impl Evaluate for LogicalExpr {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError> {
        let left = self.left.eval(env)?;

        // The result is whichever operand decided it, not a coerced boolean.
        let left_decides = match self.operator.token {
            Token::Keyword(Keyword::Or) => left.as_bool(),
            Token::Keyword(Keyword::And) => !left.as_bool(),
            _ => unreachable!(
                "operator {:?} used in LogicalExpr: {:?}",
                self.operator, self
            ),
        };

        if left_decides {
            Ok(left)
        } else {
            self.right.eval(env)
        }
    }
}

impl Evaluate for BinaryExpr {
    fn eval(&self, env: &mut Environment) -> Result<Value, RuntimeError> {
        // Execution is left-to-right.
        let left = self.left.eval(env)?;
        let right = self.right.eval(env)?;

        match self.operator.token {
            Token::Plus => {
                // We might be adding numbers or strings, handle both cases.
                match (&left, &right) {
                    (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                    (Value::String(l), Value::String(r)) => {
                        let output = l.to_string() + r.as_ref();
                        Ok(Value::String(Rc::from(output)))
                    }
                    _ => Err(RuntimeError::at(
                        &self.operator,
                        RuntimeErrorKind::OperandsMustBeNumbersOrStrings,
                    )),
                }
            }
            Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Greater
            | Token::GreaterEqual
            | Token::Less
            | Token::LessEqual => {
                // We are doing math or algebraic comparisons on numbers.
                let (Value::Number(l), Value::Number(r)) = (&left, &right) else {
                    debug!(
                        left = left.type_name(),
                        right = right.type_name(),
                        "non-numeric operands"
                    );
                    return Err(RuntimeError::at(
                        &self.operator,
                        RuntimeErrorKind::OperandsMustBeNumbers,
                    ));
                };
                match self.operator.token {
                    Token::Minus => Ok(Value::Number(l - r)),
                    Token::Star => Ok(Value::Number(l * r)),
                    Token::Slash => Ok(Value::Number(l / r)),
                    Token::Greater => Ok(Value::Boolean(l > r)),
                    Token::Less => Ok(Value::Boolean(l < r)),
                    Token::GreaterEqual => Ok(Value::Boolean(l >= r)),
                    Token::LessEqual => Ok(Value::Boolean(l <= r)),
                    _ => unreachable!(),
                }
            }
            Token::EqualEqual => Ok(Value::Boolean(left == right)),
            Token::BangEqual => Ok(Value::Boolean(left != right)),
            _ => unreachable!(
                "operator {:?} used in BinaryExpr: {:?}",
                self.operator, self
            ),
        }
    }
}
