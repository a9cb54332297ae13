use std::{fmt::Display, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::expr::Literal;

pub const NIL_TYPE: &str = "nil";
pub const BOOLEAN_TYPE: &str = "bool";
pub const NUMBER_TYPE: &str = "number";
pub const STRING_TYPE: &str = "string";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
}

impl Value {
    /// Truthiness: `nil` and `false` are falsy, everything else is truthy.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Nil => false,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => NIL_TYPE,
            Value::Boolean(_) => BOOLEAN_TYPE,
            Value::Number(_) => NUMBER_TYPE,
            Value::String(_) => STRING_TYPE,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l0), Self::Boolean(r0)) => l0 == r0,
            (Self::Number(l0), Self::Number(r0)) => l0 == r0,
            (Self::String(l0), Self::String(r0)) => l0 == r0,
            (Self::Nil, Self::Nil) => true,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => b.fmt(f),
            // f64's Display is already the shortest round-trip form, without a trailing ".0".
            Value::Number(n) => n.fmt(f),
            Value::String(s) => write!(f, "{}", s.as_ref()),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => Self::Nil,
            Literal::Boolean(b) => Self::Boolean(*b),
            Literal::Number(n) => Self::Number(*n),
            Literal::String(s) => Self::String(s.clone()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Rc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_values_for_print() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(7.0).to_string(), "7");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-0.0).to_string(), "-0");
        assert_eq!(Value::from(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::from("raw text").to_string(), "raw text");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.as_bool());
        assert!(!Value::from(false).as_bool());
        assert!(Value::from(0.0).as_bool());
        assert!(Value::from("").as_bool());
        assert!(Value::from(true).as_bool());
    }

    #[test]
    fn equality_never_coerces_across_types() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::from(false));
        assert_ne!(Value::from(1.0), Value::from("1"));
        assert_ne!(Value::from(0.0), Value::from(false));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }
}
