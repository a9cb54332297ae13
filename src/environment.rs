use std::{collections::BTreeMap, rc::Rc};

use tracing::trace;

use crate::value::Value;

type Scope = BTreeMap<Rc<str>, Value>;

/// Lexical scopes as a stack of frames. Index 0 holds the globals and is
/// never popped; the last frame is the innermost scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
        trace!(depth = self.depth(), "entered scope");
    }

    pub(crate) fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "attempted to pop the global scope");
        self.scopes.pop();
        trace!(depth = self.depth(), "left scope");
    }

    /// Defines `name` in the innermost scope, replacing any earlier definition there.
    pub fn define(&mut self, name: Rc<str>, value: Value) {
        self.scopes
            .last_mut()
            .expect("the global scope is never popped")
            .insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Overwrites the binding in the innermost scope that has one.
    /// Returns `None` when no scope defines `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Option<()> {
        let slot = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))?;
        *slot = value;
        Some(())
    }
}
