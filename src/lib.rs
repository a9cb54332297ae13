//! Scanner, parser and tree-walking interpreter for a small dynamically-typed
//! scripting language in the Lox family.
//!
//! A run flows `source -> scanner::scan -> parser::parse -> Interpreter`,
//! with every stage reporting into [`diagnostics`]. [`Lox`] ties the stages
//! together for a file or an interactive prompt.

pub mod diagnostics;
pub mod environment;
pub mod expr;
pub mod interpreter;
pub mod lox;
pub mod output;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

pub use crate::{
    diagnostics::Outcome,
    interpreter::Interpreter,
    lox::Lox,
    output::CaptureOutput,
};
