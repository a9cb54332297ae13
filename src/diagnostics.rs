use std::{fmt::Display, io::Write};

use crate::{
    interpreter::RuntimeError,
    parser::ParseError,
    scanner::ScanError,
    token::Lexeme,
};

/// Where on its line an error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Unspecified,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(lexeme: &Lexeme) -> Self {
        if lexeme.is_eof() {
            Location::AtEnd
        } else {
            Location::At(lexeme.content.to_string())
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Unspecified => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(content) => write!(f, " at '{content}'"),
        }
    }
}

/// A single human-readable error line, as written to the error sink.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Diagnostic {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

impl From<&ScanError> for Diagnostic {
    fn from(e: &ScanError) -> Self {
        Diagnostic::new(e.line, Location::Unspecified, e.kind.to_string())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        Diagnostic::new(e.line, e.location.clone(), e.kind.to_string())
    }
}

impl From<&RuntimeError> for Diagnostic {
    fn from(e: &RuntimeError) -> Self {
        Diagnostic::new(e.line, e.location.clone(), e.kind.to_string())
    }
}

/// What a single top-level run ended with. The binary maps this to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    StaticError,
    RuntimeError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        *self == Outcome::Success
    }
}

pub fn report<W, D>(sink: &mut W, diagnostics: impl IntoIterator<Item = D>) -> std::io::Result<()>
where
    W: Write + ?Sized,
    D: Into<Diagnostic>,
{
    for diagnostic in diagnostics {
        writeln!(sink, "{}", diagnostic.into())?;
    }
    Ok(())
}
