use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{
    diagnostics::{self, Outcome},
    interpreter::{ExecError, Interpreter},
    parser::{parse, Parsed},
    scanner::scan,
    stmt::Stmt,
};

/// A session: one interpreter whose globals persist across runs, plus the
/// sinks for program output and diagnostics.
pub struct Lox {
    interpreter: Interpreter,
    errors: Box<dyn Write>,
}

impl Lox {
    pub fn new(output: Box<dyn Write>, errors: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::new(output),
            errors,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Scans and parses `source`, reporting every lexical and syntax error.
    /// Returns the program only when it is free of static errors.
    pub fn check(&mut self, source: &str) -> io::Result<Option<Vec<Stmt>>> {
        let scanned = scan(source);
        diagnostics::report(&mut *self.errors, &scanned.errors)?;

        let Parsed { statements, errors } = parse(scanned.lexemes);
        diagnostics::report(&mut *self.errors, &errors)?;

        if scanned.errors.is_empty() && errors.is_empty() {
            Ok(Some(statements))
        } else {
            Ok(None)
        }
    }

    /// Runs one unit of source: a whole file, or one line of the prompt.
    /// Only failures to write output or diagnostics are returned as errors.
    pub fn run(&mut self, source: &str) -> io::Result<Outcome> {
        let Some(statements) = self.check(source)? else {
            debug!("static errors found, not interpreting");
            return Ok(Outcome::StaticError);
        };

        match self.interpreter.interpret(&statements) {
            Ok(()) => Ok(Outcome::Success),
            Err(ExecError::Runtime(e)) => {
                debug!(error = %e, "runtime error");
                diagnostics::report(&mut *self.errors, [&e])?;
                Ok(Outcome::RuntimeError)
            }
            Err(ExecError::Output(e)) => Err(e),
        }
    }

    pub fn run_file(&mut self, path: &Path) -> io::Result<Outcome> {
        info!(path = %path.display(), "running file");
        let source = read_source(path)?;
        self.run(&source)
    }

    /// Reads lines from `input` until it is exhausted, running each one.
    /// Errors on one line don't affect the next; variables persist.
    pub fn run_prompt(&mut self, input: impl BufRead, prompt: &mut impl Write) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(prompt, "> ")?;
            prompt.flush()?;

            let Some(line) = lines.next().transpose()? else {
                break;
            };
            let outcome = self.run(&line)?;
            debug!(?outcome, "prompt line finished");
        }

        writeln!(prompt)?;
        Ok(())
    }
}

/// Source is treated byte-wise, so invalid UTF-8 is replaced rather than rejected.
pub fn read_source(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
