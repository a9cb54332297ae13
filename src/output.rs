use std::{cell::RefCell, fmt::Display, io::Write, rc::Rc};

/// An in-memory sink for program output or diagnostics. Clones share the
/// same buffer, so one clone can be handed to the interpreter while another
/// is kept around to read what was written.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutput {
    into: Rc<RefCell<Vec<u8>>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.into.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for CaptureOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.into.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Display for CaptureOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.contents())
    }
}
