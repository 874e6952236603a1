use std::io::{self, Write};

/// Destination for rendered text.
pub trait Outputter {
    fn write_standard(&mut self, text: &str) -> io::Result<()>;
    fn write_error(&mut self, text: &str) -> io::Result<()>;
}

/// Writes to the process's stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdOutputter;

impl Outputter for StdOutputter {
    fn write_standard(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn write_error(&mut self, text: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(text.as_bytes())?;
        err.flush()
    }
}

/// Collects output in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryOutputter {
    standard: String,
    error: String,
}

impl MemoryOutputter {
    pub fn standard(&self) -> &str {
        &self.standard
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

impl Outputter for MemoryOutputter {
    fn write_standard(&mut self, text: &str) -> io::Result<()> {
        self.standard.push_str(text);
        Ok(())
    }

    fn write_error(&mut self, text: &str) -> io::Result<()> {
        self.error.push_str(text);
        Ok(())
    }
}
