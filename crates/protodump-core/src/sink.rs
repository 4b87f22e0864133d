//! Line sinks that receive the rendered report.

use std::io::{self, Write};

/// Destination for report lines.
///
/// A "line" may contain embedded newlines (multi-line comment blocks are
/// written in one call); implementations terminate each call with a single
/// newline of their own.
pub trait LineSink {
    /// Writes one report line
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// Sink over any [`io::Write`], e.g. stderr or a file
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    /// Wraps a writer
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriteSink<io::Stderr> {
    /// Sink writing to the process diagnostics stream
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> LineSink for WriteSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, one entry per `write_line` call
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins the captured lines the way a [`WriteSink`] would emit them
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sink_terminates_lines() {
        let mut sink = WriteSink::new(Vec::new());
        sink.write_line("one").unwrap();
        sink.write_line("two\nthree").unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\nthree\n");
    }

    #[test]
    fn test_memory_sink_matches_write_sink() {
        let mut memory = MemorySink::new();
        let mut writer = WriteSink::new(Vec::new());
        for line in ["a", "  b", "c\n  d"] {
            memory.write_line(line).unwrap();
            writer.write_line(line).unwrap();
        }
        assert_eq!(memory.lines().len(), 3);
        assert_eq!(memory.contents().as_bytes(), writer.into_inner().as_slice());
    }
}
