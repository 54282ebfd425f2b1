//! Host I/O for `PRINT` and `INPUT`.
//!
//! Output and line input go through an [`IoHandler`] so embedders and tests
//! can capture output and script input instead of using the process streams.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// In-memory I/O: captured output plus a queue of input lines.
#[derive(Debug, Default, Clone)]
pub struct BufferIo {
    output: String,
    input: VecDeque<String>,
}

impl BufferIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue lines to be returned by successive reads.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: String::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where program output goes and input comes from.
#[derive(Debug, Clone, Default)]
pub enum IoHandler {
    /// Process stdout and stdin.
    #[default]
    Stdio,
    /// Captured in memory.
    Buffer(BufferIo),
}

impl IoHandler {
    pub fn buffer() -> Self {
        IoHandler::Buffer(BufferIo::new())
    }

    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IoHandler::Buffer(BufferIo::with_input(lines))
    }

    /// Write text without a newline.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        match self {
            IoHandler::Stdio => emit(&mut io::stdout().lock(), text, false),
            IoHandler::Buffer(buf) => {
                buf.output.push_str(text);
                Ok(())
            }
        }
    }

    /// Write text followed by a newline.
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        match self {
            IoHandler::Stdio => emit(&mut io::stdout().lock(), text, true),
            IoHandler::Buffer(buf) => {
                buf.output.push_str(text);
                buf.output.push('\n');
                Ok(())
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            IoHandler::Stdio => io::stdout().lock().flush(),
            IoHandler::Buffer(_) => Ok(()),
        }
    }

    /// Read one line without its line terminator. End of input reads as an
    /// empty string.
    pub fn read_line(&mut self) -> String {
        let mut line = match self {
            IoHandler::Stdio => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line).is_err() {
                    line.clear();
                }
                line
            }
            IoHandler::Buffer(buf) => buf.input.pop_front().unwrap_or_default(),
        };
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        line
    }

    /// Captured output so far. Always empty for stdio.
    pub fn output(&self) -> &str {
        match self {
            IoHandler::Stdio => "",
            IoHandler::Buffer(buf) => &buf.output,
        }
    }

    /// Take the captured output, leaving the buffer empty.
    pub fn take_output(&mut self) -> String {
        match self {
            IoHandler::Stdio => String::new(),
            IoHandler::Buffer(buf) => std::mem::take(&mut buf.output),
        }
    }
}

/// A closed stream (e.g. a pipe whose reader exited) surfaces as an error.
fn emit(out: &mut impl Write, text: &str, newline: bool) -> io::Result<()> {
    if newline {
        writeln!(out, "{text}")
    } else {
        write!(out, "{text}")
    }
}
