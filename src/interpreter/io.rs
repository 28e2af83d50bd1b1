//! Output sinks and input sources injected into the interpreter.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait OutputSink {
    fn print(&mut self, line: &str);
}

impl OutputSink for Vec<String> {
    fn print(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl<F: FnMut(&str)> OutputSink for F {
    fn print(&mut self, line: &str) {
        self(line)
    }
}

/// Writes each printed line to standard output as soon as it is produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn print(&mut self, line: &str) {
        let mut stdout = io::stdout().lock();
        // A closed pipe ends the output; the program itself keeps running.
        let _ = writeln!(stdout, "{line}");
    }
}

/// Source of the lines consumed by `LER`.
pub trait InputSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

impl<F: FnMut(&str) -> io::Result<String>> InputSource for F {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self(prompt)
    }
}

/// Pre-recorded answers, consumed in order.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.lines
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "entrada esgotada"))
    }
}

/// Reads from standard input, showing the prompt on standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        if !prompt.is_empty() {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{prompt} ")?;
            stdout.flush()?;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "fim da entrada padrão",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// For programs run without an input channel: every read fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "nenhuma entrada disponível",
        ))
    }
}
