//! End-to-end entry points: source text in, printed lines, diagnostics and
//! HTML out.

use std::panic;
use std::thread;

use anyhow::{Context, Result, bail};
use tracing::{debug, info_span};

use crate::diagnostic::Diagnostic;
use crate::interpreter::{InputSource, Interpreter, InterpreterConfig, OutputSink};
use crate::parser::{ParseOutput, parse_source};
use crate::tac::{self, TacProgram};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport<O = Vec<String>> {
    pub output: O,
    pub errors: Vec<Diagnostic>,
    pub html: String,
}

impl<O> ExecutionReport<O> {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Native stack reserved for each nested function call, on top of a fixed
/// base for the parser and the top-level statements.
const STACK_PER_CALL: usize = 128 * 1024;
const BASE_STACK: usize = 2 * 1024 * 1024;

/// Parses and runs `source`, collecting printed lines in memory.
pub fn execute_source<I: InputSource + Send>(
    source: &str,
    config: &InterpreterConfig,
    input: I,
) -> Result<ExecutionReport> {
    execute_with(source, config.clone(), Vec::new(), input)
}

/// Parses and runs `source` against the given sink. A program with any parse
/// error is not executed.
///
/// The program runs on a dedicated thread whose stack grows with
/// `max_call_depth`, so hitting the limit is reported as a runtime error
/// instead of overflowing the caller's stack.
pub fn execute_with<O, I>(
    source: &str,
    config: InterpreterConfig,
    output: O,
    input: I,
) -> Result<ExecutionReport<O>>
where
    O: OutputSink + Send,
    I: InputSource + Send,
{
    let stack_size = worker_stack_size(config.max_call_depth);
    thread::scope(|scope| {
        let worker = thread::Builder::new()
            .name("seteao-exec".to_string())
            .stack_size(stack_size)
            .spawn_scoped(scope, move || run(source, config, output, input))
            .context("Spawning the interpreter thread")?;
        match worker.join() {
            Ok(report) => Ok(report),
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

fn worker_stack_size(max_call_depth: usize) -> usize {
    BASE_STACK.saturating_add(max_call_depth.saturating_mul(STACK_PER_CALL))
}

fn run<O: OutputSink, I: InputSource>(
    source: &str,
    config: InterpreterConfig,
    output: O,
    input: I,
) -> ExecutionReport<O> {
    let parsed = parse(source);
    if parsed.has_errors() {
        let errors = parse_diagnostics(&parsed, &config.source_file);
        debug!(errors = errors.len(), "execution skipped");
        return ExecutionReport {
            output,
            errors,
            html: String::new(),
        };
    }

    let source_file = config.source_file.clone();
    let mut interpreter = Interpreter::with_config(config, output, input);
    let errors = match interpreter.execute(&parsed.statements) {
        Ok(()) => Vec::new(),
        Err(error) => vec![Diagnostic::from_runtime_error(&error, &source_file)],
    };
    let html = interpreter.html_output().to_string();
    ExecutionReport {
        output: interpreter.into_output(),
        errors,
        html,
    }
}

/// Parses `source` and reports its diagnostics without running it.
pub fn check_source(source: &str, source_file: &str) -> Vec<Diagnostic> {
    parse_diagnostics(&parse(source), source_file)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TacListing {
    pub generated: TacProgram,
    pub optimized: TacProgram,
}

/// Lowers a well-formed program to TAC and optimizes it.
pub fn compile_tac(source: &str, source_file: &str) -> Result<TacListing> {
    let parsed = parse(source);
    if parsed.has_errors() {
        let report = parse_diagnostics(&parsed, source_file)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        bail!("o programa contém erros e não pode ser traduzido para TAC:\n{report}");
    }
    let generated = tac::generate(&parsed.statements)?;
    let optimized = tac::optimize(&generated);
    Ok(TacListing {
        generated,
        optimized,
    })
}

fn parse(source: &str) -> ParseOutput {
    let _span = info_span!("parse", bytes = source.len()).entered();
    parse_source(source)
}

fn parse_diagnostics(parsed: &ParseOutput, source_file: &str) -> Vec<Diagnostic> {
    parsed
        .errors
        .iter()
        .map(|error| Diagnostic::from_parse_error(error, source_file))
        .collect()
}
