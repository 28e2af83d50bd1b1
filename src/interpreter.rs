use tracing::{debug, info_span};

use crate::ast::Statement;
use crate::token::Span;

pub mod error;
pub mod io;
mod runtime;
mod scope;
pub mod value;
mod web;

pub use error::{RuntimeError, RuntimeErrorKind};
pub use io::{InputSource, NoInput, OutputSink, ScriptedInput, StdinInput, StdoutSink};
pub use value::Value;

use runtime::ExecResult;
use scope::ScopeStack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Name reported in diagnostics.
    pub source_file: String,
    /// Iterations allowed per loop activation.
    pub loop_limit: usize,
    /// Nested user function calls allowed. `pipeline` sizes the worker
    /// thread's stack from it.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            source_file: "<entrada>".to_string(),
            loop_limit: 10_000,
            max_call_depth: 200,
        }
    }
}

/// Tree-walking interpreter. Owns the scope stack, the injected output sink
/// and input source, and the HTML produced by web statements.
pub struct Interpreter<O: OutputSink, I: InputSource> {
    config: InterpreterConfig,
    scopes: ScopeStack,
    output: O,
    input: I,
    html: String,
    call_depth: usize,
}

impl<O: OutputSink, I: InputSource> Interpreter<O, I> {
    pub fn new(output: O, input: I) -> Self {
        Self::with_config(InterpreterConfig::default(), output, input)
    }

    pub fn with_config(config: InterpreterConfig, output: O, input: I) -> Self {
        Self {
            config,
            scopes: ScopeStack::new(),
            output,
            input,
            html: String::new(),
            call_depth: 0,
        }
    }

    /// Runs a program from a fresh global scope.
    pub fn execute(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
        let _span = info_span!("execute", statements = statements.len()).entered();
        self.scopes = ScopeStack::new();
        self.html.clear();
        self.call_depth = 0;

        // Execution pipeline:
        // execute -> exec_statements -> exec_statement -> eval_expression
        // -> eval_call -> exec_block (function body in a new frame).
        let signal = self.exec_statements(statements);
        match signal {
            Ok(ExecResult::Normal) => Ok(()),
            Ok(other) => Err(RuntimeError::new(
                RuntimeErrorKind::MisplacedControl {
                    keyword: other.keyword(),
                },
                Span::default(),
            )),
            Err(error) => {
                debug!(%error, "execution aborted");
                Err(error)
            }
        }
    }

    pub fn html_output(&self) -> &str {
        &self.html
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}

#[cfg(test)]
mod tests;
