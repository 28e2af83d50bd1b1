use std::fmt;

use crate::interpreter::RuntimeError;
use crate::parser::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
    Scope,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "Erro léxico",
            DiagnosticKind::Syntax => "Erro sintático",
            DiagnosticKind::Semantic => "Erro semântico",
            DiagnosticKind::Scope => "Erro de escopo",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A user-facing report for a parse or runtime error, located in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub detail: String,
    pub source_file: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn from_parse_error(error: &ParseError, source_file: &str) -> Self {
        let kind = match &error.kind {
            ParseErrorKind::Lexical(_) => DiagnosticKind::Lexical,
            ParseErrorKind::UnexpectedToken { .. }
            | ParseErrorKind::ReservedWord { .. }
            | ParseErrorKind::KeywordTypo { .. }
            | ParseErrorKind::NestedFunction { .. }
            | ParseErrorKind::EmptySwitch
            | ParseErrorKind::MismatchedTag { .. } => DiagnosticKind::Syntax,
            ParseErrorKind::UndeclaredFunction { .. } => DiagnosticKind::Scope,
            _ => DiagnosticKind::Semantic,
        };
        Self {
            kind,
            detail: error.kind.to_string(),
            source_file: source_file.to_string(),
            line: error.span.line,
            column: error.span.column,
        }
    }

    pub fn from_runtime_error(error: &RuntimeError, source_file: &str) -> Self {
        let kind = if error.kind.is_scope_error() {
            DiagnosticKind::Scope
        } else {
            DiagnosticKind::Semantic
        };
        Self {
            kind,
            detail: error.kind.to_string(),
            source_file: source_file.to_string(),
            line: error.span.line,
            column: error.span.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.source_file, self.line, self.column, self.kind, self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::RuntimeErrorKind;
    use crate::parser::parse_source;
    use crate::token::Span;

    #[test]
    fn classifies_parse_errors() {
        let parsed = parse_source("VAR x = \"a\" : INTEIRO.\nEXIBIR(.\nVAR y = @ : INTEIRO.");
        let kinds: Vec<_> = parsed
            .errors
            .iter()
            .map(|error| Diagnostic::from_parse_error(error, "prog.sa").kind)
            .collect();
        assert!(kinds.contains(&DiagnosticKind::Semantic));
        assert!(kinds.contains(&DiagnosticKind::Syntax));
        assert!(kinds.contains(&DiagnosticKind::Lexical));
    }

    #[test]
    fn formats_runtime_errors_with_location() {
        let error = RuntimeError::new(
            RuntimeErrorKind::UndefinedVariable {
                name: "z".to_string(),
            },
            Span {
                start: 0,
                end: 1,
                line: 3,
                column: 5,
            },
        );
        let diagnostic = Diagnostic::from_runtime_error(&error, "prog.sa");
        assert_eq!(diagnostic.kind, DiagnosticKind::Scope);
        assert_eq!(
            diagnostic.to_string(),
            "prog.sa:3:5: Erro de escopo: variável 'z' não foi declarada"
        );
    }
}
