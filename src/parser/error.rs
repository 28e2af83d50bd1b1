use thiserror::Error;

use crate::ast::DeclaredType;
use crate::lexer::error::LexError;
use crate::token::Span;

/// A recoverable front-end error: the parser records it and keeps going.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} (linha {}, coluna {})", .span.line, .span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn lexical(error: LexError) -> Self {
        let (line, column) = error.position();
        Self {
            kind: ParseErrorKind::Lexical(error),
            span: Span {
                start: 0,
                end: 0,
                line,
                column,
            },
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Lexical(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lexical(LexError),
    #[error("esperado {expected}, encontrado {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("'{name}' é uma palavra reservada e não pode ser usado como nome")]
    ReservedWord { name: String },
    #[error("'{name}' parece a palavra reservada '{keyword}' escrita incorretamente")]
    KeywordTypo { name: String, keyword: &'static str },
    #[error("variável '{name}' do tipo {declared} não pode ser inicializada com {found}")]
    InitializerMismatch {
        name: String,
        declared: DeclaredType,
        found: &'static str,
    },
    #[error("variável NATURAL '{name}' não pode receber um valor negativo")]
    NegativeNatural { name: String },
    #[error("o tipo FUNCAO não pode ser usado na declaração de '{name}'")]
    FunctionTypedVariable { name: String },
    #[error("função '{name}' não foi declarada")]
    UndeclaredFunction { name: String },
    #[error("função '{name}' já foi declarada")]
    DuplicateFunction { name: String },
    #[error("função '{name}' só pode ser declarada no nível principal do programa")]
    NestedFunction { name: String },
    #[error("função '{name}' espera {expected} argumento(s), recebeu {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("argumento {position} de '{name}' deveria ser {expected}, recebeu {found}")]
    ArgumentTypeMismatch {
        name: String,
        position: usize,
        expected: DeclaredType,
        found: &'static str,
    },
    #[error("{keyword} usado fora de {context}")]
    MisplacedControl {
        keyword: &'static str,
        context: &'static str,
    },
    #[error("ESCOLHA precisa de pelo menos um CASO")]
    EmptySwitch,
    #[error("tag de fechamento </{found}> não corresponde a <{expected}>")]
    MismatchedTag { expected: String, found: String },
}
