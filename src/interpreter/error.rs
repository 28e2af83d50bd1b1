use thiserror::Error;

use crate::ast::DeclaredType;
use crate::token::Span;

/// Fatal error raised while executing a program. Execution stops at the first
/// one; output produced before it is kept.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} (linha {}, coluna {})", .span.line, .span.column)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("variável '{name}' não foi declarada")]
    UndefinedVariable { name: String },
    #[error("variável '{name}' não está acessível neste escopo")]
    OutOfScope { name: String },
    #[error("'{name}' já foi declarado neste escopo")]
    Redeclaration { name: String },
    #[error("função '{name}' não foi declarada")]
    UndefinedFunction { name: String },
    #[error("'{name}' não é uma função")]
    NotAFunction { name: String },
    #[error("'{name}' é do tipo {expected} e não pode receber {found}")]
    TypeMismatch {
        name: String,
        expected: DeclaredType,
        found: String,
    },
    #[error("'{name}' é do tipo {declared}; apenas variáveis numéricas podem ser incrementadas")]
    NotUpdatable { name: String, declared: DeclaredType },
    #[error("operação '{operation}' não é suportada entre {left} e {right}")]
    UnsupportedOperation {
        operation: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("operação '{operation}' espera {expected}, recebeu {found}")]
    InvalidOperand {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("a condição de {construct} deve ser um valor lógico, recebeu {found}")]
    NonBooleanCondition {
        construct: &'static str,
        found: &'static str,
    },
    #[error("divisão por zero")]
    DivisionByZero,
    #[error("índice {index} fora dos limites (tamanho {len})")]
    IndexOutOfBounds { index: f64, len: usize },
    #[error("índice deve ser um número inteiro não negativo, recebeu {found}")]
    InvalidIndex { found: String },
    #[error("não é possível indexar {found}")]
    NotIndexable { found: &'static str },
    #[error("função '{name}' espera {expected} argumento(s), recebeu {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("parâmetro '{param}' de '{name}' é do tipo {expected} e não pode receber {found}")]
    ArgumentTypeMismatch {
        name: String,
        param: String,
        expected: DeclaredType,
        found: String,
    },
    #[error("função '{name}' deve retornar {expected}, retornou {found}")]
    ReturnTypeMismatch {
        name: String,
        expected: DeclaredType,
        found: String,
    },
    #[error("função '{name}' terminou sem retornar um valor do tipo {expected}")]
    MissingReturnValue { name: String, expected: DeclaredType },
    #[error("função '{name}' não declara tipo de retorno mas retornou um valor")]
    UnexpectedReturnValue { name: String },
    #[error("função '{name}' não retorna valor e não pode ser usada em uma expressão")]
    VoidValue { name: String },
    #[error("{operation}: {detail}")]
    InvalidCalculation {
        operation: &'static str,
        detail: &'static str,
    },
    #[error("laço excedeu o limite de {limit} iterações")]
    LoopLimitExceeded { limit: usize },
    #[error("limite de {limit} chamadas aninhadas excedido")]
    CallDepthExceeded { limit: usize },
    #[error("entrada '{input}' não é um valor válido do tipo {expected}")]
    InvalidInput {
        input: String,
        expected: DeclaredType,
    },
    #[error("não foi possível ler a entrada: {message}")]
    InputUnavailable { message: String },
    #[error("{keyword} usado fora de contexto")]
    MisplacedControl { keyword: &'static str },
}

impl RuntimeErrorKind {
    /// Name-resolution failures, reported as scope errors.
    pub fn is_scope_error(&self) -> bool {
        matches!(
            self,
            RuntimeErrorKind::UndefinedVariable { .. }
                | RuntimeErrorKind::OutOfScope { .. }
                | RuntimeErrorKind::Redeclaration { .. }
                | RuntimeErrorKind::UndefinedFunction { .. }
        )
    }
}
