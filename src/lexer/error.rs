use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("caractere inválido '{character}' na linha {line}, coluna {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("número inválido '{literal}' na linha {line}, coluna {column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },
    #[error("texto não terminado iniciado na linha {line}, coluna {column}")]
    UnterminatedString { line: usize, column: usize },
    #[error("sequência de escape inválida '\\{escape}' na linha {line}, coluna {column}")]
    InvalidEscape {
        escape: char,
        line: usize,
        column: usize,
    },
    #[error("comentário não terminado iniciado na linha {line}, coluna {column}")]
    UnterminatedComment { line: usize, column: usize },
}

impl LexError {
    pub fn position(&self) -> (usize, usize) {
        match self {
            LexError::UnexpectedCharacter { line, column, .. }
            | LexError::InvalidNumber { line, column, .. }
            | LexError::UnterminatedString { line, column }
            | LexError::InvalidEscape { line, column, .. }
            | LexError::UnterminatedComment { line, column } => (*line, *column),
        }
    }
}
