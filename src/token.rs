use std::fmt;

use crate::lexer::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Integer(i64),
    Real(f64),
    Text(String),

    // Keywords
    Var,
    Exibir,
    Ler,
    Se,
    Senao,
    Enquanto,
    Faca,
    Para,
    Parar,
    Continuar,
    Retornar,
    Funcao,
    Escolha,
    Caso,
    Padrao,
    Verdadeiro,
    Falso,
    Raiz,
    Potencia,

    // Type names
    Inteiro,
    RealType,
    Natural,
    Texto,
    Logico,
    Lista,
    Vazio,

    // Operators
    Assign,       // =
    EqualEqual,   // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Bang,         // !
    AndAnd,       // &&
    OrOr,         // ||
    PlusPlus,     // ++
    MinusMinus,   // --
    PlusAssign,   // +=
    MinusAssign,  // -=

    // Delimiters
    Dot,       // .
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]

    EOF,
}

/// Reserved words and the token each one lexes to.
pub const KEYWORDS: [(&str, TokenKind); 26] = [
    ("VAR", TokenKind::Var),
    ("EXIBIR", TokenKind::Exibir),
    ("LER", TokenKind::Ler),
    ("SE", TokenKind::Se),
    ("SENAO", TokenKind::Senao),
    ("ENQUANTO", TokenKind::Enquanto),
    ("FACA", TokenKind::Faca),
    ("PARA", TokenKind::Para),
    ("PARAR", TokenKind::Parar),
    ("CONTINUAR", TokenKind::Continuar),
    ("RETORNAR", TokenKind::Retornar),
    ("FUNCAO", TokenKind::Funcao),
    ("ESCOLHA", TokenKind::Escolha),
    ("CASO", TokenKind::Caso),
    ("PADRAO", TokenKind::Padrao),
    ("VERDADEIRO", TokenKind::Verdadeiro),
    ("FALSO", TokenKind::Falso),
    ("RAIZ", TokenKind::Raiz),
    ("POTENCIA", TokenKind::Potencia),
    ("INTEIRO", TokenKind::Inteiro),
    ("REAL", TokenKind::RealType),
    ("NATURAL", TokenKind::Natural),
    ("TEXTO", TokenKind::Texto),
    ("LOGICO", TokenKind::Logico),
    ("LISTA", TokenKind::Lista),
    ("VAZIO", TokenKind::Vazio),
];

pub fn keyword(word: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, kind)| kind.clone())
}

impl TokenKind {
    /// Tokens the parser may resynchronize on after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Exibir
                | TokenKind::Ler
                | TokenKind::Se
                | TokenKind::Enquanto
                | TokenKind::Faca
                | TokenKind::Para
                | TokenKind::Parar
                | TokenKind::Continuar
                | TokenKind::Retornar
                | TokenKind::Funcao
                | TokenKind::Escolha
        )
    }

    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier => "identificador".to_string(),
            TokenKind::Integer(value) => format!("número {value}"),
            TokenKind::Real(value) => format!("número {value}"),
            TokenKind::Text(value) => format!("texto \"{value}\""),
            TokenKind::EOF => "fim do arquivo".to_string(),
            other => {
                if let Some((name, _)) = KEYWORDS.iter().find(|(_, kind)| kind == other) {
                    return (*name).to_string();
                }
                format!("'{}'", other.symbol())
            }
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Assign => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            _ => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, lexeme: &'a str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identificador '{}'", self.lexeme),
            _ => write!(f, "{}", self.kind.describe()),
        }
    }
}

/// Pull-based token source consumed by the parser.
///
/// Implementations never block on bad input: invalid characters are recorded
/// in [`TokenStream::diagnostics`] and skipped, and once the input is exhausted
/// every call yields an `EOF` token.
pub trait TokenStream<'a> {
    fn next_token(&mut self) -> Token<'a>;
    fn peek_token(&mut self) -> &Token<'a>;
    fn diagnostics(&self) -> &[LexError];
}
