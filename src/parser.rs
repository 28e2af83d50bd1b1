pub mod error;
mod expression;
pub mod signature;
mod statement;
mod web;

use tracing::debug;

use crate::ast::Statement;
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind, TokenStream};

pub use error::{ParseError, ParseErrorKind};
pub use signature::{FunctionSignature, FunctionTable};

type ParseResult<T> = Result<T, ParseError>;

/// Everything the front end produces for one source text. Parsing never
/// aborts: `statements` holds whatever could be recovered and `errors` every
/// lexical, syntax or static-check problem in source order.
#[derive(Debug)]
pub struct ParseOutput {
    pub statements: Vec<Statement>,
    pub errors: Vec<ParseError>,
    pub functions: FunctionTable,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn parse_source(source: &str) -> ParseOutput {
    parse(Lexer::new(source))
}

pub fn parse<'a, T: TokenStream<'a>>(tokens: T) -> ParseOutput {
    Parser::new(tokens).parse_program()
}

/// Where a statement list ends: tokens that close the enclosing construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Program,
    Block,
    SwitchArm,
}

impl Boundary {
    fn closes(self, kind: &TokenKind) -> bool {
        match self {
            Boundary::Program => matches!(kind, TokenKind::EOF),
            Boundary::Block => matches!(kind, TokenKind::RBrace | TokenKind::EOF),
            Boundary::SwitchArm => matches!(
                kind,
                TokenKind::Caso | TokenKind::Padrao | TokenKind::RBrace | TokenKind::EOF
            ),
        }
    }
}

pub struct Parser<'a, T: TokenStream<'a>> {
    tokens: T,
    current: Token<'a>,
    consumed: usize,
    errors: Vec<ParseError>,
    functions: FunctionTable,
    block_depth: usize,
    loop_depth: usize,
    switch_depth: usize,
    function_depth: usize,
}

impl<'a, T: TokenStream<'a>> Parser<'a, T> {
    pub fn new(mut tokens: T) -> Self {
        let current = tokens.next_token();
        Self {
            tokens,
            current,
            consumed: 0,
            errors: Vec::new(),
            functions: FunctionTable::default(),
            block_depth: 0,
            loop_depth: 0,
            switch_depth: 0,
            function_depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseOutput {
        let statements = self.parse_statement_list(Boundary::Program);

        let mut errors: Vec<ParseError> = self
            .tokens
            .diagnostics()
            .iter()
            .cloned()
            .map(ParseError::lexical)
            .collect();
        errors.append(&mut self.errors);
        errors.sort_by_key(|error| (error.span.line, error.span.column));

        debug!(
            statements = statements.len(),
            errors = errors.len(),
            functions = self.functions.len(),
            "parsed program"
        );
        ParseOutput {
            statements,
            errors,
            functions: self.functions,
        }
    }

    /// Parses statements until `boundary` closes the list. Each statement is
    /// an error boundary: a failure is recorded and parsing resumes at the
    /// next synchronization point.
    fn parse_statement_list(&mut self, boundary: Boundary) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !boundary.closes(&self.current.kind) {
            let start = self.consumed;
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    debug!(%error, "recovering from syntax error");
                    self.errors.push(error);
                    self.synchronize(start, boundary);
                }
            }
        }
        statements
    }

    /// Skips tokens until a `.` (consumed), a statement keyword, the list's
    /// closing token or end of input. Always makes progress, and skips over
    /// whole `{ ... }` groups opened after the error.
    fn synchronize(&mut self, start: usize, boundary: Boundary) {
        if self.consumed == start {
            self.advance();
        }
        let mut depth = 0usize;
        loop {
            let kind = &self.current.kind;
            if matches!(kind, TokenKind::EOF) {
                return;
            }
            if depth == 0 {
                if matches!(kind, TokenKind::Dot) {
                    self.advance();
                    return;
                }
                if kind.starts_statement() || boundary.closes(kind) {
                    return;
                }
            }
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.block_depth += 1;
        let body = self.parse_statement_list(Boundary::Block);
        self.block_depth -= 1;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(body)
    }

    fn advance(&mut self) -> Token<'a> {
        self.consumed += 1;
        let next = self.tokens.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn peek(&mut self) -> &TokenKind {
        &self.tokens.peek_token().kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token<'a>> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_terminator(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Dot, "'.' no fim do comando")?;
        Ok(())
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<(String, Span)> {
        if matches!(self.current.kind, TokenKind::Identifier) {
            let token = self.advance();
            Ok((token.lexeme.to_string(), token.span))
        } else {
            Err(self.error(expected))
        }
    }

    /// An identifier that introduces a new name: reserved words and near-miss
    /// spellings of keywords are rejected.
    fn expect_declared_name(&mut self) -> ParseResult<(String, Span)> {
        let (name, span) = self.expect_identifier("um nome")?;
        signature::check_name(&name).map_err(|kind| ParseError::new(kind, span))?;
        Ok((name, span))
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.to_string(),
            },
            self.current.span,
        )
    }

    fn record(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::ast::{
        BinaryOperator, DeclaredType, ExpressionKind, StatementKind, UpdateOperator,
    };

    fn parse_ok(source: &str) -> Vec<Statement> {
        let output = parse_source(source);
        assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
        output.statements
    }

    fn error_kinds(source: &str) -> Vec<ParseErrorKind> {
        parse_source(source)
            .errors
            .into_iter()
            .map(|error| error.kind)
            .collect()
    }

    #[test]
    fn parses_declaration_with_initializer() {
        let statements = parse_ok("VAR x = 1 + 2 * 3 : INTEIRO.");
        assert_eq!(statements.len(), 1);
        let StatementKind::VariableDeclaration {
            name,
            declared_type,
            initializer: Some(initializer),
        } = &statements[0].kind
        else {
            panic!("expected declaration, got {:?}", statements[0].kind);
        };
        assert_eq!(name, "x");
        assert_eq!(*declared_type, DeclaredType::Integer);
        let ExpressionKind::Binary { op, right, .. } = &initializer.kind else {
            panic!("expected binary initializer");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert!(matches!(
            right.kind,
            ExpressionKind::Binary {
                op: BinaryOperator::Mul,
                ..
            }
        ));
    }

    #[test]
    fn records_function_signatures() {
        let source = indoc! {"
            FUNCAO fatorial(n : INTEIRO) : INTEIRO {
                SE (n <= 1) { RETORNAR 1. }
                RETORNAR n * fatorial(n - 1).
            }
            FUNCAO saudar() { EXIBIR(\"ola\"). }
        "};
        let output = parse_source(source);
        assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
        assert_eq!(output.functions.len(), 2);

        let fatorial = output.functions.get("fatorial").unwrap();
        assert_eq!(fatorial.params.len(), 1);
        assert_eq!(fatorial.params[0].declared_type, DeclaredType::Integer);
        assert_eq!(fatorial.return_type, Some(DeclaredType::Integer));
        assert_eq!(output.functions.get("saudar").unwrap().return_type, None);
        assert!(output.functions.get("exibir").is_none());
    }

    #[test]
    fn parses_control_flow_program() {
        let source = indoc! {r#"
            VAR total = 0 : INTEIRO.
            PARA (VAR i = 0 : INTEIRO; i < 3; i++) {
                SE (i == 1) {
                    CONTINUAR.
                } SENAO SE (i == 2) {
                    total += i.
                } SENAO {
                    EXIBIR("zero").
                }
            }
            ENQUANTO (total > 0) {
                total--.
                PARAR.
            }
            FACA {
                EXIBIR(total).
            } ENQUANTO (FALSO).
        "#};
        let statements = parse_ok(source);
        assert_eq!(statements.len(), 4);
        let StatementKind::For {
            init: Some(init),
            update: Some(update),
            body,
            ..
        } = &statements[1].kind
        else {
            panic!("expected for loop");
        };
        assert!(matches!(
            init.kind,
            StatementKind::VariableDeclaration { .. }
        ));
        assert!(matches!(
            update.kind,
            StatementKind::Update {
                op: UpdateOperator::Increment,
                ..
            }
        ));
        let StatementKind::If {
            else_body: Some(else_body),
            ..
        } = &body[0].kind
        else {
            panic!("expected if with else");
        };
        assert!(matches!(else_body[0].kind, StatementKind::If { .. }));
        assert!(matches!(statements[3].kind, StatementKind::DoWhile { .. }));
    }

    #[test]
    fn parses_switch_with_default() {
        let source = indoc! {r#"
            VAR d = 2 : INTEIRO.
            ESCOLHA (d) {
                CASO 1:
                    EXIBIR("um").
                    PARAR.
                CASO 2:
                    EXIBIR("dois").
                PADRAO:
                    EXIBIR("outro").
            }
        "#};
        let statements = parse_ok(source);
        let StatementKind::Switch { cases, default, .. } = &statements[1].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].body.len(), 2);
        assert_eq!(default.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn recovers_and_reports_every_bad_statement() {
        let source = indoc! {"
            VAR = 5 : INTEIRO.
            EXIBIR(1).
            VAR y = : INTEIRO.
            EXIBIR(2).
        "};
        let output = parse_source(source);
        assert_eq!(output.errors.len(), 2);
        assert_eq!(output.errors[0].span.line, 1);
        assert_eq!(output.errors[1].span.line, 3);
        let prints = output
            .statements
            .iter()
            .filter(|statement| matches!(statement.kind, StatementKind::Print(_)))
            .count();
        assert_eq!(prints, 2);
    }

    #[test]
    fn single_error_yields_single_diagnostic() {
        let errors = error_kinds("EXIBIR(1 +).\nEXIBIR(2).");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn recovers_inside_blocks() {
        let source = indoc! {"
            SE (VERDADEIRO) {
                VAR 1 : INTEIRO.
                EXIBIR(1).
            }
            EXIBIR(2).
        "};
        let output = parse_source(source);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.statements.len(), 2);
        let StatementKind::If { then_body, .. } = &output.statements[0].kind else {
            panic!("expected if");
        };
        assert_eq!(then_body.len(), 1);
    }

    #[test]
    fn broken_header_skips_its_block() {
        let source = indoc! {"
            SE (1 > ) {
                EXIBIR(1).
            }
            EXIBIR(2).
        "};
        let output = parse_source(source);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.statements.len(), 1);
    }

    #[test]
    fn merges_lexical_errors_in_source_order() {
        let output = parse_source("EXIBIR(1).\nVAR x = 1 @ : INTEIRO.");
        assert!(output.errors[0].is_lexical());
        assert_eq!(output.errors[0].span.line, 2);
    }

    #[test]
    fn rejects_misplaced_control_statements() {
        let errors = error_kinds("PARAR.\nCONTINUAR.\nRETORNAR 1.");
        assert_eq!(
            errors,
            vec![
                ParseErrorKind::MisplacedControl {
                    keyword: "PARAR",
                    context: "um laço ou ESCOLHA",
                },
                ParseErrorKind::MisplacedControl {
                    keyword: "CONTINUAR",
                    context: "um laço",
                },
                ParseErrorKind::MisplacedControl {
                    keyword: "RETORNAR",
                    context: "uma função",
                },
            ]
        );
    }

    #[test]
    fn break_inside_switch_is_allowed() {
        parse_ok("ESCOLHA (1) { CASO 1: PARAR. }");
    }

    #[test]
    fn loop_context_does_not_leak_into_functions() {
        let source = indoc! {"
            ENQUANTO (VERDADEIRO) {
                PARAR.
            }
            FUNCAO f() {
                PARAR.
            }
        "};
        let errors = error_kinds(source);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ParseErrorKind::MisplacedControl { keyword: "PARAR", .. }
        ));
    }
}
