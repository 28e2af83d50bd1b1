use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenKind, TokenStream, keyword};

pub mod error;

use error::LexError;

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    peeked: Option<Token<'a>>,
    errors: Vec<LexError>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            peeked: None,
            errors: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    fn scan_token(&mut self) -> Token<'a> {
        loop {
            self.skip_trivia();

            let Some(&(start, ch)) = self.chars.peek() else {
                let index = self.input.len();
                return Token::new(TokenKind::EOF, "", self.span_at(index, index));
            };

            let line = self.line;
            let column = self.column;
            let kind = match ch {
                '"' => match self.read_string(line, column) {
                    Some(kind) => kind,
                    None => continue,
                },
                c if c.is_alphabetic() || c == '_' => {
                    let end = self.read_identifier();
                    let word = &self.input[start..end];
                    let kind = keyword(word).unwrap_or(TokenKind::Identifier);
                    return self.token(kind, start, line, column);
                }
                c if c.is_ascii_digit() => match self.read_number(start, line, column) {
                    Some(kind) => kind,
                    None => continue,
                },
                _ => match self.read_operator(ch) {
                    Some(kind) => kind,
                    None => {
                        self.errors.push(LexError::UnexpectedCharacter {
                            character: ch,
                            line,
                            column,
                        });
                        continue;
                    }
                },
            };
            return self.token(kind, start, line, column);
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token<'a> {
        let end = self.current_index();
        Token::new(
            kind,
            &self.input[start..end],
            Span {
                start,
                end,
                line,
                column,
            },
        )
    }

    fn span_at(&self, start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some(&(_, c)) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some(&(_, '/')) => match self.peek_second() {
                    Some('/') => {
                        while let Some(&(_, c)) = self.chars.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance_char();
                        }
                    }
                    Some('*') => {
                        let line = self.line;
                        let column = self.column;
                        self.advance_char();
                        self.advance_char();
                        let mut closed = false;
                        while let Some((_, c)) = self.advance_char() {
                            if c == '*' && self.eat_char('/') {
                                closed = true;
                                break;
                            }
                        }
                        if !closed {
                            self.errors
                                .push(LexError::UnterminatedComment { line, column });
                        }
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn read_operator(&mut self, ch: char) -> Option<TokenKind> {
        self.advance_char();
        let kind = match ch {
            '=' if self.eat_char('=') => TokenKind::EqualEqual,
            '=' => TokenKind::Assign,
            '!' if self.eat_char('=') => TokenKind::NotEqual,
            '!' => TokenKind::Bang,
            '<' if self.eat_char('=') => TokenKind::LessEqual,
            '<' => TokenKind::Less,
            '>' if self.eat_char('=') => TokenKind::GreaterEqual,
            '>' => TokenKind::Greater,
            '+' if self.eat_char('+') => TokenKind::PlusPlus,
            '+' if self.eat_char('=') => TokenKind::PlusAssign,
            '+' => TokenKind::Plus,
            '-' if self.eat_char('-') => TokenKind::MinusMinus,
            '-' if self.eat_char('=') => TokenKind::MinusAssign,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '&' if self.eat_char('&') => TokenKind::AndAnd,
            '|' if self.eat_char('|') => TokenKind::OrOr,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            _ => return None,
        };
        Some(kind)
    }

    fn read_identifier(&mut self) -> usize {
        self.advance_char();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
        self.current_index()
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Option<TokenKind> {
        self.consume_digits();

        // `5.` is an integer followed by the statement terminator.
        let is_real = matches!(self.chars.peek(), Some(&(_, '.')))
            && self.peek_second().is_some_and(|c| c.is_ascii_digit());
        if is_real {
            self.advance_char();
            self.consume_digits();
        }

        let literal = &self.input[start..self.current_index()];
        let parsed = if is_real {
            literal.parse::<f64>().ok().map(TokenKind::Real)
        } else {
            literal.parse::<i64>().ok().map(TokenKind::Integer)
        };
        if parsed.is_none() {
            self.errors.push(LexError::InvalidNumber {
                literal: literal.to_string(),
                line,
                column,
            });
        }
        parsed
    }

    fn consume_digits(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Option<TokenKind> {
        self.advance_char(); // opening quote
        let mut value = String::new();
        loop {
            match self.chars.peek() {
                Some(&(_, '"')) => {
                    self.advance_char();
                    return Some(TokenKind::Text(value));
                }
                Some(&(_, '\n')) | None => {
                    self.errors
                        .push(LexError::UnterminatedString { line, column });
                    return None;
                }
                Some(&(_, '\\')) => {
                    let escape_line = self.line;
                    let escape_column = self.column;
                    self.advance_char();
                    match self.advance_char() {
                        Some((_, 'n')) => value.push('\n'),
                        Some((_, 't')) => value.push('\t'),
                        Some((_, '"')) => value.push('"'),
                        Some((_, '\\')) => value.push('\\'),
                        Some((_, other)) => {
                            self.errors.push(LexError::InvalidEscape {
                                escape: other,
                                line: escape_line,
                                column: escape_column,
                            });
                            value.push(other);
                        }
                        None => {
                            self.errors
                                .push(LexError::UnterminatedString { line, column });
                            return None;
                        }
                    }
                }
                Some(&(_, c)) => {
                    value.push(c);
                    self.advance_char();
                }
            }
        }
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> TokenStream<'a> for Lexer<'a> {
    fn next_token(&mut self) -> Token<'a> {
        if let Some(token) = self.peeked.take() {
            return token;
        }
        self.scan_token()
    }

    fn peek_token(&mut self) -> &Token<'a> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan_token(),
        };
        self.peeked.insert(token)
    }

    fn diagnostics(&self) -> &[LexError] {
        &self.errors
    }
}

/// Scans the whole input, returning every token up to and including `EOF`
/// together with the lexical diagnostics collected along the way.
pub fn tokenize(input: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    (tokens, lexer.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, errors) = tokenize(input);
        assert!(errors.is_empty(), "unexpected lexical errors: {errors:?}");
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn tokenizes_declaration_and_print() {
        let input = indoc! {"
            VAR x = 5 : INTEIRO.
            EXIBIR(x).
        "};
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer(5),
                TokenKind::Colon,
                TokenKind::Inteiro,
                TokenKind::Dot,
                TokenKind::Exibir,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn distinguishes_real_literal_from_terminator() {
        assert_eq!(
            kinds("x = 2.5. y = 3."),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Real(2.5),
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer(3),
                TokenKind::Dot,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn lexes_compound_operators() {
        assert_eq!(
            kinds("i++ i-- a += b -= c <= d >= e == f != g && h || !k"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusPlus,
                TokenKind::Identifier,
                TokenKind::MinusMinus,
                TokenKind::Identifier,
                TokenKind::PlusAssign,
                TokenKind::Identifier,
                TokenKind::MinusAssign,
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::GreaterEqual,
                TokenKind::Identifier,
                TokenKind::EqualEqual,
                TokenKind::Identifier,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::AndAnd,
                TokenKind::Identifier,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Identifier,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn skips_comments_and_unescapes_strings() {
        let input = indoc! {r#"
            // comentário
            EXIBIR("linha\n\"citada\""). /* bloco
            de comentário */
        "#};
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Exibir,
                TokenKind::LParen,
                TokenKind::Text("linha\n\"citada\"".to_string()),
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let (tokens, _) = tokenize("VAR\n  idade");
        assert_eq!(tokens[1].lexeme, "idade");
        assert_eq!((tokens[1].span.line, tokens[1].span.column), (2, 3));
    }

    #[test]
    fn keeps_scanning_after_invalid_characters() {
        let (tokens, errors) = tokenize("x = 1 @ 2 # 3.");
        let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer(1),
                TokenKind::Integer(2),
                TokenKind::Integer(3),
                TokenKind::Dot,
                TokenKind::EOF,
            ]
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            LexError::UnexpectedCharacter {
                character: '@',
                line: 1,
                column: 7
            }
        );
    }

    #[test]
    fn reports_unterminated_string_and_comment() {
        let (_, errors) = tokenize("EXIBIR(\"aberto\n/* sem fim");
        assert_eq!(
            errors,
            vec![
                LexError::UnterminatedString { line: 1, column: 8 },
                LexError::UnterminatedComment { line: 2, column: 1 },
            ]
        );
    }

    #[test]
    fn reports_integer_overflow() {
        let (_, errors) = tokenize("x = 99999999999999999999999999.");
        assert!(matches!(errors[0], LexError::InvalidNumber { .. }));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("SE SENAO");
        assert_eq!(lexer.peek_token().kind, TokenKind::Se);
        assert_eq!(lexer.next_token().kind, TokenKind::Se);
        assert_eq!(lexer.next_token().kind, TokenKind::Senao);
        assert_eq!(lexer.next_token().kind, TokenKind::EOF);
        assert_eq!(lexer.next_token().kind, TokenKind::EOF);
    }
}
