use std::rc::Rc;

use super::signature::{self, FunctionSignature};
use super::{Boundary, ParseErrorKind, ParseResult, Parser};
use crate::ast::{
    DeclaredType, Expression, FunctionDeclaration, Parameter, Statement,
    StatementKind, SwitchCase, UpdateOperator,
};
use crate::token::{TokenKind, TokenStream};

impl<'a, T: TokenStream<'a>> Parser<'a, T> {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Var => {
                let statement = self.parse_declaration()?;
                self.expect_terminator()?;
                Ok(statement)
            }
            TokenKind::Exibir => self.parse_print(),
            TokenKind::Ler => self.parse_input(),
            TokenKind::Se => self.parse_if(),
            TokenKind::Enquanto => self.parse_while(),
            TokenKind::Faca => self.parse_do_while(),
            TokenKind::Para => self.parse_for(),
            TokenKind::Parar => self.parse_break(),
            TokenKind::Continuar => self.parse_continue(),
            TokenKind::Retornar => self.parse_return(),
            TokenKind::Funcao => self.parse_function_declaration(),
            TokenKind::Escolha => self.parse_switch(),
            TokenKind::Less => {
                let element = self.parse_web_element()?;
                let span = element.span;
                self.eat(&TokenKind::Dot);
                Ok(Statement::new(StatementKind::Web(element), span))
            }
            TokenKind::Identifier => {
                if matches!(self.peek(), TokenKind::LParen) {
                    let call = self.parse_expression()?;
                    self.expect_terminator()?;
                    let span = call.span;
                    return Ok(Statement::new(StatementKind::Expr(call), span));
                }
                let statement = self.parse_assignment()?;
                self.expect_terminator()?;
                Ok(statement)
            }
            _ => Err(self.error("um comando")),
        }
    }

    /// `VAR nome [= expr] : TIPO` without the terminator, so `PARA` headers
    /// can reuse it.
    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Var, "VAR")?;
        let (name, name_span) = self.expect_declared_name()?;
        let initializer = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Colon, "':' seguido do tipo")?;
        let declared_type = self.parse_declared_type()?;

        if declared_type == DeclaredType::Function {
            self.record(ParseErrorKind::FunctionTypedVariable { name: name.clone() }, name_span);
        } else if let Some(initializer) = &initializer {
            if let Err(kind) =
                signature::check_initializer(&self.functions, &name, declared_type, initializer)
            {
                self.record(kind, initializer.span);
            }
        }

        Ok(Statement::new(
            StatementKind::VariableDeclaration {
                name,
                declared_type,
                initializer,
            },
            keyword.span,
        ))
    }

    pub(super) fn parse_declared_type(&mut self) -> ParseResult<DeclaredType> {
        let declared = match self.current.kind {
            TokenKind::Inteiro => DeclaredType::Integer,
            TokenKind::RealType => DeclaredType::Real,
            TokenKind::Natural => DeclaredType::Natural,
            TokenKind::Texto => DeclaredType::Text,
            TokenKind::Logico => DeclaredType::Boolean,
            TokenKind::Lista => DeclaredType::List,
            TokenKind::Funcao => DeclaredType::Function,
            _ => return Err(self.error("um tipo")),
        };
        self.advance();
        Ok(declared)
    }

    /// Assignment or update on a named variable, without the terminator.
    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let (target, span) = self.expect_identifier("um comando")?;
        let kind = match self.current.kind {
            TokenKind::Assign => {
                self.advance();
                let value = self.parse_expression()?;
                StatementKind::Assignment { target, value }
            }
            TokenKind::PlusPlus => {
                self.advance();
                StatementKind::Update {
                    target,
                    op: UpdateOperator::Increment,
                }
            }
            TokenKind::MinusMinus => {
                self.advance();
                StatementKind::Update {
                    target,
                    op: UpdateOperator::Decrement,
                }
            }
            TokenKind::PlusAssign => {
                self.advance();
                let value = self.parse_expression()?;
                StatementKind::Update {
                    target,
                    op: UpdateOperator::AddAssign(value),
                }
            }
            TokenKind::MinusAssign => {
                self.advance();
                let value = self.parse_expression()?;
                StatementKind::Update {
                    target,
                    op: UpdateOperator::SubAssign(value),
                }
            }
            _ => return Err(self.error("'=', '+=', '-=', '++' ou '--'")),
        };
        Ok(Statement::new(kind, span))
    }

    fn parse_print(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Exibir, "EXIBIR")?;
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.parse_arguments()?;
        self.expect_terminator()?;
        Ok(Statement::new(StatementKind::Print(args), keyword.span))
    }

    fn parse_input(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Ler, "LER")?;
        self.expect(TokenKind::LParen, "'('")?;
        let prompt = if let TokenKind::Text(prompt) = &self.current.kind {
            let prompt = prompt.clone();
            self.advance();
            self.expect(TokenKind::Comma, "','")?;
            Some(prompt)
        } else {
            None
        };
        let (target, _) = self.expect_identifier("o nome da variável")?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect_terminator()?;
        Ok(Statement::new(
            StatementKind::Input { prompt, target },
            keyword.span,
        ))
    }

    fn parse_condition(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Se, "SE")?;
        let condition = self.parse_condition()?;
        let then_body = self.parse_block()?;
        let else_body = if self.eat(&TokenKind::Senao) {
            if self.check(&TokenKind::Se) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_body,
                else_body,
            },
            keyword.span,
        ))
    }

    fn parse_loop_body(&mut self) -> ParseResult<Vec<Statement>> {
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        body
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Enquanto, "ENQUANTO")?;
        let condition = self.parse_condition()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::new(
            StatementKind::While { condition, body },
            keyword.span,
        ))
    }

    fn parse_do_while(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Faca, "FACA")?;
        let body = self.parse_loop_body()?;
        self.expect(TokenKind::Enquanto, "ENQUANTO")?;
        let condition = self.parse_condition()?;
        self.expect_terminator()?;
        Ok(Statement::new(
            StatementKind::DoWhile { body, condition },
            keyword.span,
        ))
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Para, "PARA")?;
        self.expect(TokenKind::LParen, "'('")?;
        let init = match self.current.kind {
            TokenKind::Semicolon => None,
            TokenKind::Var => Some(Box::new(self.parse_declaration()?)),
            _ => Some(Box::new(self.parse_assignment()?)),
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_assignment()?))
        };
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_loop_body()?;
        Ok(Statement::new(
            StatementKind::For {
                init,
                condition,
                update,
                body,
            },
            keyword.span,
        ))
    }

    fn parse_break(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Parar, "PARAR")?;
        if self.loop_depth == 0 && self.switch_depth == 0 {
            self.record(
                ParseErrorKind::MisplacedControl {
                    keyword: "PARAR",
                    context: "um laço ou ESCOLHA",
                },
                keyword.span,
            );
        }
        self.expect_terminator()?;
        Ok(Statement::new(StatementKind::Break, keyword.span))
    }

    fn parse_continue(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Continuar, "CONTINUAR")?;
        if self.loop_depth == 0 {
            self.record(
                ParseErrorKind::MisplacedControl {
                    keyword: "CONTINUAR",
                    context: "um laço",
                },
                keyword.span,
            );
        }
        self.expect_terminator()?;
        Ok(Statement::new(StatementKind::Continue, keyword.span))
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Retornar, "RETORNAR")?;
        if self.function_depth == 0 {
            self.record(
                ParseErrorKind::MisplacedControl {
                    keyword: "RETORNAR",
                    context: "uma função",
                },
                keyword.span,
            );
        }
        let value = if self.check(&TokenKind::Dot) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_terminator()?;
        Ok(Statement::new(StatementKind::Return(value), keyword.span))
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Funcao, "FUNCAO")?;
        let (name, name_span) = self.expect_declared_name()?;
        if self.block_depth > 0 {
            self.record(ParseErrorKind::NestedFunction { name: name.clone() }, name_span);
        }

        self.expect(TokenKind::LParen, "'('")?;
        let mut params: Vec<Parameter> = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, param_span) = self.expect_declared_name()?;
                self.expect(TokenKind::Colon, "':' seguido do tipo")?;
                let declared_type = self.parse_declared_type()?;
                if declared_type == DeclaredType::Function {
                    self.record(
                        ParseErrorKind::FunctionTypedVariable {
                            name: param.clone(),
                        },
                        param_span,
                    );
                }
                params.push(Parameter {
                    name: param,
                    declared_type,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        let return_type = if self.eat(&TokenKind::Colon) {
            if self.eat(&TokenKind::Vazio) {
                None
            } else {
                Some(self.parse_declared_type()?)
            }
        } else {
            None
        };

        // Registered before the body so recursive calls resolve.
        let registered = FunctionSignature {
            name: name.clone(),
            params: params.clone(),
            return_type,
        };
        if !self.functions.insert(registered) {
            self.record(
                ParseErrorKind::DuplicateFunction { name: name.clone() },
                name_span,
            );
        }

        let saved = (self.loop_depth, self.switch_depth);
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        (self.loop_depth, self.switch_depth) = saved;
        let body = body?;

        let declaration = FunctionDeclaration {
            name,
            params,
            return_type,
            body,
            span: keyword.span,
        };
        Ok(Statement::new(
            StatementKind::FunctionDeclaration(Rc::new(declaration)),
            keyword.span,
        ))
    }

    fn parse_switch(&mut self) -> ParseResult<Statement> {
        let keyword = self.expect(TokenKind::Escolha, "ESCOLHA")?;
        let subject = self.parse_condition()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        self.block_depth += 1;
        self.switch_depth += 1;
        let arms = self.parse_switch_arms();
        self.switch_depth -= 1;
        self.block_depth -= 1;
        let (cases, default) = arms?;
        self.expect(TokenKind::RBrace, "'}'")?;

        if cases.is_empty() {
            self.record(ParseErrorKind::EmptySwitch, keyword.span);
        }
        Ok(Statement::new(
            StatementKind::Switch {
                subject,
                cases,
                default,
            },
            keyword.span,
        ))
    }

    #[allow(clippy::type_complexity)]
    fn parse_switch_arms(&mut self) -> ParseResult<(Vec<SwitchCase>, Option<Vec<Statement>>)> {
        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.current.kind {
                TokenKind::Caso if default.is_none() => {
                    self.advance();
                    let condition = self.parse_expression()?;
                    self.expect(TokenKind::Colon, "':'")?;
                    let body = self.parse_statement_list(Boundary::SwitchArm);
                    cases.push(SwitchCase { condition, body });
                }
                TokenKind::Padrao if default.is_none() => {
                    self.advance();
                    self.expect(TokenKind::Colon, "':'")?;
                    default = Some(self.parse_statement_list(Boundary::SwitchArm));
                }
                TokenKind::RBrace => return Ok((cases, default)),
                _ if default.is_some() => return Err(self.error("'}' depois de PADRAO")),
                _ => return Err(self.error("CASO, PADRAO ou '}'")),
            }
        }
    }

    /// Comma-separated expressions up to and including the closing `)`.
    pub(super) fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }
}

