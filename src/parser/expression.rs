use super::{ParseError, ParseErrorKind, ParseResult, Parser, signature};
use crate::ast::{
    BinaryOperator, CalculatorOperator, Expression, ExpressionKind, LogicalOperator,
    UnaryOperator,
};
use crate::token::{Span, TokenKind, TokenStream};

impl<'a, T: TokenStream<'a>> Parser<'a, T> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            let span = self.advance().span;
            let right = self.parse_and()?;
            expr = Expression::new(
                ExpressionKind::Logical {
                    left: Box::new(expr),
                    op: LogicalOperator::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        while self.check(&TokenKind::AndAnd) {
            let span = self.advance().span;
            let right = self.parse_comparison()?;
            expr = Expression::new(
                ExpressionKind::Logical {
                    left: Box::new(expr),
                    op: LogicalOperator::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::LessEqual => BinaryOperator::LessEqual,
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => return Ok(expr),
            };
            expr = self.parse_binary_tail(expr, op, Self::parse_additive)?;
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => return Ok(expr),
            };
            expr = self.parse_binary_tail(expr, op, Self::parse_multiplicative)?;
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                _ => return Ok(expr),
            };
            expr = self.parse_binary_tail(expr, op, Self::parse_unary)?;
        }
    }

    /// Consumes the operator token and the right operand. The node carries the
    /// operator's span so runtime faults point at it.
    fn parse_binary_tail(
        &mut self,
        left: Expression,
        op: BinaryOperator,
        operand: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let span = self.advance().span;
        let right = operand(self)?;
        Ok(Expression::new(
            ExpressionKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Bang => UnaryOperator::Not,
            _ => return self.parse_postfix(),
        };
        let span = self.advance().span;
        let operand = self.parse_unary()?;
        Ok(Expression::new(
            ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        while self.check(&TokenKind::LBracket) {
            let span = self.advance().span;
            let index = self.parse_expression()?;
            self.expect(TokenKind::RBracket, "']'")?;
            expr = Expression::new(
                ExpressionKind::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let span = self.current.span;
        let kind = match self.current.kind.clone() {
            TokenKind::Integer(value) => ExpressionKind::Number(value as f64),
            TokenKind::Real(value) => ExpressionKind::Number(value),
            TokenKind::Text(value) => ExpressionKind::Text(value),
            TokenKind::Verdadeiro => ExpressionKind::Boolean(true),
            TokenKind::Falso => ExpressionKind::Boolean(false),
            TokenKind::Identifier => {
                let name = self.current.lexeme.to_string();
                self.advance();
                if self.check(&TokenKind::LParen) {
                    return self.parse_call(name, span);
                }
                return Ok(Expression::new(ExpressionKind::Identifier(name), span));
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                return Ok(Expression::new(ExpressionKind::List(items), span));
            }
            TokenKind::Raiz => return self.parse_calculator(CalculatorOperator::Root),
            TokenKind::Potencia => return self.parse_calculator(CalculatorOperator::Power),
            _ => return Err(self.error("uma expressão")),
        };
        self.advance();
        Ok(Expression::new(kind, span))
    }

    /// A call to a user function. The callee must already be declared and the
    /// arguments must agree with its signature where their types are known.
    fn parse_call(&mut self, callee: String, span: Span) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.parse_arguments()?;
        if let Err(kind) = signature::check_call(&self.functions, &callee, &args) {
            self.record(kind, span);
        }
        Ok(Expression::new(ExpressionKind::Call { callee, args }, span))
    }

    fn parse_calculator(&mut self, op: CalculatorOperator) -> ParseResult<Expression> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.parse_arguments()?;
        let accepted = match op {
            CalculatorOperator::Root => (1..=2).contains(&args.len()),
            CalculatorOperator::Power => args.len() == 2,
        };
        if !accepted {
            return Err(ParseError::new(
                ParseErrorKind::ArityMismatch {
                    name: op.keyword().to_string(),
                    expected: if op == CalculatorOperator::Root { 1 } else { 2 },
                    found: args.len(),
                },
                keyword.span,
            ));
        }
        Ok(Expression::new(
            ExpressionKind::Calculator { op, args },
            keyword.span,
        ))
    }
}
