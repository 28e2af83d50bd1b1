use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::{
    AttributeValue, Expression, ExpressionKind, ObjectLiteral, WebAttribute, WebElement, WebNode,
};
use crate::token::{Span, TokenKind, TokenStream};

impl<'a, T: TokenStream<'a>> Parser<'a, T> {
    /// `<tag attr=valor ...> filhos </tag>` or the self-closing `<tag ... />`.
    pub(super) fn parse_web_element(&mut self) -> ParseResult<WebElement> {
        let open = self.expect(TokenKind::Less, "'<'")?;
        let (tag, _) = self.expect_identifier("o nome da tag")?;

        let mut attributes = Vec::new();
        while matches!(self.current.kind, TokenKind::Identifier) {
            let (name, _) = self.expect_identifier("o nome do atributo")?;
            self.expect(TokenKind::Assign, "'='")?;
            let value = self.parse_attribute_value()?;
            attributes.push(WebAttribute { name, value });
        }

        if self.eat(&TokenKind::Slash) {
            self.expect(TokenKind::Greater, "'>'")?;
            return Ok(WebElement {
                tag,
                attributes,
                children: Vec::new(),
                span: open.span,
            });
        }
        self.expect(TokenKind::Greater, "'>'")?;

        let mut children = Vec::new();
        loop {
            match self.current.kind.clone() {
                TokenKind::Less if matches!(self.peek(), TokenKind::Slash) => {
                    self.advance();
                    self.advance();
                    let (closing, closing_span) = self.expect_identifier("o nome da tag")?;
                    if closing != tag {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedTag {
                                expected: tag,
                                found: closing,
                            },
                            closing_span,
                        ));
                    }
                    self.expect(TokenKind::Greater, "'>'")?;
                    break;
                }
                TokenKind::Less => children.push(WebNode::Element(self.parse_web_element()?)),
                TokenKind::Text(text) => {
                    self.advance();
                    children.push(WebNode::Text(text));
                }
                TokenKind::LBrace => {
                    self.advance();
                    let expression = self.parse_expression()?;
                    self.expect(TokenKind::RBrace, "'}'")?;
                    children.push(WebNode::Interpolation(expression));
                }
                _ => return Err(self.error(&format!("conteúdo ou </{tag}>"))),
            }
        }

        Ok(WebElement {
            tag,
            attributes,
            children,
            span: open.span,
        })
    }

    fn parse_attribute_value(&mut self) -> ParseResult<AttributeValue> {
        let span = self.current.span;
        let literal = match self.current.kind.clone() {
            TokenKind::Text(text) => ExpressionKind::Text(text),
            TokenKind::Integer(value) => ExpressionKind::Number(value as f64),
            TokenKind::Real(value) => ExpressionKind::Number(value),
            TokenKind::LBrace => {
                self.advance();
                return self.parse_braced_attribute(span);
            }
            _ => return Err(self.error("um valor de atributo")),
        };
        self.advance();
        Ok(AttributeValue::Expression(Expression::new(literal, span)))
    }

    /// After `{`: either an object literal `{ chave: expr, ... }` or a single
    /// interpolated expression.
    fn parse_braced_attribute(&mut self, span: Span) -> ParseResult<AttributeValue> {
        let is_object = self.check(&TokenKind::RBrace)
            || (matches!(
                self.current.kind,
                TokenKind::Identifier | TokenKind::Text(_)
            ) && matches!(self.peek(), TokenKind::Colon));
        if !is_object {
            let expression = self.parse_expression()?;
            self.expect(TokenKind::RBrace, "'}'")?;
            return Ok(AttributeValue::Expression(expression));
        }

        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = match self.current.kind.clone() {
                TokenKind::Text(key) => {
                    self.advance();
                    key
                }
                _ => self.expect_identifier("o nome da propriedade")?.0,
            };
            self.expect(TokenKind::Colon, "':'")?;
            entries.push((key, self.parse_expression()?));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(AttributeValue::Object(ObjectLiteral { entries, span }))
    }
}
