//! HTML rendering for the web sublanguage. Portuguese tag, attribute and
//! style vocabulary is translated; unknown names pass through unchanged.

use std::fmt::Write as _;

use super::io::{InputSource, OutputSink};
use super::value::{Value, format_number};
use super::{Interpreter, RuntimeError};
use crate::ast::{AttributeValue, ObjectLiteral, WebElement, WebNode};

fn html_tag(tag: &str) -> &str {
    match tag {
        "pagina" | "caixa" => "div",
        "secao" => "section",
        "cabecalho" => "header",
        "rodape" => "footer",
        "titulo" => "h1",
        "subtitulo" => "h2",
        "paragrafo" => "p",
        "texto" => "span",
        "botao" => "button",
        "link" => "a",
        "imagem" => "img",
        "lista" => "ul",
        "item" => "li",
        "quebra" => "br",
        "negrito" => "strong",
        "italico" => "em",
        other => other,
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input" | "meta" | "link")
}

fn html_attribute(name: &str) -> &str {
    match name {
        "destino" => "href",
        "fonte" => "src",
        "descricao" => "alt",
        "classe" => "class",
        "propriedades" | "estilo" => "style",
        other => other,
    }
}

fn css_color(name: &str) -> &str {
    match name {
        "vermelho" => "red",
        "azul" => "blue",
        "verde" => "green",
        "amarelo" => "yellow",
        "preto" => "black",
        "branco" => "white",
        "cinza" => "gray",
        "laranja" => "orange",
        "roxo" => "purple",
        "rosa" => "pink",
        "marrom" => "brown",
        other => other,
    }
}

/// Keys accepted inside `propriedades={ ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StyleProperty {
    Color,
    Background,
    Width,
    Height,
    FontSize,
    TextAlign,
    Margin,
    Padding,
    Border,
    FontFamily,
    FontWeight,
    Other(String),
}

impl StyleProperty {
    pub(super) fn from_key(key: &str) -> Self {
        match key {
            "cor" => StyleProperty::Color,
            "fundo" => StyleProperty::Background,
            "largura" => StyleProperty::Width,
            "altura" => StyleProperty::Height,
            "tamanho" => StyleProperty::FontSize,
            "alinhamento" => StyleProperty::TextAlign,
            "margem" => StyleProperty::Margin,
            "espacamento" => StyleProperty::Padding,
            "borda" => StyleProperty::Border,
            "familia" => StyleProperty::FontFamily,
            "peso" => StyleProperty::FontWeight,
            other => StyleProperty::Other(other.to_string()),
        }
    }

    pub(super) fn css_name(&self) -> &str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::Background => "background-color",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
            StyleProperty::FontSize => "font-size",
            StyleProperty::TextAlign => "text-align",
            StyleProperty::Margin => "margin",
            StyleProperty::Padding => "padding",
            StyleProperty::Border => "border",
            StyleProperty::FontFamily => "font-family",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::Other(name) => name,
        }
    }

    pub(super) fn css_value(&self, value: &Value) -> String {
        let is_dimension = matches!(
            self,
            StyleProperty::Width
                | StyleProperty::Height
                | StyleProperty::FontSize
                | StyleProperty::Margin
                | StyleProperty::Padding
        );
        match value {
            Value::Number(number) if is_dimension => format!("{}px", format_number(*number)),
            Value::Text(text) => match self {
                StyleProperty::Color | StyleProperty::Background => css_color(text).to_string(),
                StyleProperty::TextAlign => match text.as_str() {
                    "esquerda" => "left",
                    "direita" => "right",
                    "centro" => "center",
                    "justificado" => "justify",
                    other => other,
                }
                .to_string(),
                StyleProperty::FontWeight => match text.as_str() {
                    "negrito" => "bold",
                    other => other,
                }
                .to_string(),
                _ => text.clone(),
            },
            other => other.to_string(),
        }
    }
}

pub(super) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl<O: OutputSink, I: InputSource> Interpreter<O, I> {
    pub(super) fn render_element(&mut self, element: &WebElement) -> Result<String, RuntimeError> {
        let tag = html_tag(&element.tag);
        let mut html = format!("<{tag}");
        for attribute in &element.attributes {
            let rendered = match &attribute.value {
                AttributeValue::Object(object) => self.render_style(object)?,
                AttributeValue::Expression(expression) => {
                    self.eval_expression(expression)?.to_string()
                }
            };
            let _ = write!(
                html,
                " {}=\"{}\"",
                html_attribute(&attribute.name),
                escape_html(&rendered)
            );
        }
        html.push('>');
        if is_void(tag) {
            return Ok(html);
        }

        for child in &element.children {
            match child {
                WebNode::Element(nested) => {
                    let nested = self.render_element(nested)?;
                    html.push_str(&nested);
                }
                WebNode::Text(text) => html.push_str(&escape_html(text)),
                WebNode::Interpolation(expression) => {
                    let value = self.eval_expression(expression)?;
                    html.push_str(&escape_html(&value.to_string()));
                }
            }
        }
        let _ = write!(html, "</{tag}>");
        Ok(html)
    }

    fn render_style(&mut self, object: &ObjectLiteral) -> Result<String, RuntimeError> {
        let mut declarations = Vec::with_capacity(object.entries.len());
        for (key, expression) in &object.entries {
            let property = StyleProperty::from_key(key);
            let value = self.eval_expression(expression)?;
            declarations.push(format!(
                "{}: {}",
                property.css_name(),
                property.css_value(&value)
            ));
        }
        Ok(declarations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_style_properties() {
        let color = StyleProperty::from_key("cor");
        assert_eq!(color.css_name(), "color");
        assert_eq!(color.css_value(&Value::Text("azul".to_string())), "blue");

        let width = StyleProperty::from_key("largura");
        assert_eq!(width.css_value(&Value::Number(120.0)), "120px");

        let align = StyleProperty::from_key("alinhamento");
        assert_eq!(align.css_value(&Value::Text("centro".to_string())), "center");

        let custom = StyleProperty::from_key("z-index");
        assert_eq!(custom, StyleProperty::Other("z-index".to_string()));
        assert_eq!(custom.css_name(), "z-index");
        assert_eq!(custom.css_value(&Value::Number(2.0)), "2");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn maps_vocabulary_with_passthrough() {
        assert_eq!(html_tag("titulo"), "h1");
        assert_eq!(html_tag("video"), "video");
        assert_eq!(html_attribute("destino"), "href");
        assert_eq!(html_attribute("data-id"), "data-id");
        assert!(is_void(html_tag("imagem")));
    }
}
