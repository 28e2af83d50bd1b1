use std::fmt;
use std::rc::Rc;

use crate::ast::{DeclaredType, FunctionDeclaration};

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    List(Vec<Value>),
    Function(Rc<FunctionDeclaration>),
}

impl Value {
    /// Value given to a declaration without initializer.
    pub(super) fn zero(declared: DeclaredType) -> Option<Value> {
        match declared {
            DeclaredType::Integer | DeclaredType::Real | DeclaredType::Natural => {
                Some(Value::Number(0.0))
            }
            DeclaredType::Text => Some(Value::Text(String::new())),
            DeclaredType::Boolean => Some(Value::Boolean(false)),
            DeclaredType::List => Some(Value::List(Vec::new())),
            DeclaredType::Function => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "um número",
            Value::Text(_) => "um texto",
            Value::Boolean(_) => "um valor lógico",
            Value::List(_) => "uma lista",
            Value::Function(_) => "uma função",
        }
    }

    /// Whether the value may be stored in a symbol of the declared type.
    pub fn fits(&self, declared: DeclaredType) -> bool {
        match (self, declared) {
            (Value::Number(value), DeclaredType::Real) => value.is_finite(),
            (Value::Number(value), DeclaredType::Integer) => is_integral(*value),
            (Value::Number(value), DeclaredType::Natural) => is_integral(*value) && *value >= 0.0,
            (Value::Text(_), DeclaredType::Text)
            | (Value::Boolean(_), DeclaredType::Boolean)
            | (Value::List(_), DeclaredType::List)
            | (Value::Function(_), DeclaredType::Function) => true,
            _ => false,
        }
    }

    /// Short description used in type errors, e.g. `o número 2,5`.
    pub(super) fn describe(&self) -> String {
        match self {
            Value::Number(_) => format!("o número {self}"),
            Value::Text(text) => format!("o texto \"{text}\""),
            Value::Boolean(_) => format!("o valor {self}"),
            Value::List(_) => "uma lista".to_string(),
            Value::Function(function) => format!("a função '{}'", function.name),
        }
    }

    /// `==` semantics: values of different kinds are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::Text(left), Value::Text(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::List(left), Value::List(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(left, right)| left.equals(right))
            }
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Converts a line typed by the user into a value of the declared type.
    /// Numbers accept either `,` or `.` as decimal separator.
    pub(super) fn from_input(raw: &str, declared: DeclaredType) -> Option<Value> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let value = match declared {
            DeclaredType::Integer | DeclaredType::Real | DeclaredType::Natural => {
                let number = raw.trim().replace(',', ".").parse::<f64>().ok()?;
                Value::Number(number)
            }
            DeclaredType::Text => Value::Text(raw.to_string()),
            DeclaredType::Boolean => match raw.trim().to_uppercase().as_str() {
                "VERDADEIRO" => Value::Boolean(true),
                "FALSO" => Value::Boolean(false),
                _ => return None,
            },
            DeclaredType::List | DeclaredType::Function => return None,
        };
        value.fits(declared).then_some(value)
    }
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// Integral numbers print without decimals; fractional ones use a comma as
/// the decimal separator.
pub fn format_number(value: f64) -> String {
    if is_integral(value) && value.abs() < 1e15 {
        // `-0` prints as `0`.
        format!("{}", value as i64)
    } else {
        value.to_string().replace('.', ",")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(value) => f.write_str(&format_number(*value)),
            Value::Text(text) => f.write_str(text),
            Value::Boolean(true) => f.write_str("VERDADEIRO"),
            Value::Boolean(false) => f.write_str("FALSO"),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Function(function) => write!(f, "<função {}>", function.name),
        }
    }
}
