//! Parse-time knowledge about functions and names: the signature table, the
//! static argument checks run at call sites and the reserved-name rules.

use rustc_hash::FxHashMap;

use super::ParseErrorKind;
use crate::ast::{
    BinaryOperator, DeclaredType, Expression, ExpressionKind, Parameter, UnaryOperator,
};
use crate::token::KEYWORDS;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<DeclaredType>,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    signatures: FxHashMap<String, FunctionSignature>,
}

impl FunctionTable {
    /// Returns `false` and keeps the existing entry when the name is taken.
    pub fn insert(&mut self, signature: FunctionSignature) -> bool {
        if self.signatures.contains_key(&signature.name) {
            return false;
        }
        self.signatures.insert(signature.name.clone(), signature);
        true
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.signatures.get(name)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// What the parser can tell about an expression's value without running it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StaticType {
    /// Numeric; the value is known when the expression is a literal.
    Number(Option<f64>),
    Text,
    Boolean,
    List,
    /// Result of calling a function with no return type.
    Void,
    Unknown,
}

impl StaticType {
    pub(crate) fn of(expression: &Expression, functions: &FunctionTable) -> Self {
        match &expression.kind {
            ExpressionKind::Number(value) => StaticType::Number(Some(*value)),
            ExpressionKind::Text(_) => StaticType::Text,
            ExpressionKind::Boolean(_) => StaticType::Boolean,
            ExpressionKind::List(_) => StaticType::List,
            ExpressionKind::Identifier(_) | ExpressionKind::Index { .. } => StaticType::Unknown,
            ExpressionKind::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => match StaticType::of(operand, functions) {
                StaticType::Number(value) => StaticType::Number(value.map(|value| -value)),
                _ => StaticType::Unknown,
            },
            ExpressionKind::Unary {
                op: UnaryOperator::Not,
                ..
            }
            | ExpressionKind::Logical { .. } => StaticType::Boolean,
            ExpressionKind::Binary { left, op, right } => {
                if !op.is_arithmetic() {
                    return StaticType::Boolean;
                }
                let left = StaticType::of(left, functions);
                let right = StaticType::of(right, functions);
                match (left, *op, right) {
                    (StaticType::Number(_), _, StaticType::Number(_)) => StaticType::Number(None),
                    (StaticType::Text, BinaryOperator::Add, StaticType::Text) => StaticType::Text,
                    (StaticType::List, BinaryOperator::Add, StaticType::List) => StaticType::List,
                    _ => StaticType::Unknown,
                }
            }
            ExpressionKind::Call { callee, .. } => match functions.get(callee) {
                Some(signature) => match signature.return_type {
                    None => StaticType::Void,
                    Some(declared) if declared.is_numeric() => StaticType::Number(None),
                    Some(DeclaredType::Text) => StaticType::Text,
                    Some(DeclaredType::Boolean) => StaticType::Boolean,
                    Some(DeclaredType::List) => StaticType::List,
                    Some(_) => StaticType::Unknown,
                },
                None => StaticType::Unknown,
            },
            ExpressionKind::Calculator { .. } => StaticType::Number(None),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            StaticType::Number(_) => "um número",
            StaticType::Text => "um texto",
            StaticType::Boolean => "um valor lógico",
            StaticType::List => "uma lista",
            StaticType::Void => "uma função sem retorno",
            StaticType::Unknown => "um valor",
        }
    }

    fn fits(self, declared: DeclaredType) -> bool {
        match self {
            StaticType::Unknown => true,
            StaticType::Void => false,
            StaticType::Number(value) => match declared {
                DeclaredType::Real => true,
                DeclaredType::Integer => value.is_none_or(|value| value.fract() == 0.0),
                DeclaredType::Natural => {
                    value.is_none_or(|value| value.fract() == 0.0 && value >= 0.0)
                }
                _ => false,
            },
            StaticType::Text => declared == DeclaredType::Text,
            StaticType::Boolean => declared == DeclaredType::Boolean,
            StaticType::List => declared == DeclaredType::List,
        }
    }
}

/// Checks a declaration's initializer against the declared type. Only what
/// can be known statically is rejected. An initializer read from a variable or
/// an index has no static type, so `VAR s = a : TEXTO.` is accepted here and
/// its value is checked when the declaration executes.
pub(crate) fn check_initializer(
    functions: &FunctionTable,
    name: &str,
    declared: DeclaredType,
    initializer: &Expression,
) -> Result<(), ParseErrorKind> {
    if declared == DeclaredType::Natural && is_negated_number(initializer) {
        return Err(ParseErrorKind::NegativeNatural {
            name: name.to_string(),
        });
    }
    let found = StaticType::of(initializer, functions);
    if found.fits(declared) {
        Ok(())
    } else {
        Err(ParseErrorKind::InitializerMismatch {
            name: name.to_string(),
            declared,
            found: found.describe(),
        })
    }
}

fn is_negated_number(expression: &Expression) -> bool {
    matches!(
        &expression.kind,
        ExpressionKind::Unary { op: UnaryOperator::Negate, operand }
            if matches!(operand.kind, ExpressionKind::Number(_))
    )
}

/// Resolves a call against the table: the callee must exist, the argument
/// count must match and statically known argument types must fit.
pub(crate) fn check_call(
    functions: &FunctionTable,
    callee: &str,
    args: &[Expression],
) -> Result<(), ParseErrorKind> {
    let Some(signature) = functions.get(callee) else {
        return Err(ParseErrorKind::UndeclaredFunction {
            name: callee.to_string(),
        });
    };
    if signature.params.len() != args.len() {
        return Err(ParseErrorKind::ArityMismatch {
            name: callee.to_string(),
            expected: signature.params.len(),
            found: args.len(),
        });
    }
    for (position, (param, arg)) in signature.params.iter().zip(args).enumerate() {
        let found = StaticType::of(arg, functions);
        if !found.fits(param.declared_type) {
            return Err(ParseErrorKind::ArgumentTypeMismatch {
                name: callee.to_string(),
                position: position + 1,
                expected: param.declared_type,
                found: found.describe(),
            });
        }
    }
    Ok(())
}

/// Rejects names that collide with a keyword in any letter case, and
/// all-uppercase names one edit away from a keyword of four or more letters.
pub(crate) fn check_name(name: &str) -> Result<(), ParseErrorKind> {
    let upper = name.to_uppercase();
    if KEYWORDS.iter().any(|(keyword, _)| *keyword == upper) {
        return Err(ParseErrorKind::ReservedWord {
            name: name.to_string(),
        });
    }
    if name != upper {
        return Ok(());
    }
    let near_miss = KEYWORDS
        .iter()
        .map(|(keyword, _)| *keyword)
        .filter(|keyword| keyword.len() >= 4)
        .find(|keyword| edit_distance(name, keyword) == 1);
    match near_miss {
        Some(keyword) => Err(ParseErrorKind::KeywordTypo {
            name: name.to_string(),
            keyword,
        }),
        None => Ok(()),
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, left) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, right) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(left != right);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
