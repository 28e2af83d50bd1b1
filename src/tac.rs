//! Three-address code for the straight-line subset of the language:
//! declarations, assignments, updates, reads and prints over arithmetic
//! expressions.

use std::fmt;

mod generator;
mod optimizer;

pub use generator::generate;
pub use optimizer::optimize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TacOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Print,
    Read,
}

impl TacOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, TacOp::Add | TacOp::Sub | TacOp::Mul | TacOp::Div)
    }

    /// Instructions that talk to the outside world and are never dead.
    pub fn has_effect(self) -> bool {
        matches!(self, TacOp::Print | TacOp::Read)
    }

    fn symbol(self) -> &'static str {
        match self {
            TacOp::Assign => "=",
            TacOp::Add => "+",
            TacOp::Sub => "-",
            TacOp::Mul => "*",
            TacOp::Div => "/",
            TacOp::Print => "print",
            TacOp::Read => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Name(String),
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Operand {
    pub fn is_constant(&self) -> bool {
        !matches!(self, Operand::Name(_))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(name) => f.write_str(name),
            Operand::Number(value) => write!(f, "{value}"),
            Operand::Text(text) => write!(f, "{text:?}"),
            Operand::Boolean(true) => f.write_str("VERDADEIRO"),
            Operand::Boolean(false) => f.write_str("FALSO"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TacInstruction {
    pub op: TacOp,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub result: Option<String>,
}

impl TacInstruction {
    pub fn assign(result: impl Into<String>, value: Operand) -> Self {
        Self {
            op: TacOp::Assign,
            arg1: Some(value),
            arg2: None,
            result: Some(result.into()),
        }
    }

    pub fn binary(op: TacOp, result: impl Into<String>, left: Operand, right: Operand) -> Self {
        Self {
            op,
            arg1: Some(left),
            arg2: Some(right),
            result: Some(result.into()),
        }
    }

    pub fn print(value: Operand) -> Self {
        Self {
            op: TacOp::Print,
            arg1: Some(value),
            arg2: None,
            result: None,
        }
    }

    pub fn read(target: impl Into<String>) -> Self {
        Self {
            op: TacOp::Read,
            arg1: None,
            arg2: None,
            result: Some(target.into()),
        }
    }

    /// Names read by this instruction.
    pub fn operand_names(&self) -> impl Iterator<Item = &str> {
        [self.arg1.as_ref(), self.arg2.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(Operand::as_name)
    }
}

impl fmt::Display for TacInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result.as_deref().unwrap_or("_");
        match (self.op, &self.arg1, &self.arg2) {
            (TacOp::Print, Some(value), _) => write!(f, "print {value}"),
            (TacOp::Read, _, _) => write!(f, "read {result}"),
            (TacOp::Assign, Some(value), _) => write!(f, "{result} = {value}"),
            (op, Some(left), Some(right)) => {
                write!(f, "{result} = {left} {} {right}", op.symbol())
            }
            (op, _, _) => write!(f, "{result} = {}", op.symbol()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TacProgram {
    pub instructions: Vec<TacInstruction>,
}

impl TacProgram {
    pub fn new(instructions: Vec<TacInstruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TacInstruction> {
        self.instructions.iter()
    }
}

impl fmt::Display for TacProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
