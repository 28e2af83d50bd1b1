//! Syntax tree shared by the interpreter and the TAC generator.
//!
//! The parser builds these nodes once; afterwards they are only read. Function
//! declarations sit behind an `Rc` so the interpreter can store them as runtime
//! values without cloning bodies.

use std::fmt;
use std::rc::Rc;

use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Integer,
    Real,
    Natural,
    Text,
    Boolean,
    List,
    Function,
}

impl DeclaredType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DeclaredType::Integer | DeclaredType::Real | DeclaredType::Natural
        )
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DeclaredType::Integer => "INTEIRO",
            DeclaredType::Real => "REAL",
            DeclaredType::Natural => "NATURAL",
            DeclaredType::Text => "TEXTO",
            DeclaredType::Boolean => "LOGICO",
            DeclaredType::List => "LISTA",
            DeclaredType::Function => "FUNCAO",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    Number(f64),
    Text(String),
    Boolean(bool),
    Identifier(String),
    List(Vec<Expression>),
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Logical {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    Call {
        callee: String,
        args: Vec<Expression>,
    },
    Calculator {
        op: CalculatorOperator,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Literal operand, including a negated number literal such as `-1`.
    pub fn is_literal(&self) -> bool {
        match &self.kind {
            ExpressionKind::Number(_) | ExpressionKind::Text(_) | ExpressionKind::Boolean(_) => {
                true
            }
            ExpressionKind::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => matches!(operand.kind, ExpressionKind::Number(_)),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Built-in calculator operations: `RAIZ(x[, n])` and `POTENCIA(b, e)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CalculatorOperator {
    Root,
    Power,
}

impl CalculatorOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            CalculatorOperator::Root => "RAIZ",
            CalculatorOperator::Power => "POTENCIA",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    VariableDeclaration {
        name: String,
        declared_type: DeclaredType,
        initializer: Option<Expression>,
    },
    Assignment {
        target: String,
        value: Expression,
    },
    Update {
        target: String,
        op: UpdateOperator,
    },
    Print(Vec<Expression>),
    Input {
        prompt: Option<String>,
        target: String,
    },
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    DoWhile {
        body: Vec<Statement>,
        condition: Expression,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Box<Statement>>,
        body: Vec<Statement>,
    },
    Break,
    Continue,
    Return(Option<Expression>),
    FunctionDeclaration(Rc<FunctionDeclaration>),
    Expr(Expression),
    Switch {
        subject: Expression,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
    },
    Web(WebElement),
}

#[derive(Debug, PartialEq, Clone)]
pub enum UpdateOperator {
    Increment,
    Decrement,
    AddAssign(Expression),
    SubAssign(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct SwitchCase {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    pub name: String,
    pub declared_type: DeclaredType,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    /// `None` for functions declared without a return type or with `VAZIO`.
    pub return_type: Option<DeclaredType>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WebElement {
    pub tag: String,
    pub attributes: Vec<WebAttribute>,
    pub children: Vec<WebNode>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WebAttribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttributeValue {
    Object(ObjectLiteral),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ObjectLiteral {
    pub entries: Vec<(String, Expression)>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum WebNode {
    Element(WebElement),
    Text(String),
    Interpolation(Expression),
}
