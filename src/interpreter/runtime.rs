use std::cmp::Ordering;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{
    BinaryOperator, CalculatorOperator, DeclaredType, Expression, ExpressionKind,
    LogicalOperator, Statement, StatementKind, SwitchCase, UnaryOperator, UpdateOperator,
};
use crate::token::Span;

use super::Interpreter;
use super::error::{RuntimeError, RuntimeErrorKind};
use super::io::{InputSource, OutputSink};
use super::scope::{Scope, Symbol};
use super::value::Value;

type RunResult<T> = Result<T, RuntimeError>;

/// Control-flow signal produced by statement execution.
#[derive(Debug)]
pub(super) enum ExecResult {
    Normal,
    Break,
    Continue,
    Return(Option<Value>),
}

impl ExecResult {
    pub(super) fn keyword(&self) -> &'static str {
        match self {
            ExecResult::Normal => "",
            ExecResult::Break => "PARAR",
            ExecResult::Continue => "CONTINUAR",
            ExecResult::Return(_) => "RETORNAR",
        }
    }
}

/// The three loop statements share one driver.
struct LoopPlan<'s> {
    construct: &'static str,
    condition: Option<&'s Expression>,
    update: Option<&'s Statement>,
    body: &'s [Statement],
    /// `false` for `FACA ... ENQUANTO`, whose body runs before the first test.
    test_first: bool,
    span: Span,
}

fn fail<T>(kind: RuntimeErrorKind, span: Span) -> RunResult<T> {
    Err(RuntimeError::new(kind, span))
}

impl<O: OutputSink, I: InputSource> Interpreter<O, I> {
    pub(super) fn exec_statements(&mut self, body: &[Statement]) -> RunResult<ExecResult> {
        for statement in body {
            match self.exec_statement(statement)? {
                ExecResult::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(ExecResult::Normal)
    }

    /// Runs `body` in a fresh scope that is popped on every exit path.
    pub(super) fn exec_block(&mut self, body: &[Statement]) -> RunResult<ExecResult> {
        self.scopes.push_scope();
        let result = self.exec_statements(body);
        self.scopes.pop_scope();
        result
    }

    fn exec_statement(&mut self, statement: &Statement) -> RunResult<ExecResult> {
        let span = statement.span;
        match &statement.kind {
            StatementKind::VariableDeclaration {
                name,
                declared_type,
                initializer,
            } => {
                let value = match initializer {
                    Some(initializer) => self.eval_expression(initializer)?,
                    None => match Value::zero(*declared_type) {
                        Some(value) => value,
                        None => {
                            return fail(
                                RuntimeErrorKind::TypeMismatch {
                                    name: name.clone(),
                                    expected: *declared_type,
                                    found: "nenhum valor".to_string(),
                                },
                                span,
                            );
                        }
                    },
                };
                check_type(name, *declared_type, &value, span)?;
                self.scopes
                    .declare(Symbol {
                        name: name.clone(),
                        declared_type: *declared_type,
                        value,
                    })
                    .or_else(|symbol| {
                        fail(RuntimeErrorKind::Redeclaration { name: symbol.name }, span)
                    })?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Assignment { target, value } => {
                let value = self.eval_expression(value)?;
                self.assign(target, value, span)?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Update { target, op } => {
                self.exec_update(target, op, span)?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Print(args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.eval_expression(arg)?.to_string());
                }
                self.output.print(&parts.join(" "));
                Ok(ExecResult::Normal)
            }
            StatementKind::Input { prompt, target } => {
                self.exec_input(prompt.as_deref(), target, span)?;
                Ok(ExecResult::Normal)
            }
            StatementKind::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_condition(condition, "SE")? {
                    self.exec_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)
                } else {
                    Ok(ExecResult::Normal)
                }
            }
            StatementKind::While { condition, body } => self.run_loop(LoopPlan {
                construct: "ENQUANTO",
                condition: Some(condition),
                update: None,
                body,
                test_first: true,
                span,
            }),
            StatementKind::DoWhile { body, condition } => self.run_loop(LoopPlan {
                construct: "FACA",
                condition: Some(condition),
                update: None,
                body,
                test_first: false,
                span,
            }),
            StatementKind::For {
                init,
                condition,
                update,
                body,
            } => {
                // The init declaration lives in a scope around the whole loop.
                self.scopes.push_scope();
                let result = self.exec_for(
                    init.as_deref(),
                    LoopPlan {
                        construct: "PARA",
                        condition: condition.as_ref(),
                        update: update.as_deref(),
                        body,
                        test_first: true,
                        span,
                    },
                );
                self.scopes.pop_scope();
                result
            }
            StatementKind::Break => Ok(ExecResult::Break),
            StatementKind::Continue => Ok(ExecResult::Continue),
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.eval_expression(value)?),
                    None => None,
                };
                Ok(ExecResult::Return(value))
            }
            StatementKind::FunctionDeclaration(declaration) => {
                debug!(
                    name = %declaration.name,
                    params = declaration.params.len(),
                    "declared function"
                );
                self.scopes
                    .declare_global(Symbol {
                        name: declaration.name.clone(),
                        declared_type: DeclaredType::Function,
                        value: Value::Function(Rc::clone(declaration)),
                    })
                    .or_else(|symbol| {
                        fail(RuntimeErrorKind::Redeclaration { name: symbol.name }, span)
                    })?;
                Ok(ExecResult::Normal)
            }
            StatementKind::Expr(expression) => {
                match &expression.kind {
                    // Statement calls may target functions without a return type.
                    ExpressionKind::Call { callee, args } => {
                        self.eval_call(callee, args, expression.span)?;
                    }
                    _ => {
                        self.eval_expression(expression)?;
                    }
                }
                Ok(ExecResult::Normal)
            }
            StatementKind::Switch {
                subject,
                cases,
                default,
            } => self.exec_switch(subject, cases, default.as_deref()),
            StatementKind::Web(element) => {
                let html = self.render_element(element)?;
                self.html.push_str(&html);
                self.html.push('\n');
                Ok(ExecResult::Normal)
            }
        }
    }

    fn exec_for(&mut self, init: Option<&Statement>, plan: LoopPlan<'_>) -> RunResult<ExecResult> {
        if let Some(init) = init {
            self.exec_statement(init)?;
        }
        self.run_loop(plan)
    }

    fn run_loop(&mut self, plan: LoopPlan<'_>) -> RunResult<ExecResult> {
        let mut iterations = 0usize;
        loop {
            let skip_test = iterations == 0 && !plan.test_first;
            if !skip_test {
                if let Some(condition) = plan.condition {
                    if !self.eval_condition(condition, plan.construct)? {
                        break;
                    }
                }
            }

            iterations += 1;
            if iterations > self.config.loop_limit {
                return fail(
                    RuntimeErrorKind::LoopLimitExceeded {
                        limit: self.config.loop_limit,
                    },
                    plan.span,
                );
            }

            match self.exec_block(plan.body)? {
                ExecResult::Normal | ExecResult::Continue => {}
                ExecResult::Break => break,
                ExecResult::Return(value) => return Ok(ExecResult::Return(value)),
            }
            if let Some(update) = plan.update {
                self.exec_statement(update)?;
            }
        }
        trace!(construct = plan.construct, iterations, "loop finished");
        Ok(ExecResult::Normal)
    }

    /// Fallthrough semantics: once a case matches, every following case body
    /// runs until `PARAR`. `PADRAO` runs only when nothing matched.
    fn exec_switch(
        &mut self,
        subject: &Expression,
        cases: &[SwitchCase],
        default: Option<&[Statement]>,
    ) -> RunResult<ExecResult> {
        let control = self.eval_expression(subject)?;
        let mut matched = false;
        for case in cases {
            if !matched {
                matched = self.case_matches(&control, &case.condition)?;
            }
            if matched {
                match self.exec_block(&case.body)? {
                    ExecResult::Normal => {}
                    ExecResult::Break => return Ok(ExecResult::Normal),
                    signal => return Ok(signal),
                }
            }
        }
        if !matched {
            if let Some(default) = default {
                return match self.exec_block(default)? {
                    ExecResult::Break => Ok(ExecResult::Normal),
                    signal => Ok(signal),
                };
            }
        }
        Ok(ExecResult::Normal)
    }

    /// Literal cases compare with the control value; any other case must be
    /// a boolean condition.
    fn case_matches(&mut self, control: &Value, condition: &Expression) -> RunResult<bool> {
        let value = self.eval_expression(condition)?;
        if condition.is_literal() {
            return Ok(control.equals(&value));
        }
        match value {
            Value::Boolean(matched) => Ok(matched),
            other => fail(
                RuntimeErrorKind::NonBooleanCondition {
                    construct: "CASO",
                    found: other.type_name(),
                },
                condition.span,
            ),
        }
    }

    fn assign(&mut self, target: &str, value: Value, span: Span) -> RunResult<()> {
        let declared = match self.scopes.lookup(target) {
            Some(symbol) => symbol.declared_type,
            None => return Err(self.unresolved(target, span)),
        };
        check_type(target, declared, &value, span)?;
        if let Some(symbol) = self.scopes.lookup_mut(target) {
            symbol.value = value;
        }
        Ok(())
    }

    fn exec_update(&mut self, target: &str, op: &UpdateOperator, span: Span) -> RunResult<()> {
        let delta = match op {
            UpdateOperator::Increment => 1.0,
            UpdateOperator::Decrement => -1.0,
            UpdateOperator::AddAssign(value) => self.eval_number(value, "+=")?,
            UpdateOperator::SubAssign(value) => -self.eval_number(value, "-=")?,
        };
        let (declared, current) = match self.scopes.lookup(target) {
            Some(symbol) => (symbol.declared_type, symbol.value.clone()),
            None => return Err(self.unresolved(target, span)),
        };
        let current = match current {
            Value::Number(current) if declared.is_numeric() => current,
            _ => {
                return fail(
                    RuntimeErrorKind::NotUpdatable {
                        name: target.to_string(),
                        declared,
                    },
                    span,
                );
            }
        };
        self.assign(target, Value::Number(current + delta), span)
    }

    fn exec_input(&mut self, prompt: Option<&str>, target: &str, span: Span) -> RunResult<()> {
        let declared = match self.scopes.lookup(target) {
            Some(symbol) => symbol.declared_type,
            None => return Err(self.unresolved(target, span)),
        };
        let raw = self.input.read_line(prompt.unwrap_or_default()).or_else(|error| {
            fail(
                RuntimeErrorKind::InputUnavailable {
                    message: error.to_string(),
                },
                span,
            )
        })?;
        let Some(value) = Value::from_input(&raw, declared) else {
            return fail(
                RuntimeErrorKind::InvalidInput {
                    input: raw,
                    expected: declared,
                },
                span,
            );
        };
        self.assign(target, value, span)
    }

    /// Missing names are `OutOfScope` when declared somewhere during this run.
    fn unresolved(&self, name: &str, span: Span) -> RuntimeError {
        let name = name.to_string();
        let kind = if self.scopes.was_declared(&name) {
            RuntimeErrorKind::OutOfScope { name }
        } else {
            RuntimeErrorKind::UndefinedVariable { name }
        };
        RuntimeError::new(kind, span)
    }

    pub(super) fn eval_expression(&mut self, expression: &Expression) -> RunResult<Value> {
        let span = expression.span;
        match &expression.kind {
            ExpressionKind::Number(value) => Ok(Value::Number(*value)),
            ExpressionKind::Text(value) => Ok(Value::Text(value.clone())),
            ExpressionKind::Boolean(value) => Ok(Value::Boolean(*value)),
            ExpressionKind::Identifier(name) => match self.scopes.lookup(name) {
                Some(symbol) => Ok(symbol.value.clone()),
                None => Err(self.unresolved(name, span)),
            },
            ExpressionKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expression(item)?);
                }
                Ok(Value::List(values))
            }
            ExpressionKind::Index { object, index } => {
                let object = self.eval_expression(object)?;
                let index = self.eval_expression(index)?;
                index_value(object, index, span)
            }
            ExpressionKind::Unary { op, operand } => {
                let value = self.eval_expression(operand)?;
                match (op, value) {
                    (UnaryOperator::Negate, Value::Number(value)) => Ok(Value::Number(-value)),
                    (UnaryOperator::Not, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
                    (UnaryOperator::Negate, other) => fail(
                        RuntimeErrorKind::InvalidOperand {
                            operation: "-",
                            expected: "um número",
                            found: other.type_name(),
                        },
                        span,
                    ),
                    (UnaryOperator::Not, other) => fail(
                        RuntimeErrorKind::InvalidOperand {
                            operation: "!",
                            expected: "um valor lógico",
                            found: other.type_name(),
                        },
                        span,
                    ),
                }
            }
            ExpressionKind::Binary { left, op, right } => {
                let left = self.eval_expression(left)?;
                let right = self.eval_expression(right)?;
                binary(*op, left, right, span)
            }
            ExpressionKind::Logical { left, op, right } => {
                let symbol = match op {
                    LogicalOperator::And => "&&",
                    LogicalOperator::Or => "||",
                };
                let left = self.eval_boolean(left, symbol)?;
                match (op, left) {
                    (LogicalOperator::And, false) => Ok(Value::Boolean(false)),
                    (LogicalOperator::Or, true) => Ok(Value::Boolean(true)),
                    _ => Ok(Value::Boolean(self.eval_boolean(right, symbol)?)),
                }
            }
            ExpressionKind::Call { callee, args } => match self.eval_call(callee, args, span)? {
                Some(value) => Ok(value),
                None => fail(
                    RuntimeErrorKind::VoidValue {
                        name: callee.clone(),
                    },
                    span,
                ),
            },
            ExpressionKind::Calculator { op, args } => self.eval_calculator(*op, args, span),
        }
    }

    fn eval_condition(&mut self, condition: &Expression, construct: &'static str) -> RunResult<bool> {
        match self.eval_expression(condition)? {
            Value::Boolean(value) => Ok(value),
            other => fail(
                RuntimeErrorKind::NonBooleanCondition {
                    construct,
                    found: other.type_name(),
                },
                condition.span,
            ),
        }
    }

    fn eval_boolean(&mut self, expression: &Expression, operation: &'static str) -> RunResult<bool> {
        match self.eval_expression(expression)? {
            Value::Boolean(value) => Ok(value),
            other => fail(
                RuntimeErrorKind::InvalidOperand {
                    operation,
                    expected: "um valor lógico",
                    found: other.type_name(),
                },
                expression.span,
            ),
        }
    }

    fn eval_number(&mut self, expression: &Expression, operation: &'static str) -> RunResult<f64> {
        match self.eval_expression(expression)? {
            Value::Number(value) => Ok(value),
            other => fail(
                RuntimeErrorKind::InvalidOperand {
                    operation,
                    expected: "um número",
                    found: other.type_name(),
                },
                expression.span,
            ),
        }
    }

    /// Calls a user function. Returns `None` for functions without a return
    /// type.
    fn eval_call(
        &mut self,
        callee: &str,
        args: &[Expression],
        span: Span,
    ) -> RunResult<Option<Value>> {
        let function = match self.scopes.lookup(callee).map(|symbol| &symbol.value) {
            Some(Value::Function(function)) => Rc::clone(function),
            Some(_) => {
                return fail(
                    RuntimeErrorKind::NotAFunction {
                        name: callee.to_string(),
                    },
                    span,
                );
            }
            None => {
                return fail(
                    RuntimeErrorKind::UndefinedFunction {
                        name: callee.to_string(),
                    },
                    span,
                );
            }
        };

        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.eval_expression(arg)?);
        }
        if arguments.len() != function.params.len() {
            return fail(
                RuntimeErrorKind::ArityMismatch {
                    name: function.name.clone(),
                    expected: function.params.len(),
                    found: arguments.len(),
                },
                span,
            );
        }

        let mut parameters = Scope::default();
        for (param, value) in function.params.iter().zip(arguments) {
            if !value.fits(param.declared_type) {
                return fail(
                    RuntimeErrorKind::ArgumentTypeMismatch {
                        name: function.name.clone(),
                        param: param.name.clone(),
                        expected: param.declared_type,
                        found: value.describe(),
                    },
                    span,
                );
            }
            parameters
                .declare(Symbol {
                    name: param.name.clone(),
                    declared_type: param.declared_type,
                    value,
                })
                .or_else(|symbol| {
                    fail(RuntimeErrorKind::Redeclaration { name: symbol.name }, span)
                })?;
        }

        if self.call_depth >= self.config.max_call_depth {
            return fail(
                RuntimeErrorKind::CallDepthExceeded {
                    limit: self.config.max_call_depth,
                },
                span,
            );
        }
        trace!(function = %function.name, depth = self.call_depth + 1, "call");
        self.call_depth += 1;
        self.scopes.push_frame(parameters);
        let result = self.exec_block(&function.body);
        self.scopes.pop_frame();
        self.call_depth -= 1;

        let returned = match result? {
            ExecResult::Return(value) => value,
            ExecResult::Normal | ExecResult::Break | ExecResult::Continue => None,
        };
        match (function.return_type, returned) {
            (None, None) => Ok(None),
            (None, Some(_)) => fail(
                RuntimeErrorKind::UnexpectedReturnValue {
                    name: function.name.clone(),
                },
                span,
            ),
            (Some(expected), None) => fail(
                RuntimeErrorKind::MissingReturnValue {
                    name: function.name.clone(),
                    expected,
                },
                span,
            ),
            (Some(expected), Some(value)) if value.fits(expected) => Ok(Some(value)),
            (Some(expected), Some(value)) => fail(
                RuntimeErrorKind::ReturnTypeMismatch {
                    name: function.name.clone(),
                    expected,
                    found: value.describe(),
                },
                span,
            ),
        }
    }

    fn eval_calculator(
        &mut self,
        op: CalculatorOperator,
        args: &[Expression],
        span: Span,
    ) -> RunResult<Value> {
        let mut numbers = Vec::with_capacity(args.len());
        for arg in args {
            numbers.push(self.eval_number(arg, op.keyword())?);
        }
        let result = match (op, numbers.as_slice()) {
            (CalculatorOperator::Root, [radicand]) => root(*radicand, 2.0, span)?,
            (CalculatorOperator::Root, [radicand, degree]) => root(*radicand, *degree, span)?,
            (CalculatorOperator::Power, [base, exponent]) => base.powf(*exponent),
            _ => {
                return fail(
                    RuntimeErrorKind::ArityMismatch {
                        name: op.keyword().to_string(),
                        expected: if op == CalculatorOperator::Root { 1 } else { 2 },
                        found: numbers.len(),
                    },
                    span,
                );
            }
        };
        if !result.is_finite() {
            return fail(
                RuntimeErrorKind::InvalidCalculation {
                    operation: op.keyword(),
                    detail: "o resultado não é um número finito",
                },
                span,
            );
        }
        Ok(Value::Number(snap_to_integer(result)))
    }
}

fn check_type(name: &str, declared: DeclaredType, value: &Value, span: Span) -> RunResult<()> {
    if value.fits(declared) {
        return Ok(());
    }
    fail(
        RuntimeErrorKind::TypeMismatch {
            name: name.to_string(),
            expected: declared,
            found: value.describe(),
        },
        span,
    )
}

fn binary(op: BinaryOperator, left: Value, right: Value, span: Span) -> RunResult<Value> {
    let value = match (op, left, right) {
        (BinaryOperator::Add, Value::Number(left), Value::Number(right)) => {
            Value::Number(left + right)
        }
        (BinaryOperator::Add, Value::Text(left), Value::Text(right)) => Value::Text(left + &right),
        (BinaryOperator::Add, Value::List(mut left), Value::List(right)) => {
            left.extend(right);
            Value::List(left)
        }
        (BinaryOperator::Sub, Value::Number(left), Value::Number(right)) => {
            Value::Number(left - right)
        }
        (BinaryOperator::Mul, Value::Number(left), Value::Number(right)) => {
            Value::Number(left * right)
        }
        (BinaryOperator::Div, Value::Number(_), Value::Number(right)) if right == 0.0 => {
            return fail(RuntimeErrorKind::DivisionByZero, span);
        }
        (BinaryOperator::Div, Value::Number(left), Value::Number(right)) => {
            Value::Number(left / right)
        }
        (BinaryOperator::Equal, left, right) => Value::Boolean(left.equals(&right)),
        (BinaryOperator::NotEqual, left, right) => Value::Boolean(!left.equals(&right)),
        (
            op @ (BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual),
            Value::Number(left),
            Value::Number(right),
        ) => Value::Boolean(compare(op, left.partial_cmp(&right))),
        (
            op @ (BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual),
            Value::Text(left),
            Value::Text(right),
        ) => Value::Boolean(compare(op, Some(left.cmp(&right)))),
        (op, left, right) => {
            return fail(
                RuntimeErrorKind::UnsupportedOperation {
                    operation: op.symbol(),
                    left: left.type_name(),
                    right: right.type_name(),
                },
                span,
            );
        }
    };
    Ok(value)
}

fn compare(op: BinaryOperator, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEqual => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEqual => ordering.is_ge(),
        _ => false,
    }
}

fn index_value(object: Value, index: Value, span: Span) -> RunResult<Value> {
    let position = match index {
        Value::Number(position) if position >= 0.0 && position.fract() == 0.0 => position,
        other => {
            return fail(
                RuntimeErrorKind::InvalidIndex {
                    found: other.describe(),
                },
                span,
            );
        }
    };
    let slot = position as usize;
    match object {
        Value::List(items) => {
            let len = items.len();
            items.into_iter().nth(slot).ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::IndexOutOfBounds {
                        index: position,
                        len,
                    },
                    span,
                )
            })
        }
        Value::Text(text) => match text.chars().nth(slot) {
            Some(ch) => Ok(Value::Text(ch.to_string())),
            None => fail(
                RuntimeErrorKind::IndexOutOfBounds {
                    index: position,
                    len: text.chars().count(),
                },
                span,
            ),
        },
        other => fail(
            RuntimeErrorKind::NotIndexable {
                found: other.type_name(),
            },
            span,
        ),
    }
}

fn root(radicand: f64, degree: f64, span: Span) -> RunResult<f64> {
    if degree == 0.0 {
        return fail(
            RuntimeErrorKind::InvalidCalculation {
                operation: "RAIZ",
                detail: "o índice da raiz não pode ser zero",
            },
            span,
        );
    }
    if radicand >= 0.0 {
        return Ok(if degree == 2.0 {
            radicand.sqrt()
        } else {
            radicand.powf(degree.recip())
        });
    }
    let odd_degree = degree.fract() == 0.0 && degree % 2.0 != 0.0;
    if odd_degree {
        Ok(-(-radicand).powf(degree.recip()))
    } else {
        fail(
            RuntimeErrorKind::InvalidCalculation {
                operation: "RAIZ",
                detail: "raiz de índice par de número negativo",
            },
            span,
        )
    }
}

/// Removes floating-point noise such as `27^(1/3) = 3.0000000000000004`.
fn snap_to_integer(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        rounded
    } else {
        value
    }
}
