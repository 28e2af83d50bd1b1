use anyhow::{Result, bail};
use tracing::debug;

use super::{Operand, TacInstruction, TacOp, TacProgram};
use crate::ast::{
    BinaryOperator, DeclaredType, Expression, ExpressionKind, Statement, StatementKind,
    UnaryOperator, UpdateOperator,
};

/// Lowers the straight-line subset of a program to TAC. Statements outside
/// the subset are skipped; an unsupported expression inside a supported
/// statement is an error.
pub fn generate(statements: &[Statement]) -> Result<TacProgram> {
    let mut generator = TacGenerator::default();
    for statement in statements {
        generator.statement(statement)?;
    }
    debug!(instructions = generator.program.len(), "generated tac");
    Ok(TacProgram::new(generator.program))
}

#[derive(Default)]
struct TacGenerator {
    program: Vec<TacInstruction>,
    temp_counter: usize,
}

impl TacGenerator {
    fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn literal(&mut self, value: Operand) -> Operand {
        let temp = self.new_temp();
        self.program.push(TacInstruction::assign(temp.clone(), value));
        Operand::Name(temp)
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match &statement.kind {
            StatementKind::VariableDeclaration {
                name,
                declared_type,
                initializer,
            } => {
                let value = match initializer {
                    Some(initializer) => self.expression(initializer)?,
                    None => {
                        let zero = match declared_type {
                            DeclaredType::Integer | DeclaredType::Real | DeclaredType::Natural => {
                                Operand::Number(0.0)
                            }
                            DeclaredType::Text => Operand::Text(String::new()),
                            DeclaredType::Boolean => Operand::Boolean(false),
                            DeclaredType::List | DeclaredType::Function => {
                                bail!("declaração de '{name}' do tipo {declared_type} não é suportada em TAC")
                            }
                        };
                        self.literal(zero)
                    }
                };
                self.program.push(TacInstruction::assign(name.clone(), value));
            }
            StatementKind::Assignment { target, value } => {
                let value = self.expression(value)?;
                self.program.push(TacInstruction::assign(target.clone(), value));
            }
            StatementKind::Update { target, op } => {
                let (op, amount) = match op {
                    UpdateOperator::Increment => (TacOp::Add, self.literal(Operand::Number(1.0))),
                    UpdateOperator::Decrement => (TacOp::Sub, self.literal(Operand::Number(1.0))),
                    UpdateOperator::AddAssign(value) => (TacOp::Add, self.expression(value)?),
                    UpdateOperator::SubAssign(value) => (TacOp::Sub, self.expression(value)?),
                };
                let temp = self.new_temp();
                self.program.push(TacInstruction::binary(
                    op,
                    temp.clone(),
                    Operand::Name(target.clone()),
                    amount,
                ));
                self.program
                    .push(TacInstruction::assign(target.clone(), Operand::Name(temp)));
            }
            StatementKind::Input { target, .. } => {
                self.program.push(TacInstruction::read(target.clone()));
            }
            StatementKind::Print(args) => {
                for arg in args {
                    let value = self.expression(arg)?;
                    self.program.push(TacInstruction::print(value));
                }
            }
            _ => debug!(line = statement.span.line, "statement outside the tac subset skipped"),
        }
        Ok(())
    }

    fn expression(&mut self, expression: &Expression) -> Result<Operand> {
        match &expression.kind {
            ExpressionKind::Number(value) => Ok(self.literal(Operand::Number(*value))),
            ExpressionKind::Text(value) => Ok(self.literal(Operand::Text(value.clone()))),
            ExpressionKind::Boolean(value) => Ok(self.literal(Operand::Boolean(*value))),
            ExpressionKind::Identifier(name) => Ok(Operand::Name(name.clone())),
            ExpressionKind::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => {
                if let ExpressionKind::Number(value) = &operand.kind {
                    return Ok(self.literal(Operand::Number(-*value)));
                }
                let zero = self.literal(Operand::Number(0.0));
                let value = self.expression(operand)?;
                let temp = self.new_temp();
                self.program
                    .push(TacInstruction::binary(TacOp::Sub, temp.clone(), zero, value));
                Ok(Operand::Name(temp))
            }
            ExpressionKind::Binary { left, op, right } => {
                let op = match op {
                    BinaryOperator::Add => TacOp::Add,
                    BinaryOperator::Sub => TacOp::Sub,
                    BinaryOperator::Mul => TacOp::Mul,
                    BinaryOperator::Div => TacOp::Div,
                    other => bail!(
                        "operador '{}' na linha {} não é suportado em TAC",
                        other.symbol(),
                        expression.span.line
                    ),
                };
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                let temp = self.new_temp();
                self.program
                    .push(TacInstruction::binary(op, temp.clone(), left, right));
                Ok(Operand::Name(temp))
            }
            other => bail!(
                "expressão {} na linha {} não é suportada em TAC",
                describe(other),
                expression.span.line
            ),
        }
    }
}

fn describe(kind: &ExpressionKind) -> &'static str {
    match kind {
        ExpressionKind::List(_) => "de lista",
        ExpressionKind::Index { .. } => "de índice",
        ExpressionKind::Unary { .. } => "de negação lógica",
        ExpressionKind::Logical { .. } => "lógica",
        ExpressionKind::Call { .. } => "de chamada de função",
        ExpressionKind::Calculator { .. } => "de calculadora",
        _ => "desconhecida",
    }
}
