use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::{Operand, TacInstruction, TacOp, TacProgram};

/// Upper bound on pass rounds; every round either shrinks the program or
/// turns an arithmetic instruction into a copy, so a fixpoint comes early.
const MAX_ROUNDS: usize = 16;

/// Runs constant propagation, common-subexpression elimination and dead-code
/// elimination in that order, repeating the round until the program stops
/// changing. The input is left untouched.
pub fn optimize(program: &TacProgram) -> TacProgram {
    let mut current = program.clone();
    for round in 1..=MAX_ROUNDS {
        let next = single_round(&current);
        debug!(
            round,
            before = current.len(),
            after = next.len(),
            "tac optimization round"
        );
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn single_round(program: &TacProgram) -> TacProgram {
    dead_code_elimination(common_subexpressions(constant_propagation(program)))
}

fn fold(op: TacOp, left: f64, right: f64) -> Option<f64> {
    let value = match op {
        TacOp::Add => left + right,
        TacOp::Sub => left - right,
        TacOp::Mul => left * right,
        TacOp::Div if right == 0.0 => return None,
        TacOp::Div => left / right,
        TacOp::Assign | TacOp::Print | TacOp::Read => return None,
    };
    value.is_finite().then_some(value)
}

/// Replaces names bound to constants and folds numeric arithmetic whose
/// operands are both known. Print operands stay as written.
fn constant_propagation(program: &TacProgram) -> TacProgram {
    let mut constants: FxHashMap<String, Operand> = FxHashMap::default();
    let resolve = |constants: &FxHashMap<String, Operand>, operand: &Option<Operand>| {
        operand.as_ref().map(|operand| match operand {
            Operand::Name(name) => constants.get(name).cloned().unwrap_or_else(|| operand.clone()),
            constant => constant.clone(),
        })
    };

    let mut instructions = Vec::with_capacity(program.len());
    for instruction in program.iter() {
        let Some(result) = instruction.result.clone() else {
            instructions.push(instruction.clone());
            continue;
        };
        let arg1 = resolve(&constants, &instruction.arg1);
        let arg2 = resolve(&constants, &instruction.arg2);

        let folded = match (instruction.op, &arg1, &arg2) {
            (TacOp::Assign, Some(value), _) if value.is_constant() => Some(value.clone()),
            (op, Some(Operand::Number(left)), Some(Operand::Number(right))) => {
                fold(op, *left, *right).map(Operand::Number)
            }
            _ => None,
        };

        match folded {
            Some(value) => {
                constants.insert(result.clone(), value.clone());
                instructions.push(TacInstruction::assign(result, value));
            }
            None => {
                constants.remove(&result);
                instructions.push(TacInstruction {
                    op: instruction.op,
                    arg1,
                    arg2,
                    result: Some(result),
                });
            }
        }
    }
    TacProgram::new(instructions)
}

type ExpressionKey = (TacOp, String, String);

/// Rewrites a repeated arithmetic expression into a copy of the first result
/// while neither its operands nor that result have been reassigned.
fn common_subexpressions(program: TacProgram) -> TacProgram {
    let mut available: FxHashMap<ExpressionKey, String> = FxHashMap::default();
    let mut instructions = Vec::with_capacity(program.len());

    for instruction in program.instructions {
        let (Some(result), Some(arg1), Some(arg2)) =
            (&instruction.result, &instruction.arg1, &instruction.arg2)
        else {
            if let Some(result) = &instruction.result {
                invalidate(&mut available, result);
            }
            instructions.push(instruction);
            continue;
        };
        if !instruction.op.is_arithmetic() {
            invalidate(&mut available, result);
            instructions.push(instruction);
            continue;
        }

        let key = (instruction.op, arg1.to_string(), arg2.to_string());
        if let Some(previous) = available.get(&key).cloned() {
            if previous != *result {
                let result = result.clone();
                invalidate(&mut available, &result);
                instructions.push(TacInstruction::assign(result, Operand::Name(previous)));
            }
            continue;
        }

        invalidate(&mut available, result);
        let reads_result = [arg1, arg2]
            .into_iter()
            .any(|operand| operand.as_name() == Some(result.as_str()));
        if !reads_result {
            available.insert(key, result.clone());
        }
        instructions.push(instruction);
    }
    TacProgram::new(instructions)
}

fn invalidate(available: &mut FxHashMap<ExpressionKey, String>, name: &str) {
    available.retain(|(_, left, right), holder| {
        holder != name && left != name && right != name
    });
}

/// Single backward scan keeping prints, reads and every instruction whose
/// result is used later on.
fn dead_code_elimination(program: TacProgram) -> TacProgram {
    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut kept = Vec::with_capacity(program.len());

    for instruction in program.instructions.into_iter().rev() {
        let live = match &instruction.result {
            _ if instruction.op.has_effect() => true,
            Some(result) => used.contains(result),
            None => false,
        };
        if live {
            used.extend(instruction.operand_names().map(str::to_string));
            kept.push(instruction);
        }
    }
    kept.reverse();
    TacProgram::new(kept)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::parser::parse_source;
    use crate::tac::generate;

    fn name(name: &str) -> Operand {
        Operand::Name(name.to_string())
    }

    fn optimized(source: &str) -> TacProgram {
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        optimize(&generate(&parsed.statements).unwrap())
    }

    #[test]
    fn folds_declarations_into_the_printed_value() {
        let source = indoc! {"
            VAR a = 2 : INTEIRO.
            VAR b = a + 3 : INTEIRO.
            EXIBIR(b).
        "};
        assert_eq!(optimized(source).to_string(), "b = 5\nprint b\n");
    }

    #[test]
    fn optimizing_twice_changes_nothing() {
        let source = indoc! {"
            VAR x = 4 : INTEIRO.
            VAR z = x * y + x * y : INTEIRO.
            x++.
            EXIBIR(z, x / 0).
        "};
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let once = optimize(&generate(&parsed.statements).unwrap());
        assert_eq!(optimize(&once), once);
    }

    #[test]
    fn keeps_everything_feeding_a_print() {
        let program = TacProgram::new(vec![
            TacInstruction::binary(TacOp::Mul, "t1", name("a"), name("b")),
            TacInstruction::binary(TacOp::Add, "t2", name("t1"), name("c")),
            TacInstruction::binary(TacOp::Sub, "unused", name("a"), name("c")),
            TacInstruction::print(name("t2")),
        ]);
        assert_eq!(
            optimize(&program).to_string(),
            indoc! {"
                t1 = a * b
                t2 = t1 + c
                print t2
            "}
        );
    }

    #[test]
    fn reuses_common_subexpressions() {
        let program = TacProgram::new(vec![
            TacInstruction::binary(TacOp::Mul, "t1", name("a"), name("b")),
            TacInstruction::binary(TacOp::Mul, "t2", name("a"), name("b")),
            TacInstruction::binary(TacOp::Add, "t3", name("t1"), name("t2")),
            TacInstruction::print(name("t3")),
        ]);
        assert_eq!(
            optimize(&program).to_string(),
            indoc! {"
                t1 = a * b
                t2 = t1
                t3 = t1 + t2
                print t3
            "}
        );
    }

    #[test]
    fn reassigned_operands_invalidate_subexpressions() {
        let program = TacProgram::new(vec![
            TacInstruction::binary(TacOp::Mul, "t1", name("a"), name("b")),
            TacInstruction::print(name("t1")),
            TacInstruction::assign("a", name("c")),
            TacInstruction::binary(TacOp::Mul, "t2", name("a"), name("b")),
            TacInstruction::print(name("t2")),
        ]);
        assert_eq!(optimize(&program), program);
    }

    #[test]
    fn dead_store_removal_exposes_a_later_subexpression() {
        // `r = 7` hides `a * b` from CSE until DCE drops it.
        let program = TacProgram::new(vec![
            TacInstruction::binary(TacOp::Mul, "r", name("a"), name("b")),
            TacInstruction::print(name("r")),
            TacInstruction::assign("r", Operand::Number(7.0)),
            TacInstruction::binary(TacOp::Mul, "s", name("a"), name("b")),
            TacInstruction::print(name("s")),
        ]);
        let once = single_round(&program);
        assert_eq!(
            once.to_string(),
            indoc! {"
                r = a * b
                print r
                s = a * b
                print s
            "}
        );
        assert_ne!(single_round(&once), once);

        let optimized = optimize(&program);
        assert_eq!(
            optimized.to_string(),
            indoc! {"
                r = a * b
                print r
                s = r
                print s
            "}
        );
        assert_eq!(optimize(&optimized), optimized);
    }

    #[test]
    fn division_by_zero_is_not_folded() {
        let optimized = optimized("EXIBIR(1 / 0).");
        assert_eq!(optimized.to_string(), "t3 = 1 / 0\nprint t3\n");
    }
}
