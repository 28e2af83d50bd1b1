mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use seteao::interpreter::{Interpreter, ScriptedInput};

fn bench_interpreter(c: &mut Criterion) {
    for workload in common::workloads("interpreter") {
        let program = common::load_program(&workload);

        c.bench_function(&format!("interpreter_execute_{}", workload.label), |b| {
            b.iter(|| {
                let mut interpreter = Interpreter::new(
                    Vec::<String>::new(),
                    ScriptedInput::new(workload.input.iter().cloned()),
                );
                interpreter
                    .execute(black_box(&program))
                    .expect("execute");
                black_box(interpreter.into_output());
            })
        });
    }
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);
