mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use seteao::{lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for workload in common::workloads("frontend") {
        let source = workload.source.as_str();

        c.bench_function(&format!("frontend_tokenize_{}", workload.label), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(source));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_tokenize_parse_{}", workload.label), |b| {
            b.iter(|| {
                let out = parser::parse_source(black_box(source));
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
