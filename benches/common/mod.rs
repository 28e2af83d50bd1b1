#![allow(dead_code)]
use std::path::Path;

use seteao::ast::Statement;
use seteao::parser;

pub struct Workload {
    pub label: String,
    pub source: String,
    pub input: Vec<String>,
}

/// Fixture programs whose `case.yaml` enables benchmarking under `tag`.
pub fn workloads(tag: &str) -> Vec<Workload> {
    test_support::bench_cases(Path::new("tests/programs"), tag)
        .unwrap_or_else(|err| panic!("load bench cases: {err:#}"))
        .into_iter()
        .map(|case| Workload {
            label: case.name.clone(),
            source: case
                .source()
                .unwrap_or_else(|err| panic!("read {}: {err:#}", case.name)),
            input: case.spec.input.clone(),
        })
        .collect()
}

pub fn load_program(workload: &Workload) -> Vec<Statement> {
    let parsed = parser::parse_source(&workload.source);
    assert!(
        !parsed.has_errors(),
        "parse {}: {:?}",
        workload.label,
        parsed.errors
    );
    parsed.statements
}
