use indoc::indoc;

use super::*;
use crate::ast::DeclaredType;
use crate::parser::parse_source;

fn run_with<I: InputSource>(
    source: &str,
    config: InterpreterConfig,
    input: I,
) -> (Vec<String>, String, Result<(), RuntimeError>) {
    let parsed = parse_source(source);
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    let mut interpreter = Interpreter::with_config(config, Vec::new(), input);
    let result = interpreter.execute(&parsed.statements);
    let html = interpreter.html_output().to_string();
    (interpreter.into_output(), html, result)
}

fn run(source: &str) -> (Vec<String>, Result<(), RuntimeError>) {
    let (output, _, result) = run_with(source, InterpreterConfig::default(), NoInput);
    (output, result)
}

fn run_ok(source: &str) -> Vec<String> {
    let (output, result) = run(source);
    if let Err(error) = result {
        panic!("unexpected runtime error: {error}");
    }
    output
}

fn run_err(source: &str) -> (Vec<String>, RuntimeErrorKind) {
    let (output, result) = run(source);
    let error = result.expect_err("expected a runtime error");
    (output, error.kind)
}

#[test]
fn prints_declared_integer() {
    assert_eq!(run_ok("VAR x = 5 : INTEIRO.\nEXIBIR(x)."), ["5"]);
}

#[test]
fn takes_the_matching_branch() {
    let source = indoc! {r#"
        VAR a = 10 : INTEIRO.
        VAR b = 3 : INTEIRO.
        SE (a > b) {
            EXIBIR("maior").
        } SENAO {
            EXIBIR("menor").
        }
    "#};
    assert_eq!(run_ok(source), ["maior"]);
}

#[test]
fn division_by_zero_is_fatal() {
    let source = indoc! {"
        VAR x = 10 : INTEIRO.
        VAR y = 0 : INTEIRO.
        y = x / y.
        EXIBIR(y).
    "};
    let (output, kind) = run_err(source);
    assert_eq!(kind, RuntimeErrorKind::DivisionByZero);
    assert!(output.is_empty());
}

#[test]
fn for_loop_counts_and_continue_runs_update() {
    let source = indoc! {"
        PARA (VAR i = 0 : INTEIRO; i < 3; i++) {
            EXIBIR(i).
        }
        PARA (VAR i = 0 : INTEIRO; i < 5; i++) {
            SE (i == 2) {
                CONTINUAR.
            }
            EXIBIR(i).
        }
    "};
    assert_eq!(run_ok(source), ["0", "1", "2", "0", "1", "3", "4"]);
}

#[test]
fn while_and_do_while_loops() {
    let source = indoc! {"
        VAR n = 0 : INTEIRO.
        ENQUANTO (VERDADEIRO) {
            n += 2.
            SE (n >= 6) {
                PARAR.
            }
        }
        EXIBIR(n).
        FACA {
            EXIBIR(\"uma vez\").
        } ENQUANTO (FALSO).
    "};
    assert_eq!(run_ok(source), ["6", "uma vez"]);
}

#[test]
fn switch_falls_through_until_break() {
    let source = indoc! {r#"
        VAR d = 2 : INTEIRO.
        ESCOLHA (d) {
            CASO 1:
                EXIBIR("um").
            CASO 2:
                EXIBIR("dois").
            CASO 3:
                EXIBIR("tres").
                PARAR.
            PADRAO:
                EXIBIR("outro").
        }
        ESCOLHA (d) {
            CASO 7:
                EXIBIR("sete").
            CASO d > 5:
                EXIBIR("grande").
            PADRAO:
                EXIBIR("padrao").
        }
    "#};
    assert_eq!(run_ok(source), ["dois", "tres", "padrao"]);
}

#[test]
fn break_in_switch_stays_in_the_loop_and_continue_leaves_both() {
    let source = indoc! {r#"
        VAR i = 0 : INTEIRO.
        ENQUANTO (i < 4) {
            i++.
            ESCOLHA (i) {
                CASO 2:
                    PARAR.
                CASO 3:
                    CONTINUAR.
                PADRAO:
                    EXIBIR("padrao", i).
            }
            EXIBIR("fim", i).
        }
    "#};
    assert_eq!(
        run_ok(source),
        ["padrao 1", "fim 1", "fim 2", "padrao 4", "fim 4"]
    );
}

#[test]
fn continue_retests_the_loop_condition() {
    let while_loop = indoc! {r#"
        VAR i = 0 : INTEIRO.
        ENQUANTO (i < 3) {
            i++.
            SE (i == 3) {
                CONTINUAR.
            }
            EXIBIR(i).
        }
        EXIBIR("fim", i).
    "#};
    assert_eq!(run_ok(while_loop), ["1", "2", "fim 3"]);

    let do_while = indoc! {r#"
        VAR j = 0 : INTEIRO.
        FACA {
            j++.
            SE (j == 3) {
                CONTINUAR.
            }
            EXIBIR(j).
        } ENQUANTO (j < 3).
        EXIBIR("fim", j).
    "#};
    assert_eq!(run_ok(do_while), ["1", "2", "fim 3"]);
}

#[test]
fn recursive_function_returns_value() {
    let source = indoc! {"
        FUNCAO fatorial(n : INTEIRO) : INTEIRO {
            SE (n <= 1) {
                RETORNAR 1.
            }
            RETORNAR n * fatorial(n - 1).
        }
        EXIBIR(fatorial(5)).
    "};
    assert_eq!(run_ok(source), ["120"]);
}

#[test]
fn functions_see_globals_but_not_caller_blocks() {
    let visible = indoc! {"
        VAR g = 1 : INTEIRO.
        FUNCAO ver() {
            EXIBIR(g).
        }
        SE (VERDADEIRO) {
            VAR local = 2 : INTEIRO.
            ver().
        }
    "};
    assert_eq!(run_ok(visible), ["1"]);

    let hidden = indoc! {"
        FUNCAO ver() {
            EXIBIR(local).
        }
        SE (VERDADEIRO) {
            VAR local = 2 : INTEIRO.
            ver().
        }
    "};
    assert_eq!(
        run_err(hidden).1,
        RuntimeErrorKind::OutOfScope {
            name: "local".to_string()
        }
    );
}

#[test]
fn distinguishes_undefined_from_out_of_scope() {
    assert_eq!(
        run_err("EXIBIR(nada).").1,
        RuntimeErrorKind::UndefinedVariable {
            name: "nada".to_string()
        }
    );
    let source = indoc! {"
        SE (VERDADEIRO) {
            VAR t = 1 : INTEIRO.
        }
        EXIBIR(t).
    "};
    assert_eq!(
        run_err(source).1,
        RuntimeErrorKind::OutOfScope {
            name: "t".to_string()
        }
    );
}

#[test]
fn rejects_redeclaration_in_the_same_scope() {
    let source = indoc! {"
        VAR x = 1 : INTEIRO.
        SE (VERDADEIRO) {
            VAR x = 2 : INTEIRO.
            EXIBIR(x).
        }
        VAR x = 3 : INTEIRO.
    "};
    let (output, kind) = run_err(source);
    assert_eq!(output, ["2"]);
    assert_eq!(
        kind,
        RuntimeErrorKind::Redeclaration {
            name: "x".to_string()
        }
    );
}

#[test]
fn assignments_keep_the_declared_type() {
    let source = indoc! {r#"
        VAR t = "a" : TEXTO.
        VAR n : INTEIRO.
        n = t.
    "#};
    assert!(matches!(
        run_err(source).1,
        RuntimeErrorKind::TypeMismatch {
            expected: DeclaredType::Integer,
            ..
        }
    ));

    let natural = "VAR n = 0 : NATURAL.\nn--.";
    assert!(matches!(
        run_err(natural).1,
        RuntimeErrorKind::TypeMismatch {
            expected: DeclaredType::Natural,
            ..
        }
    ));

    let text_update = "VAR t = \"a\" : TEXTO.\nt++.";
    assert!(matches!(
        run_err(text_update).1,
        RuntimeErrorKind::NotUpdatable { .. }
    ));
}

#[test]
fn declarations_from_names_are_type_checked_when_run() {
    let source = indoc! {r#"
        VAR a = 5 : INTEIRO.
        EXIBIR("antes").
        VAR s = a : TEXTO.
    "#};
    let (output, kind) = run_err(source);
    assert_eq!(output, ["antes"]);
    assert!(matches!(
        kind,
        RuntimeErrorKind::TypeMismatch {
            expected: DeclaredType::Text,
            ..
        }
    ));
}

#[test]
fn loop_limit_is_configurable() {
    let config = InterpreterConfig {
        loop_limit: 5,
        ..InterpreterConfig::default()
    };
    let (_, _, result) = run_with("ENQUANTO (VERDADEIRO) { }", config.clone(), NoInput);
    assert_eq!(
        result.map_err(|error| error.kind),
        Err(RuntimeErrorKind::LoopLimitExceeded { limit: 5 })
    );

    let (output, _, result) = run_with(
        "PARA (VAR i = 0 : INTEIRO; i < 5; i++) { EXIBIR(i). }",
        config,
        NoInput,
    );
    assert!(result.is_ok());
    assert_eq!(output.len(), 5);
}

#[test]
fn runaway_recursion_hits_call_depth_limit() {
    let config = InterpreterConfig {
        max_call_depth: 10,
        ..InterpreterConfig::default()
    };
    let source = indoc! {"
        FUNCAO f(n : INTEIRO) {
            f(n + 1).
        }
        f(0).
    "};
    let (_, _, result) = run_with(source, config, NoInput);
    assert_eq!(
        result.map_err(|error| error.kind),
        Err(RuntimeErrorKind::CallDepthExceeded { limit: 10 })
    );
}

#[test]
fn formats_printed_values() {
    let source = "EXIBIR(5 / 2, VERDADEIRO, [1, 2], \"a\" + \"b\").";
    assert_eq!(run_ok(source), ["2,5 VERDADEIRO [1, 2] ab"]);
}

#[test]
fn logical_operators_short_circuit_and_require_booleans() {
    assert_eq!(
        run_ok("EXIBIR(FALSO && (1 / 0 == 1), VERDADEIRO || (1 / 0 == 1))."),
        ["FALSO VERDADEIRO"]
    );
    assert!(matches!(
        run_err("EXIBIR(1 && VERDADEIRO).").1,
        RuntimeErrorKind::InvalidOperand { operation: "&&", .. }
    ));
}

#[test]
fn operators_check_operand_kinds() {
    assert_eq!(run_ok("EXIBIR(1 == \"1\", [1] + [2])."), ["FALSO [1, 2]"]);
    assert_eq!(
        run_err("EXIBIR(1 + \"a\").").1,
        RuntimeErrorKind::UnsupportedOperation {
            operation: "+",
            left: "um número",
            right: "um texto",
        }
    );
}

#[test]
fn indexes_lists() {
    let source = indoc! {"
        VAR l = [10, 20] : LISTA.
        EXIBIR(l[1]).
        EXIBIR(l[5]).
    "};
    let (output, kind) = run_err(source);
    assert_eq!(output, ["20"]);
    assert!(matches!(
        kind,
        RuntimeErrorKind::IndexOutOfBounds { len: 2, .. }
    ));
}

#[test]
fn reads_and_converts_input() {
    let source = indoc! {r#"
        VAR nome : TEXTO.
        VAR nota : REAL.
        LER("Nome:", nome).
        LER(nota).
        EXIBIR(nome, nota * 2).
    "#};
    let input = ScriptedInput::new(["Ana", "2,5"]);
    let (output, _, result) = run_with(source, InterpreterConfig::default(), input);
    assert!(result.is_ok());
    assert_eq!(output, ["Ana 5"]);

    let (_, _, result) = run_with(
        "VAR n : INTEIRO.\nLER(n).",
        InterpreterConfig::default(),
        ScriptedInput::new(["abc"]),
    );
    assert!(matches!(
        result.map_err(|error| error.kind),
        Err(RuntimeErrorKind::InvalidInput { .. })
    ));
}

#[test]
fn calculator_builtins() {
    assert_eq!(
        run_ok("EXIBIR(RAIZ(16), RAIZ(27, 3), RAIZ(-8, 3), POTENCIA(2, 10))."),
        ["4 3 -2 1024"]
    );
    assert!(matches!(
        run_err("EXIBIR(RAIZ(-4)).").1,
        RuntimeErrorKind::InvalidCalculation { operation: "RAIZ", .. }
    ));
}

#[test]
fn checks_function_results() {
    let missing = indoc! {"
        FUNCAO f() : INTEIRO {
        }
        EXIBIR(f()).
    "};
    assert!(matches!(
        run_err(missing).1,
        RuntimeErrorKind::MissingReturnValue { .. }
    ));

    let void = indoc! {"
        FUNCAO nada() {
        }
        EXIBIR(nada()).
    "};
    assert_eq!(
        run_err(void).1,
        RuntimeErrorKind::VoidValue {
            name: "nada".to_string()
        }
    );

    let mismatch = indoc! {r#"
        FUNCAO f() : INTEIRO {
            RETORNAR "x".
        }
        EXIBIR(f()).
    "#};
    assert!(matches!(
        run_err(mismatch).1,
        RuntimeErrorKind::ReturnTypeMismatch { .. }
    ));
}

#[test]
fn renders_web_elements_to_html() {
    let source = indoc! {r#"
        VAR nome = "Ana & Bia" : TEXTO.
        <titulo classe="topo">"Olá, " {nome}</titulo>
        <caixa propriedades={ cor: "azul", largura: 100 }/>.
        <imagem fonte="foto.png" descricao="Foto"/>
    "#};
    let (output, html, result) = run_with(source, InterpreterConfig::default(), NoInput);
    assert!(result.is_ok());
    assert!(output.is_empty());
    assert_eq!(
        html,
        concat!(
            "<h1 class=\"topo\">Olá, Ana &amp; Bia</h1>\n",
            "<div style=\"color: blue; width: 100px\"></div>\n",
            "<img src=\"foto.png\" alt=\"Foto\">\n",
        )
    );
}

#[test]
fn each_execution_starts_from_fresh_globals() {
    let parsed = parse_source("VAR x = 1 : INTEIRO.\nEXIBIR(x).");
    let mut interpreter = Interpreter::new(Vec::new(), NoInput);
    assert!(interpreter.execute(&parsed.statements).is_ok());
    assert!(interpreter.execute(&parsed.statements).is_ok());
    assert_eq!(interpreter.output(), &["1", "1"]);
}
