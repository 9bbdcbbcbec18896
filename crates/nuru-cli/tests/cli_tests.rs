//! Tests for the file runner and the interactive session.

use nuru_cli::{read_source, run_source, CliError, LineOutcome, Session};
use nuru_eval::{EvalConfig, RuntimeError, Value};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nuru-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn evaluated(outcome: LineOutcome) -> (Vec<String>, Option<Value>) {
    match outcome {
        LineOutcome::Evaluated { output, value } => (output, value),
        other => panic!("expected an evaluated line, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Reading files
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_read_valid_file() {
    let path = temp_file("salamu.nr", "andika(\"habari\")");
    assert_eq!(read_source(&path).unwrap(), "andika(\"habari\")");
}

#[test]
fn test_read_rejects_extension() {
    let path = temp_file("salamu.txt", "andika(1)");
    let err = read_source(&path).unwrap_err();
    assert!(matches!(err, CliError::InvalidExtension(_)));
    assert!(err.to_string().ends_with("sii faili sahihi. Tumia faili la '.nr' au '.sw'"));
}

#[test]
fn test_read_missing_file() {
    let path = std::env::temp_dir().join("nuru-cli-haipo").join("haipo.sw");
    let err = read_source(&path).unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().starts_with("Nuru imeshindwa kusoma faili: "));
}

// ─────────────────────────────────────────────────────────────────────
// Running programs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_run_collects_output() {
    let report = run_source(
        "fanya jina = \"Nuru\"; andika(\"habari\", jina)",
        "salamu.nr",
        EvalConfig::default(),
    )
    .unwrap();
    assert!(report.success());
    assert_eq!(report.output, vec!["habari Nuru".to_string()]);
}

#[test]
fn test_run_keeps_output_before_error() {
    let report = run_source("andika(1); 1 / 0; andika(2)", "kosa.nr", EvalConfig::default()).unwrap();
    assert_eq!(report.output, vec!["1".to_string()]);
    assert_eq!(report.error, Some(RuntimeError::DivisionByZero));
}

#[test]
fn test_run_honours_iteration_ceiling() {
    let report = run_source(
        "wakati (kweli) {}",
        "milele.nr",
        EvalConfig {
            max_iterations: 10,
            ..EvalConfig::default()
        },
    )
    .unwrap();
    assert_eq!(report.error, Some(RuntimeError::InfiniteLoop));
}

#[test]
fn test_run_syntax_error() {
    let err = run_source("fanya = 1", "mbaya.nr", EvalConfig::default()).unwrap_err();
    let CliError::Syntax(errors) = &err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert!(errors.has_errors());
    assert!(err.to_string().starts_with("Kuna Makosa Yafuatayo:\n\t"));
}

// ─────────────────────────────────────────────────────────────────────
// Interactive session
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_session_keeps_bindings() {
    let mut session = Session::new(EvalConfig::default());
    let (output, value) = evaluated(session.eval_line("fanya x = 20"));
    assert!(output.is_empty());
    assert_eq!(value, None);

    let (_, value) = evaluated(session.eval_line("x + 22"));
    assert_eq!(value, Some(Value::Number(42.0)));
    assert_eq!(session.env().borrow().get("x"), Some(Value::Number(20.0)));
}

#[test]
fn test_session_keeps_functions() {
    let mut session = Session::new(EvalConfig::default());
    session.eval_line("kazi mraba(n) {\n  n * n\n}");
    let (_, value) = evaluated(session.eval_line("mraba(7)"));
    assert_eq!(value, Some(Value::Number(49.0)));
}

#[test]
fn test_session_continues_after_errors() {
    let mut session = Session::new(EvalConfig::default());

    let (_, value) = evaluated(session.eval_line("haipo"));
    assert_eq!(
        value.map(|v| v.to_string()),
        Some("identifier not found: haipo".to_string())
    );

    assert!(matches!(session.eval_line("fanya = 1"), LineOutcome::Syntax(_)));

    let (output, _) = evaluated(session.eval_line("andika(\"bado\")"));
    assert_eq!(output, vec!["bado".to_string()]);
}

#[test]
fn test_session_reports_failed_assertion() {
    let mut session = Session::new(EvalConfig::default());
    let (_, value) = evaluated(session.eval_line("hakiki(sikweli, \"si sawa\")"));
    assert_eq!(value.map(|v| v.to_string()), Some("si sawa".to_string()));
}
