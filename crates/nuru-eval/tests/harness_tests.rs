//! Test harness tests: discovery, hoisting, pass/fail rules, output capture
//! and the summary report.

use nuru_eval::{
    collect_tests, is_test_name, run_program_tests, run_tests, EvalConfig, Evaluator, EventLog,
    Environment, TestRunSummary,
};
use nuru_parser::parse_source;
use nuru_types::ast::Program;
use nuru_types::SourceFile;
use pretty_assertions::assert_eq;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn run(source: &str) -> TestRunSummary {
    run_tests(source, "majaribio.nr", EvalConfig::default())
}

fn parse(source: &str) -> Program {
    let sf = SourceFile::new("majaribio.nr", source);
    parse_source(&sf)
        .into_program()
        .expect("source should parse")
}

fn names(summary: &TestRunSummary) -> Vec<&str> {
    summary.results.iter().map(|r| r.name.as_str()).collect()
}

fn error_of<'a>(summary: &'a TestRunSummary, name: &str) -> Option<&'a str> {
    summary
        .results
        .iter()
        .find(|r| r.name == name)
        .and_then(|r| r.error.as_deref())
}

// ─────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_is_test_name() {
    assert!(is_test_name("pima_jumla"));
    assert!(is_test_name("pima_"));
    assert!(!is_test_name("pimajumla"));
    assert!(!is_test_name("Pima_jumla"));
    assert!(!is_test_name("jumla"));
}

#[test]
fn test_collect_tests_in_source_order() {
    let program = parse(
        r#"
        kazi pima_b() {}
        kazi msaidizi() {}
        fanya pima_a = unda() {}
        fanya thamani = 3
        "#,
    );
    assert_eq!(collect_tests(&program), vec!["pima_b", "pima_a"]);
}

#[test]
fn test_no_tests_found() {
    let summary = run("fanya x = 1");
    assert_eq!(summary.total(), 0);
    assert!(summary.success());
    assert_eq!(summary.to_string(), "Hakuna majaribio yaliyopatikana\n");
}

#[test]
fn test_empty_file() {
    let summary = run("");
    assert_eq!(summary.total(), 0);
    assert!(summary.success());
}

// ─────────────────────────────────────────────────────────────────────
// Pass / fail
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_passing_test() {
    let summary = run("kazi pima_jumla() { hakiki(2 + 2 == 4) }");
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.success());
    assert!(summary.results[0].passed);
    assert_eq!(summary.results[0].error, None);
}

#[test]
fn test_failing_test_keeps_message() {
    let summary = run(r#"kazi pima_kosa() { hakiki(1 == 2, "hesabu mbaya") }"#);
    assert_eq!(summary.failed, 1);
    assert!(!summary.success());
    assert_eq!(error_of(&summary, "pima_kosa"), Some("hesabu mbaya"));
}

#[test]
fn test_default_failure_message() {
    let summary = run("kazi pima_kosa() { hakiki(sikweli) }");
    assert_eq!(error_of(&summary, "pima_kosa"), Some("Test"));
}

#[test]
fn test_last_failing_message_wins() {
    let summary = run(
        r#"
        kazi pima_mengi() {
            hakiki(sikweli, "kwanza")
            hakiki(kweli, "katikati")
            hakiki(sikweli, "mwisho")
        }
        "#,
    );
    assert_eq!(error_of(&summary, "pima_mengi"), Some("mwisho"));
}

#[test]
fn test_failed_assertion_does_not_stop_test() {
    let summary = run(
        r#"
        kazi pima_endelea() {
            hakiki(sikweli, "imeshindwa")
            andika("bado inaendelea")
        }
        "#,
    );
    let result = &summary.results[0];
    assert!(!result.passed);
    assert_eq!(result.output, vec!["bado inaendelea".to_string()]);
}

#[test]
fn test_runtime_error_fails_test() {
    let summary = run("kazi pima_hitilafu() { haipo }");
    assert_eq!(
        error_of(&summary, "pima_hitilafu"),
        Some("identifier not found: haipo")
    );
}

#[test]
fn test_assertion_failure_takes_precedence_over_call_error() {
    let summary = run(r#"kazi pima_zote() { hakiki(sikweli, "dai"); 1 / 0 }"#);
    assert_eq!(error_of(&summary, "pima_zote"), Some("dai"));
}

#[test]
fn test_infinite_loop_in_test() {
    let summary = run_tests(
        "kazi pima_milele() { wakati (kweli) {} }",
        "majaribio.nr",
        EvalConfig {
            max_iterations: 100,
            ..EvalConfig::default()
        },
    );
    assert_eq!(error_of(&summary, "pima_milele"), Some("infinite loop detected"));
}

#[test]
fn test_runaway_recursion_fails_only_its_test() {
    let summary = run(
        r#"
        kazi pima_bila_mwisho() { rudisha pima_bila_mwisho() }
        kazi pima_sawa() { hakiki(kweli) }
        "#,
    );
    assert_eq!(summary.total(), 2);
    assert_eq!(
        error_of(&summary, "pima_bila_mwisho"),
        Some("maximum recursion depth exceeded")
    );
    assert!(summary.results[1].passed);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_recursion_limit_is_configurable() {
    let source = r#"
        kazi kina(n) { kama (n == 0) { rudisha 0 } rudisha kina(n - 1) }
        kazi pima_kina() { hakiki(kina(20) == 0, "kina") }
    "#;
    let shallow = run_tests(
        source,
        "majaribio.nr",
        EvalConfig {
            max_call_depth: 10,
            ..EvalConfig::default()
        },
    );
    assert_eq!(
        error_of(&shallow, "pima_kina"),
        Some("maximum recursion depth exceeded")
    );
    assert!(run(source).success());
}

#[test]
fn test_non_callable_test_binding_fails() {
    let summary = run("fanya pima_nambari = 5");
    assert_eq!(summary.total(), 1);
    assert_eq!(error_of(&summary, "pima_nambari"), Some("not a function: NAMBA"));
}

#[test]
fn test_let_bound_tests_run() {
    let summary = run(
        r#"
        fanya pima_b = unda() { hakiki(kweli) }
        kazi pima_a() { hakiki(sikweli, "a") }
        "#,
    );
    assert_eq!(names(&summary), vec!["pima_b", "pima_a"]);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_tests_are_isolated_from_each_other_failures() {
    let summary = run(
        r#"
        kazi pima_kwanza() { hakiki(sikweli, "kwanza") }
        kazi pima_pili() { hakiki(kweli) }
        "#,
    );
    assert_eq!(error_of(&summary, "pima_kwanza"), Some("kwanza"));
    assert!(summary.results[1].passed);
}

// ─────────────────────────────────────────────────────────────────────
// Hoisting & top-level code
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_top_level_code_sees_later_declarations() {
    let summary = run(
        r#"
        fanya matokeo = baadaye()
        kazi baadaye() { 7 }
        kazi pima_matokeo() { hakiki(matokeo == 7, "haikupandishwa") }
        "#,
    );
    assert!(summary.success(), "{summary}");
}

#[test]
fn test_top_level_error_still_runs_tests() {
    let summary = run(
        r#"
        kazi pima_kabla() { hakiki(kweli) }
        haipo
        kazi pima_baada() { hakiki(kweli) }
        "#,
    );
    assert_eq!(names(&summary), vec!["pima_kabla", "pima_baada"]);
    assert!(summary.success());
}

#[test]
fn test_top_level_assertions_do_not_fail_tests() {
    let summary = run(
        r#"
        hakiki(sikweli, "juu")
        kazi pima_safi() { hakiki(kweli) }
        "#,
    );
    assert!(summary.success());
}

#[test]
fn test_output_is_split_between_top_level_and_tests() {
    let summary = run(
        r#"
        andika("juu")
        kazi pima_a() { andika("ndani ya a") }
        kazi pima_b() { andika("ndani ya b") }
        "#,
    );
    assert_eq!(summary.output, vec!["juu".to_string()]);
    assert_eq!(summary.results[0].output, vec!["ndani ya a".to_string()]);
    assert_eq!(summary.results[1].output, vec!["ndani ya b".to_string()]);
}

// ─────────────────────────────────────────────────────────────────────
// Syntax errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_syntax_errors_run_nothing() {
    let summary = run("kazi pima_a() { hakiki(kweli");
    assert_eq!(summary.total(), 0);
    assert!(!summary.success());
    assert!(summary.syntax_errors.has_errors());
    assert!(summary.to_string().starts_with("Kuna Makosa Yafuatayo:\n\t"));
}

// ─────────────────────────────────────────────────────────────────────
// Evaluator state
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_runs_are_repeatable() {
    let source = r#"
        fanya hesabu = 0
        kazi pima_ongeza() { hesabu = hesabu + 1; hakiki(hesabu == 1, "hali imevuja") }
        kazi pima_kosa() { hakiki(sikweli, "daima") }
    "#;
    let first = run(source);
    let second = run(source);
    assert_eq!(first.passed, second.passed);
    assert_eq!(first.failed, second.failed);
    assert_eq!(names(&first), names(&second));
    assert_eq!(error_of(&second, "pima_ongeza"), None);
}

#[test]
fn test_previous_reporter_is_restored() {
    let outer = EventLog::new();
    let mut evaluator = Evaluator::default();
    evaluator.attach_reporter(Rc::new(outer.clone()));
    let env = Environment::new();

    let program = parse(r#"kazi pima_a() { hakiki(sikweli, "ndani") }"#);
    let results = run_program_tests(&mut evaluator, &program, &env);
    assert_eq!(results[0].error.as_deref(), Some("ndani"));
    assert!(outer.events().is_empty());

    evaluator.eval_program(&parse(r#"hakiki(sikweli, "nje")"#), &env);
    assert_eq!(outer.last_failure(), Some("nje".to_string()));
}

#[test]
fn test_run_without_prior_reporter_leaves_none() {
    let mut evaluator = Evaluator::default();
    let env = Environment::new();
    run_program_tests(&mut evaluator, &parse("kazi pima_a() {}"), &env);
    assert!(!evaluator.has_reporter());
}

// ─────────────────────────────────────────────────────────────────────
// Reporting
// ─────────────────────────────────────────────────────────────────────

const MIXED: &str = r#"
    kazi pima_jumla() { hakiki(1 + 1 == 2) }
    kazi pima_kosa() { hakiki(sikweli, "hesabu mbaya") }
"#;

#[test]
fn test_summary_display() {
    let report = run(MIXED).to_string();
    assert!(report.contains("JARIBIO LIMEANZA"));
    assert!(report.contains("imekusanya vipengele 2"));
    assert!(report.contains("pima_jumla"));
    assert!(report.contains("IMEPITA"));
    assert!(report.contains("IMEFELI"));
    assert!(report.contains("MAJARIBIO YALIYOSHINDWA"));
    assert!(report.contains("_________________________ pima_kosa _________________________"));
    assert!(report.contains(">   hesabu mbaya"));
    assert!(report.contains("1 imeshindwa, 1 imefaulu, kwa muda wa"));
}

#[test]
fn test_all_passed_display_has_no_failure_section() {
    let report = run("kazi pima_a() { hakiki(kweli) }").to_string();
    assert!(!report.contains("MAJARIBIO YALIYOSHINDWA"));
    assert!(!report.contains("imeshindwa"));
    assert!(report.contains("1 imefaulu"));
}

#[test]
fn test_summary_json() {
    let summary = run(MIXED);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["file"], "majaribio.nr");
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][0]["name"], "pima_jumla");
    assert_eq!(json["results"][1]["error"], "hesabu mbaya");
    assert!(json["results"][0].get("error").is_none());
    assert!(json.get("syntax_errors").is_none());
}
