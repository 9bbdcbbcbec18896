//! Nuru test runner: discovers and runs `pima_` functions.
//!
//! A test is any top-level function bound to a name starting with `pima_`,
//! either declared with `kazi` or bound with `fanya`. Each test is called
//! with no arguments while an [`EventLog`] is attached to the evaluator;
//! the test fails if any `hakiki` inside it failed (the last failing
//! message is kept) or if the call itself produced an error.

use crate::env::{Env, Environment};
use crate::evaluator::{EvalConfig, Evaluator};
use crate::module::EventLog;
use crate::value::Value;
use nuru_parser::parse_source;
use nuru_types::ast::{Expr, Program, Stmt};
use nuru_types::{SourceFile, SyntaxErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Name prefix that marks a test function.
pub const TEST_PREFIX: &str = "pima_";

pub fn is_test_name(name: &str) -> bool {
    name.starts_with(TEST_PREFIX)
}

/// Result of running a single test function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Failure message if the test failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Lines printed with `andika` while the test ran.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub output: Vec<String>,
    pub duration: Duration,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "IMEPITA" } else { "IMEFELI" };
        write!(f, "{:<30}  {status}", self.name)
    }
}

/// Summary of one harness run over a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunSummary {
    pub file: String,
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
    /// Syntax errors that stopped the run before any test executed.
    #[serde(skip_serializing_if = "SyntaxErrors::is_empty", default)]
    pub syntax_errors: SyntaxErrors,
    /// Lines printed with `andika` by top-level code.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub output: Vec<String>,
}

impl TestRunSummary {
    fn new(file: &str, results: Vec<TestResult>, output: Vec<String>, duration: Duration) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = results.len() - passed;
        Self {
            file: file.to_string(),
            results,
            passed,
            failed,
            duration,
            syntax_errors: SyntaxErrors::empty(),
            output,
        }
    }

    fn syntax_failure(file: &str, errors: SyntaxErrors, duration: Duration) -> Self {
        Self {
            syntax_errors: errors,
            ..Self::new(file, Vec::new(), Vec::new(), duration)
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// A run succeeds when it parsed and no test failed. A file with no
    /// tests succeeds.
    pub fn success(&self) -> bool {
        !self.syntax_errors.has_errors() && self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

const HEADER_START: &str =
    "============================= JARIBIO LIMEANZA =============================";
const HEADER_FAILURES: &str =
    "========================= MAJARIBIO YALIYOSHINDWA ==========================";

impl fmt::Display for TestRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.syntax_errors.has_errors() {
            writeln!(f, "Kuna Makosa Yafuatayo:")?;
            for err in self.syntax_errors.iter() {
                writeln!(f, "\t{err}")?;
            }
            return Ok(());
        }

        for line in &self.output {
            writeln!(f, "{line}")?;
        }

        if self.results.is_empty() {
            return writeln!(f, "Hakuna majaribio yaliyopatikana");
        }

        writeln!(f, "{HEADER_START}")?;
        writeln!(f, "imekusanya vipengele {}\n", self.total())?;
        for result in &self.results {
            for line in &result.output {
                writeln!(f, "{line}")?;
            }
            writeln!(f, "{result}")?;
        }
        writeln!(f)?;

        if self.failed > 0 {
            writeln!(f, "\n{HEADER_FAILURES}")?;
            for result in self.failures() {
                writeln!(f, "_________________________ {} _________________________", result.name)?;
                writeln!(f, ">   {}\n", result.error.as_deref().unwrap_or_default())?;
            }
        }

        let mut parts = Vec::new();
        if self.failed > 0 {
            parts.push(format!("{} imeshindwa", self.failed));
        }
        parts.push(format!("{} imefaulu", self.passed));
        parts.push(format!("kwa muda wa {:.2}s", self.duration.as_secs_f64()));
        writeln!(
            f,
            "======================= {} ========================",
            parts.join(", ")
        )
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Discovery
// ══════════════════════════════════════════════════════════════════════════

/// Bind every top-level `kazi` declaration before anything else runs, so
/// tests may call functions declared further down the file.
pub fn hoist_functions(evaluator: &mut Evaluator, program: &Program, env: &Env) {
    for stmt in &program.stmts {
        if let Some(name) = stmt.as_named_function().and_then(|f| f.name.as_ref()) {
            debug!(function = %name.name, "hoisting");
            evaluator.eval_stmt(stmt, env);
        }
    }
}

/// Names of the test functions in `program`, in source order.
pub fn collect_tests(program: &Program) -> Vec<String> {
    program
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Let(s) => Some(&s.name.name),
            _ => stmt
                .as_named_function()
                .and_then(|f| f.name.as_ref())
                .map(|n| &n.name),
        })
        .filter(|name| is_test_name(name))
        .cloned()
        .collect()
}

// ══════════════════════════════════════════════════════════════════════════
// Running
// ══════════════════════════════════════════════════════════════════════════

/// Parse `source` and run every test function in it with a fresh
/// evaluator and environment.
#[tracing::instrument(skip(source, config), fields(max_iterations = config.max_iterations))]
pub fn run_tests(source: &str, file_name: &str, config: EvalConfig) -> TestRunSummary {
    let started = Instant::now();
    let source_file = SourceFile::new(file_name, source);

    let program = match parse_source(&source_file).into_program() {
        Ok(program) => program,
        Err(errors) => {
            debug!(errors = errors.total_errors, "syntax errors, no tests run");
            return TestRunSummary::syntax_failure(file_name, errors, started.elapsed());
        }
    };

    let mut evaluator = Evaluator::new(config);
    let env = Environment::new();
    let results = run_program_tests(&mut evaluator, &program, &env);
    let output = evaluator.take_output();

    let summary = TestRunSummary::new(file_name, results, output, started.elapsed());
    debug!(
        passed = summary.passed,
        failed = summary.failed,
        "test run finished"
    );
    summary
}

/// Run the tests of an already parsed program on `evaluator`.
///
/// The evaluator's current reporter is replaced by an [`EventLog`] for the
/// duration of the run and put back afterwards. Output printed by top-level
/// code stays in the evaluator; output printed by each test is moved into
/// its [`TestResult`].
pub fn run_program_tests(evaluator: &mut Evaluator, program: &Program, env: &Env) -> Vec<TestResult> {
    let log = EventLog::new();
    let previous = evaluator.attach_reporter(Rc::new(log.clone()));

    hoist_functions(evaluator, program, env);
    if let Value::Error(err) = evaluator.eval_program(program, env) {
        warn!(error = %err, "top-level evaluation failed, running collected tests anyway");
    }
    let mark = evaluator.output().len();

    let tests = collect_tests(program);
    debug!(count = tests.len(), "collected tests");

    let mut results = Vec::with_capacity(tests.len());
    for name in tests {
        log.clear();
        let started = Instant::now();
        let outcome = evaluator.eval_expr(&Expr::call_by_name(&name), env);

        let error = match (log.last_failure(), outcome) {
            (Some(message), _) => Some(message),
            (None, Value::Error(err)) => Some(err.to_string()),
            (None, _) => None,
        };
        debug!(test = %name, passed = error.is_none(), "test finished");

        results.push(TestResult {
            passed: error.is_none(),
            name,
            error,
            output: evaluator.split_output(mark),
            duration: started.elapsed(),
        });
    }

    evaluator.restore_reporter(previous);
    results
}
