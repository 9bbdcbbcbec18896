//! Nuru tree-walking evaluator.
//!
//! Executes Nuru programs directly from the AST. Runtime values, scoped
//! environments, builtin module functions (including the `hakiki`
//! assertion and its reporter hook) and the `pima_` test harness live here.

pub mod env;
pub mod error;
pub mod evaluator;
pub mod module;
mod stack;
pub mod test_runner;
pub mod value;

pub use env::{Env, Environment};
pub use error::{EvalResult, RuntimeError};
pub use evaluator::{EvalConfig, Evaluator, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_ITERATIONS};
pub use module::{EventLog, ModuleContext, ModuleRegistry, Reporter, TestEvent};
pub use test_runner::{
    collect_tests, hoist_functions, is_test_name, run_program_tests, run_tests, TestResult,
    TestRunSummary, TEST_PREFIX,
};
pub use value::{Function, ModuleFunction, NativeFn, Value};
