//! Builtin module functions and the assertion reporter hook.
//!
//! The registry maps a builtin name to a [`NativeFn`]. It is built once per
//! [`crate::Evaluator`] and never changes afterwards. Each call receives a
//! [`ModuleContext`] carrying the caller's bindings, the reporter currently
//! attached to the evaluator, and the evaluator's output buffer.

use crate::error::RuntimeError;
use crate::value::{ModuleFunction, NativeFn, Value};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Message used by `hakiki` when none is given.
pub const DEFAULT_ASSERT_MESSAGE: &str = "Test";

/// Outcome of one `hakiki` call made while a reporter is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEvent {
    pub passed: bool,
    pub message: String,
}

/// Receives assertion outcomes from `hakiki`.
pub trait Reporter {
    fn report(&self, event: TestEvent);
}

/// A reporter that records every event. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<TestEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn events(&self) -> Vec<TestEvent> {
        self.0.borrow().clone()
    }

    /// Message of the last failing event, if any event failed.
    pub fn last_failure(&self) -> Option<String> {
        self.0
            .borrow()
            .iter()
            .rev()
            .find(|e| !e.passed)
            .map(|e| e.message.clone())
    }
}

impl Reporter for EventLog {
    fn report(&self, event: TestEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// What a builtin can see of its caller.
pub struct ModuleContext<'a> {
    /// Bindings of the calling scope.
    pub defs: &'a BTreeMap<String, Value>,
    pub reporter: Option<&'a dyn Reporter>,
    /// Lines printed by `andika`.
    pub output: &'a mut Vec<String>,
}

/// Name → builtin table.
#[derive(Clone)]
pub struct ModuleRegistry {
    functions: BTreeMap<&'static str, NativeFn>,
}

impl ModuleRegistry {
    /// The registry with every Nuru builtin.
    pub fn builtin() -> Self {
        let mut functions: BTreeMap<&'static str, NativeFn> = BTreeMap::new();
        functions.insert("hakiki", hakiki);
        functions.insert("andika", andika);
        functions.insert("aina", aina);
        Self { functions }
    }

    pub fn get(&self, name: &str) -> Option<ModuleFunction> {
        self.functions
            .get_key_value(name)
            .map(|(&name, &func)| ModuleFunction { name, func })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Builtins
// ══════════════════════════════════════════════════════════════════════════════

/// `hakiki(condition [, message])`
///
/// With a reporter attached the outcome is reported and the call returns
/// `kweli`, so a failing assertion never aborts the caller. Without one,
/// a failure is an error carrying the message.
fn hakiki(args: &[Value], ctx: &mut ModuleContext<'_>) -> Value {
    let Some(condition) = args.first() else {
        return RuntimeError::custom("assert requires a condition").into();
    };

    let passed = match condition {
        Value::Boolean(b) => *b,
        Value::Null => false,
        _ => true,
    };

    let message = match args.get(1) {
        Some(Value::String(m)) => m.clone(),
        _ => DEFAULT_ASSERT_MESSAGE.to_string(),
    };

    if let Some(reporter) = ctx.reporter {
        reporter.report(TestEvent { passed, message });
        return Value::Boolean(true);
    }

    if passed {
        Value::Boolean(true)
    } else {
        RuntimeError::Custom(message).into()
    }
}

/// `andika(args...)`: print the arguments separated by spaces.
fn andika(args: &[Value], ctx: &mut ModuleContext<'_>) -> Value {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    ctx.output.push(line);
    Value::Null
}

/// `aina(value)`: the value's type name.
fn aina(args: &[Value], _ctx: &mut ModuleContext<'_>) -> Value {
    match args {
        [value] => Value::String(value.type_name().to_string()),
        _ => RuntimeError::ArityMismatch {
            name: "aina".into(),
            expected: 1,
            got: args.len(),
        }
        .into(),
    }
}
