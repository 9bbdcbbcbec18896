//! Runtime values.
//!
//! [`Value`] is a closed enum: every evaluation step produces exactly one.
//! Besides data it carries the control signals `Break`, `Continue` and
//! `Return`, which the evaluator forwards until the construct that owns
//! them (a loop or a function call) consumes them.

use crate::env::Env;
use crate::error::RuntimeError;
use crate::module::ModuleContext;
use nuru_types::ast::Block;
use std::fmt;
use std::rc::Rc;

/// Signature of a builtin module function.
pub type NativeFn = fn(&[Value], &mut ModuleContext<'_>) -> Value;

/// A Nuru runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    /// A closure over the environment active at its definition.
    Function(Rc<Function>),
    /// A builtin looked up through the module registry.
    Module(ModuleFunction),
    Error(RuntimeError),

    // ── Control signals ──
    Break,
    Continue,
    Return(Box<Value>),
}

/// A user-defined function value.
pub struct Function {
    /// Declared or binding name, used in error messages.
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    /// The captured definition environment.
    pub env: Env,
}

impl fmt::Debug for Function {
    // The captured environment may hold this function; do not recurse into it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unda")
    }
}

/// A named builtin.
#[derive(Clone, Copy)]
pub struct ModuleFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for ModuleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleFunction({})", self.name)
    }
}

impl Value {
    /// Only `sikweli` and `tupu` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Whether this value is a control signal rather than data.
    pub fn is_signal(&self) -> bool {
        matches!(self, Value::Break | Value::Continue | Value::Return(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "NAMBA",
            Value::String(_) => "NENO",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "TUPU",
            Value::Function(_) => "UNDO",
            Value::Module(_) => "YA_NDANI",
            Value::Error(_) => "KOSA",
            Value::Break => "VUNJA",
            Value::Continue => "ENDELEA",
            Value::Return(_) => "RUDISHA",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => a.name == b.name,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Break, Value::Break) | (Value::Continue, Value::Continue) => true,
            (Value::Return(a), Value::Return(b)) => a == b,
            _ => false,
        }
    }
}

impl From<RuntimeError> for Value {
    fn from(err: RuntimeError) -> Self {
        Value::Error(err)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("kweli"),
            Value::Boolean(false) => f.write_str("sikweli"),
            Value::Null => f.write_str("tupu"),
            Value::Function(func) => write!(f, "unda({})", func.params.join(", ")),
            Value::Module(m) => write!(f, "<{}>", m.name),
            Value::Error(err) => write!(f, "{err}"),
            Value::Break => f.write_str("vunja"),
            Value::Continue => f.write_str("endelea"),
            Value::Return(inner) => write!(f, "{inner}"),
        }
    }
}

/// Integral numbers print without a fractional part.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}
