//! Core expression and statement evaluator.
//!
//! Internally every step returns [`EvalResult<Value>`] and errors propagate
//! with `?`. The public `eval_*` entry points are total: an error comes
//! back as [`Value::Error`]. Control signals (`Break`, `Continue`,
//! `Return`) travel as ordinary values and are forwarded at every
//! composition point until a loop or a function call consumes them.

use crate::env::{Env, Environment};
use crate::error::{EvalResult, RuntimeError};
use crate::module::{ModuleContext, ModuleRegistry, Reporter};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Function, ModuleFunction, Value};
use nuru_types::ast::*;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, trace};

/// Default ceiling on `wakati` iterations.
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;

/// Default ceiling on nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 5_000;

/// Evaluator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Condition checks a single `wakati` loop may perform before it is
    /// aborted with "infinite loop detected".
    pub max_iterations: u64,
    /// Function calls that may be active at once before a call fails with
    /// "maximum recursion depth exceeded".
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Evaluate an expression, handing any control signal straight back to the
/// caller. A `vunja` that ended a loop used as a value becomes `tupu`.
macro_rules! value_of {
    ($self:ident, $expr:expr, $env:expr) => {{
        let expr: &Expr = $expr;
        match $self.expr(expr, $env)? {
            Value::Break if expr.is_loop() => Value::Null,
            value if value.is_signal() => return Ok(value),
            value => value,
        }
    }};
}

/// States of a `wakati` loop.
enum LoopState {
    EvaluateCondition,
    EvaluateBody,
    Done(Value),
}

/// The tree-walking evaluator.
pub struct Evaluator {
    config: EvalConfig,
    modules: ModuleRegistry,
    /// Receives `hakiki` outcomes while attached.
    reporter: Option<Rc<dyn Reporter>>,
    /// Lines printed by `andika`.
    output: Vec<String>,
    /// Function calls currently in progress.
    depth: usize,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            modules: ModuleRegistry::builtin(),
            reporter: None,
            output: Vec::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Function calls currently in progress; zero between top-level runs.
    pub fn call_depth(&self) -> usize {
        self.depth
    }

    // ── Reporter & output ─────────────────────────────────────────────────

    /// Attach a reporter, returning the one it replaces so the caller can
    /// put it back.
    pub fn attach_reporter(&mut self, reporter: Rc<dyn Reporter>) -> Option<Rc<dyn Reporter>> {
        self.reporter.replace(reporter)
    }

    pub fn detach_reporter(&mut self) -> Option<Rc<dyn Reporter>> {
        self.reporter.take()
    }

    /// Reinstate a reporter saved from [`Self::attach_reporter`].
    pub fn restore_reporter(&mut self, previous: Option<Rc<dyn Reporter>>) {
        self.reporter = previous;
    }

    pub fn has_reporter(&self) -> bool {
        self.reporter.is_some()
    }

    /// Lines printed with `andika` and not yet taken.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Drain everything printed with `andika` so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Remove and return the lines printed after the first `at`.
    pub fn split_output(&mut self, at: usize) -> Vec<String> {
        self.output.split_off(at.min(self.output.len()))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Public entry points
    // ══════════════════════════════════════════════════════════════════════

    /// Run a whole program. A top-level `rudisha` ends the program with its
    /// value; `vunja`/`endelea` outside any loop is an error.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Value {
        self.program(program, env).unwrap_or_else(Value::Error)
    }

    /// Evaluate one statement. Control signals are returned as-is.
    pub fn eval_stmt(&mut self, stmt: &Stmt, env: &Env) -> Value {
        self.stmt(stmt, env).unwrap_or_else(Value::Error)
    }

    /// Evaluate one expression. Control signals are returned as-is.
    pub fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Value {
        self.expr(expr, env).unwrap_or_else(Value::Error)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Program, block & statement execution
    // ══════════════════════════════════════════════════════════════════════

    fn program(&mut self, program: &Program, env: &Env) -> EvalResult<Value> {
        let mut last = Value::Null;
        for stmt in &program.stmts {
            match self.stmt(stmt, env)? {
                Value::Return(value) => return Ok(*value),
                Value::Break if stmt.is_loop() => last = Value::Null,
                Value::Break => return Err(RuntimeError::StrayControl("vunja")),
                Value::Continue => return Err(RuntimeError::StrayControl("endelea")),
                value => last = value,
            }
        }
        Ok(last)
    }

    /// Statements run in order; the first signal stops the block and is
    /// handed to the caller. A loop statement's own `vunja` stays inside it.
    fn block(&mut self, block: &Block, env: &Env) -> EvalResult<Value> {
        let mut last = Value::Null;
        for stmt in &block.stmts {
            match self.stmt(stmt, env)? {
                Value::Break if stmt.is_loop() => last = Value::Null,
                signal if signal.is_signal() => return Ok(signal),
                value => last = value,
            }
        }
        Ok(last)
    }

    fn stmt(&mut self, stmt: &Stmt, env: &Env) -> EvalResult<Value> {
        match stmt {
            Stmt::Let(s) => {
                let value = value_of!(self, &s.value, env);
                env.borrow_mut().set(s.name.name.clone(), value);
                Ok(Value::Null)
            }
            Stmt::Assign(s) => {
                let value = value_of!(self, &s.value, env);
                if env.borrow_mut().assign(&s.name.name, value) {
                    Ok(Value::Null)
                } else {
                    Err(RuntimeError::UndefinedIdentifier(s.name.name.clone()))
                }
            }
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => value_of!(self, expr, env),
                    None => Value::Null,
                };
                Ok(Value::Return(Box::new(value)))
            }
            Stmt::Break(_) => Ok(Value::Break),
            Stmt::Continue(_) => Ok(Value::Continue),
            Stmt::Expr(s) => match stmt.as_named_function() {
                Some(lit) => {
                    let function = self.function_value(lit, env);
                    if let Some(name) = &lit.name {
                        env.borrow_mut().set(name.name.clone(), function.clone());
                    }
                    Ok(function)
                }
                None => self.expr(&s.expr, env),
            },
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    fn expr(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.expr_inner(expr, env))
    }

    fn expr_inner(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Boolean(*b)),
            ExprKind::NullLit => Ok(Value::Null),

            ExprKind::Identifier(name) => self.identifier(name, env),
            ExprKind::Call { callee, args } => self.call_expr(callee, args, env),

            ExprKind::Binary { left, op, right } => self.binary(left, *op, right, env),
            ExprKind::Unary { op, operand } => {
                let value = value_of!(self, operand, env);
                unary(*op, value)
            }

            ExprKind::If(if_expr) => self.if_expr(if_expr, env),
            ExprKind::While(while_expr) => self.while_loop(while_expr, env),
            ExprKind::Function(lit) => Ok(self.function_value(lit, env)),
            ExprKind::Paren(inner) => self.expr(inner, env),
        }
    }

    // ── Identifiers & Calls ──────────────────────────────────────────────

    /// Scoped bindings first, then builtins.
    fn identifier(&self, name: &str, env: &Env) -> EvalResult<Value> {
        if let Some(value) = env.borrow().get(name) {
            return Ok(value);
        }
        self.modules
            .get(name)
            .map(Value::Module)
            .ok_or_else(|| RuntimeError::UndefinedIdentifier(name.to_string()))
    }

    /// Callee first, then arguments left to right; the first error wins.
    fn call_expr(&mut self, callee: &Expr, args: &[Expr], env: &Env) -> EvalResult<Value> {
        let function = value_of!(self, callee, env);
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(value_of!(self, arg, env));
        }

        match function {
            Value::Function(func) => self.call_function(&func, values),
            Value::Module(module) => self.call_module(module, &values, env),
            other => Err(RuntimeError::NotCallable(other.type_name().to_string())),
        }
    }

    fn call_function(&mut self, func: &Function, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: func.display_name().to_string(),
                expected: func.params.len(),
                got: args.len(),
            });
        }

        if self.depth >= self.config.max_call_depth {
            debug!(
                function = func.display_name(),
                max_call_depth = self.config.max_call_depth,
                "call depth ceiling reached"
            );
            return Err(RuntimeError::RecursionLimit);
        }

        self.depth += 1;
        let result = self.call_body(func, args);
        self.depth -= 1;
        result
    }

    /// Bind the arguments in a child of the captured scope and run the body.
    fn call_body(&mut self, func: &Function, args: Vec<Value>) -> EvalResult<Value> {
        trace!(function = func.display_name(), args = args.len(), depth = self.depth, "call");
        let scope = Environment::enclosed(&func.env);
        {
            let mut scope = scope.borrow_mut();
            for (param, arg) in func.params.iter().zip(args) {
                scope.set(param.clone(), arg);
            }
        }

        match self.block(&func.body, &scope)? {
            Value::Return(value) => Ok(*value),
            Value::Break => Err(RuntimeError::StrayControl("vunja")),
            Value::Continue => Err(RuntimeError::StrayControl("endelea")),
            value => Ok(value),
        }
    }

    /// Invoke a builtin with the caller's bindings and the attached reporter.
    fn call_module(
        &mut self,
        module: ModuleFunction,
        args: &[Value],
        env: &Env,
    ) -> EvalResult<Value> {
        trace!(builtin = module.name, args = args.len(), "call");
        let scope = env.borrow();
        let mut ctx = ModuleContext {
            defs: scope.bindings(),
            reporter: self.reporter.as_deref(),
            output: &mut self.output,
        };
        match (module.func)(args, &mut ctx) {
            Value::Error(err) => Err(err),
            value => Ok(value),
        }
    }

    fn function_value(&self, lit: &FunctionLit, env: &Env) -> Value {
        Value::Function(Rc::new(Function {
            name: lit.name.as_ref().map(|n| n.name.clone()),
            params: lit.params.iter().map(|p| p.name.clone()).collect(),
            body: Rc::clone(&lit.body),
            env: Rc::clone(env),
        }))
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn binary(&mut self, left: &Expr, op: BinOp, right: &Expr, env: &Env) -> EvalResult<Value> {
        let lv = value_of!(self, left, env);

        // Short-circuit for logical operators
        match op {
            BinOp::And if !lv.is_truthy() => return Ok(Value::Boolean(false)),
            BinOp::Or if lv.is_truthy() => return Ok(Value::Boolean(true)),
            BinOp::And | BinOp::Or => {
                let rv = value_of!(self, right, env);
                return Ok(Value::Boolean(rv.is_truthy()));
            }
            _ => {}
        }

        let rv = value_of!(self, right, env);
        binary(op, lv, rv)
    }

    // ── Control Flow ─────────────────────────────────────────────────────

    fn if_expr(&mut self, if_expr: &IfExpr, env: &Env) -> EvalResult<Value> {
        let condition = value_of!(self, &if_expr.condition, env);
        if condition.is_truthy() {
            self.block(&if_expr.then_block, env)
        } else {
            match &if_expr.else_branch {
                Some(ElseBranch::ElseIf(elif)) => self.if_expr(elif, env),
                Some(ElseBranch::Block(block)) => self.block(block, env),
                None => Ok(Value::Null),
            }
        }
    }

    /// `wakati (cond) { body }`
    ///
    /// The iteration counter is bumped before every condition check; going
    /// past `max_iterations` aborts the loop. A falsy condition finishes
    /// with the last body value (`tupu` if the body never ran). `vunja`
    /// finishes with the Break signal itself.
    fn while_loop(&mut self, node: &WhileExpr, env: &Env) -> EvalResult<Value> {
        let mut iterations: u64 = 0;
        let mut last = Value::Null;
        let mut state = LoopState::EvaluateCondition;

        loop {
            state = match state {
                LoopState::EvaluateCondition => {
                    iterations += 1;
                    if iterations > self.config.max_iterations {
                        debug!(
                            max_iterations = self.config.max_iterations,
                            "loop exceeded iteration ceiling"
                        );
                        return Err(RuntimeError::InfiniteLoop);
                    }
                    let condition = value_of!(self, &node.condition, env);
                    if condition.is_truthy() {
                        LoopState::EvaluateBody
                    } else {
                        LoopState::Done(std::mem::replace(&mut last, Value::Null))
                    }
                }
                LoopState::EvaluateBody => match self.block(&node.body, env)? {
                    Value::Break => LoopState::Done(Value::Break),
                    Value::Continue => LoopState::EvaluateCondition,
                    ret @ Value::Return(_) => LoopState::Done(ret),
                    value => {
                        last = value;
                        LoopState::EvaluateCondition
                    }
                },
                LoopState::Done(value) => {
                    trace!(iterations, "loop finished");
                    return Ok(value);
                }
            };
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operator semantics
// ══════════════════════════════════════════════════════════════════════════

fn unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Neg, value) => Err(RuntimeError::TypeMismatch(format!(
            "-{}",
            value.type_name()
        ))),
    }
}

fn binary(op: BinOp, lv: Value, rv: Value) -> EvalResult<Value> {
    match (op, &lv, &rv) {
        (BinOp::Eq, _, _) => Ok(Value::Boolean(lv == rv)),
        (BinOp::NotEq, _, _) => Ok(Value::Boolean(lv != rv)),

        (BinOp::Div | BinOp::Mod, Value::Number(_), Value::Number(b)) if *b == 0.0 => {
            Err(RuntimeError::DivisionByZero)
        }
        (_, Value::Number(a), Value::Number(b)) => {
            numeric(op, *a, *b).ok_or_else(|| type_mismatch(op, &lv, &rv))
        }

        (BinOp::Add, Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),

        _ => Err(type_mismatch(op, &lv, &rv)),
    }
}

fn numeric(op: BinOp, a: f64, b: f64) -> Option<Value> {
    Some(match op {
        BinOp::Add => Value::Number(a + b),
        BinOp::Sub => Value::Number(a - b),
        BinOp::Mul => Value::Number(a * b),
        BinOp::Div => Value::Number(a / b),
        BinOp::Mod => Value::Number(a % b),
        BinOp::Less => Value::Boolean(a < b),
        BinOp::Greater => Value::Boolean(a > b),
        BinOp::LessEq => Value::Boolean(a <= b),
        BinOp::GreaterEq => Value::Boolean(a >= b),
        BinOp::Eq | BinOp::NotEq | BinOp::And | BinOp::Or => return None,
    })
}

fn type_mismatch(op: BinOp, lv: &Value, rv: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch(format!(
        "{} {} {}",
        lv.type_name(),
        op.as_str(),
        rv.type_name()
    ))
}
