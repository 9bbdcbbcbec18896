//! Scoped variable environment for the Nuru evaluator.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

/// A shared handle to an environment. Closures keep their defining scope
/// alive through it.
pub type Env = Rc<RefCell<Environment>>;

/// One scope: local bindings plus an optional enclosing scope.
///
/// Lookups walk outward. `set` always binds locally; `assign` updates the
/// first scope that already binds the name.
#[derive(Default)]
pub struct Environment {
    store: BTreeMap<String, Value>,
    outer: Option<Env>,
}

impl Environment {
    /// Create a new top-level environment.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Create a child scope of `outer`.
    pub fn enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: BTreeMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Look up a name, searching from this scope outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref()?.borrow().get(name),
        }
    }

    /// Bind a name in this scope, shadowing any outer binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }

    /// Update the nearest existing binding. Returns `false` if no scope
    /// binds `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.store.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().assign(name, value),
            None => false,
        }
    }

    /// Bindings defined directly in this scope.
    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.store
    }

    /// Every name visible from this scope, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names.into_iter().collect()
    }

    fn collect_names(&self, names: &mut BTreeSet<String>) {
        names.extend(self.store.keys().cloned());
        if let Some(outer) = &self.outer {
            outer.borrow().collect_names(names);
        }
    }
}

impl fmt::Debug for Environment {
    // Bound closures point back at their scope; print names only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.store.keys().collect::<Vec<_>>())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}
