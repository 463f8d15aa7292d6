//! Two-scope name environment.
//!
//! Globals come from top-level declarations and are written once, before
//! any formula is evaluated. Locals form a shadowing stack pushed around
//! generator and `let` bodies; lookup searches the stack most-recent-first,
//! then falls back to the globals.

use std::collections::HashMap;
use touist_syntax::{Ast, Span};

/// A bound value together with the span of its defining occurrence.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Ast,
    pub span: Span,
}

impl Binding {
    pub fn new(value: Ast, span: Span) -> Self {
        Self { value, span }
    }
}

/// The evaluation environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    globals: HashMap<String, Binding>,
    locals: Vec<(String, Binding)>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a global. Later declarations with the same canonical name
    /// overwrite earlier ones.
    pub fn bind_global(&mut self, name: String, binding: Binding) {
        self.globals.insert(name, binding);
    }

    /// Push a local binding, shadowing any previous binding of the name.
    pub fn push_local(&mut self, name: String, binding: Binding) {
        self.locals.push((name, binding));
    }

    /// Pop the most recent local binding.
    pub fn pop_local(&mut self) -> Option<(String, Binding)> {
        self.locals.pop()
    }

    /// Look up a name, locals first.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
            .or_else(|| self.globals.get(name))
    }

    /// Current depth of the local stack, for scope sanity checks in tests.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
