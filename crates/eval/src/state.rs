//! Mutable evaluation state for one laboratory load.

use std::collections::BTreeMap;

use proplab_core::Value;

/// Current value of every proposition, keyed by name. Seeded from the
/// default clauses when the laboratory is built; mutated only through
/// tweakable updates. Condition truth is never stored here -- conditions
/// re-read this state on every evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvalState {
    values: BTreeMap<String, Value>,
}

impl EvalState {
    pub fn new() -> EvalState {
        EvalState::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }
}
