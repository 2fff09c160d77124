//! Laboratory: one loaded model plus its evaluation state.
//!
//! Splits propositions into givens (single fixed value) and tweakables
//! (user-adjustable, seeded with their default clause value) and exposes
//! the derived per-tweakable evaluators: disable state and raised
//! concerns. A laboratory is replaced wholesale when the source is
//! re-parsed; its state never outlives the model it was built from.

use serde::Serialize;

use proplab_core::{Model, Value, ValueType};

use crate::predicate::evaluate;
use crate::state::EvalState;
use crate::types::EvalError;

/// A proposition with a single, non-editable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Given {
    pub name: String,
    /// Human-readable label.
    pub expression: String,
    pub value: Value,
}

/// Metadata of a user-adjustable proposition. The current value lives in
/// the laboratory's state, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tweakable {
    pub name: String,
    /// Human-readable label.
    pub expression: String,
    pub value_type: ValueType,
    pub default_value: Value,
    pub allowed_values: Vec<Value>,
}

/// Result of the disable evaluation for one tweakable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisableInfo {
    pub disabled: bool,
    pub message: String,
}

impl DisableInfo {
    fn enabled() -> DisableInfo {
        DisableInfo {
            disabled: false,
            message: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct Laboratory {
    model: Model,
    state: EvalState,
    givens: Vec<Given>,
    tweakables: Vec<Tweakable>,
}

impl Laboratory {
    /// Build a laboratory from a model, seeding every proposition with
    /// its default clause value. Fails when a tweakable lacks a default
    /// (which the validator reports as an error).
    pub fn new(model: Model) -> Result<Laboratory, EvalError> {
        let mut state = EvalState::new();
        let mut givens = Vec::new();
        let mut tweakables = Vec::new();

        for prop in &model.propositions {
            let default = prop
                .default_clause()
                .ok_or_else(|| EvalError::MissingDefault {
                    name: prop.name.clone(),
                })?;

            if prop.is_tweakable() {
                tweakables.push(Tweakable {
                    name: prop.name.clone(),
                    expression: prop.expression.clone(),
                    value_type: default.value.value_type(),
                    default_value: default.value.clone(),
                    allowed_values: prop.allowed_values().cloned().collect(),
                });
            } else {
                givens.push(Given {
                    name: prop.name.clone(),
                    expression: prop.expression.clone(),
                    value: default.value.clone(),
                });
            }
            state.set(prop.name.clone(), default.value.clone());
        }

        Ok(Laboratory {
            model,
            state,
            givens,
            tweakables,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn givens(&self) -> &[Given] {
        &self.givens
    }

    pub fn tweakables(&self) -> &[Tweakable] {
        &self.tweakables
    }

    /// Current value of a proposition (given or tweakable).
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// Update a tweakable. The single mutation point of the laboratory.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        let prop = self
            .model
            .proposition(name)
            .ok_or_else(|| EvalError::UnknownProposition {
                name: name.to_owned(),
            })?;
        if !prop.is_tweakable() {
            return Err(EvalError::NotTweakable {
                name: name.to_owned(),
            });
        }
        if prop.clause_for(&value).is_none() {
            return Err(EvalError::InvalidValue {
                name: name.to_owned(),
                value,
            });
        }
        self.state.set(name.to_owned(), value);
        Ok(())
    }

    /// Evaluate a condition by name against the current state.
    /// An unknown name reads as `false`.
    pub fn condition(&self, name: &str) -> bool {
        match self.model.condition(name) {
            Some(cond) => evaluate(&cond.expression, &self.model, &self.state),
            None => false,
        }
    }

    /// First disable rule whose condition currently holds wins; without
    /// a match the tweakable is enabled with an empty message.
    pub fn disable_info(&self, name: &str) -> DisableInfo {
        let Some(prop) = self.model.proposition(name) else {
            return DisableInfo::enabled();
        };
        for rule in &prop.disable {
            if evaluate(&rule.condition, &self.model, &self.state) {
                return DisableInfo {
                    disabled: true,
                    message: rule.message.clone(),
                };
            }
        }
        DisableInfo::enabled()
    }

    /// Concerns raised by a tweakable at its current value: empty while
    /// disabled, otherwise the matching clause's raises whose guard is
    /// absent or holds, in declaration order.
    pub fn raised_concerns(&self, name: &str) -> Vec<String> {
        if self.disable_info(name).disabled {
            return Vec::new();
        }
        let Some(prop) = self.model.proposition(name) else {
            return Vec::new();
        };
        let Some(current) = self.state.get(name) else {
            return Vec::new();
        };
        let Some(clause) = prop.clause_for(current) else {
            return Vec::new();
        };

        let mut raised = Vec::new();
        for raise in &clause.raises {
            if self.model.concern(&raise.concern).is_none() {
                continue;
            }
            if let Some(guard) = &raise.condition {
                if !evaluate(guard, &self.model, &self.state) {
                    continue;
                }
            }
            raised.push(raise.concern.clone());
        }
        raised
    }
}
