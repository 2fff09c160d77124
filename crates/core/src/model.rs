//! Laboratory model types and interchange deserialization.
//!
//! The concrete-syntax parser is an external collaborator; it hands this
//! crate a JSON bundle. All types here deserialize from that format and
//! keep declaration order, which downstream consumers rely on for
//! reproducible variable numbering and diagnostic ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Expr;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors raised while loading an interchange bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The bundle is not valid JSON or does not match the model shape.
    #[error("malformed laboratory bundle: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A clause or statement value. Untagged in the interchange format:
/// JSON booleans become `Bool`, JSON strings become `Text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Text(String),
}

/// The runtime type of a proposition, determined by its clause values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Text,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Text(_) => ValueType::Text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

// ──────────────────────────────────────────────
// Constructs
// ──────────────────────────────────────────────

/// A named boolean formula, evaluated on demand against the current
/// proposition assignment. Must not reference itself, directly or
/// through other conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub expression: Expr,
}

/// One concern raised by a clause, optionally guarded by a condition
/// that must hold for the raise to fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raise {
    pub concern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expr>,
}

/// One allowed value of a proposition, with the concerns it raises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub value: Value,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub raises: Vec<Raise>,
}

/// While `condition` holds, the owning proposition is locked and raises
/// nothing; `message` explains why to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisableRule {
    pub condition: Expr,
    pub message: String,
}

/// A named, multi-valued choice.
///
/// One clause makes a *given* (a fixed fact); two or more make a
/// *tweakable*, which carries a mutable current value at evaluation time
/// and must mark exactly one clause as default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    pub name: String,
    /// Human-readable label shown alongside the choice.
    pub expression: String,
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub disable: Vec<DisableRule>,
}

impl Proposition {
    pub fn is_tweakable(&self) -> bool {
        self.clauses.len() > 1
    }

    /// The default clause: the explicitly flagged one, or the single
    /// clause of a given (implicitly default). `None` when a tweakable
    /// is missing its default flag, which the validator reports.
    pub fn default_clause(&self) -> Option<&Clause> {
        if self.clauses.len() == 1 {
            return self.clauses.first();
        }
        self.clauses.iter().find(|clause| clause.default)
    }

    pub fn allowed_values(&self) -> impl Iterator<Item = &Value> {
        self.clauses.iter().map(|clause| &clause.value)
    }

    /// Runtime type, read from the first clause. Clause type agreement
    /// is a validator check, not a structural guarantee.
    pub fn value_type(&self) -> Option<ValueType> {
        self.clauses.first().map(|clause| clause.value.value_type())
    }

    pub fn clause_for(&self, value: &Value) -> Option<&Clause> {
        self.clauses.iter().find(|clause| clause.value == *value)
    }
}

/// A named trade-off description. Concerns hold no logic of their own;
/// they are referenced from raises and weighted in the objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concern {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Laboratory metadata. Fields are lists because the upstream grammar
/// lets authors repeat them; repeats are a validator error and accessors
/// expose the first entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabInfo {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl LabInfo {
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }
}

// ──────────────────────────────────────────────
// Model
// ──────────────────────────────────────────────

/// One fully parsed laboratory: conditions, propositions, concerns, and
/// metadata, in declaration order. Replaced wholesale on re-parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub laboratory: LabInfo,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub propositions: Vec<Proposition>,
    #[serde(default)]
    pub concerns: Vec<Concern>,
}

impl Model {
    pub fn from_value(value: serde_json::Value) -> Result<Model, BundleError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(source: &str) -> Result<Model, BundleError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|cond| cond.name == name)
    }

    pub fn proposition(&self, name: &str) -> Option<&Proposition> {
        self.propositions.iter().find(|prop| prop.name == name)
    }

    pub fn concern(&self, name: &str) -> Option<&Concern> {
        self.concerns.iter().find(|concern| concern.name == name)
    }

    /// Propositions with two or more clauses, declaration order.
    pub fn tweakables(&self) -> impl Iterator<Item = &Proposition> {
        self.propositions.iter().filter(|prop| prop.is_tweakable())
    }

    /// Propositions with exactly one clause, declaration order.
    pub fn givens(&self) -> impl Iterator<Item = &Proposition> {
        self.propositions.iter().filter(|prop| !prop.is_tweakable())
    }
}
