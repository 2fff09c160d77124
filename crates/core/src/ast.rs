//! Propositional expression tree.
//!
//! Expressions are produced by the external parser as part of the
//! interchange bundle and consumed by every traversal in the workspace
//! (reference graph, validator, evaluator, constraint compiler). Each
//! traversal matches exhaustively so new node kinds cannot be missed.

use serde::{Deserialize, Serialize};

use crate::model::Value;

/// A node of a propositional expression.
///
/// `Group` carries no semantics of its own; it records source-level
/// parentheses so traversals stay aligned with what the author wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not {
        inner: Box<Expr>,
    },
    Group {
        inner: Box<Expr>,
    },
    /// `reference == value`, or `reference != value` when `negated`.
    ///
    /// `reference` names a condition or a proposition; resolution is a
    /// lookup against the owning [`Model`](crate::model::Model) and may
    /// fail (a dangling reference), which every consumer tolerates.
    Statement {
        reference: String,
        value: Value,
        #[serde(default)]
        negated: bool,
    },
}

impl Expr {
    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not {
            inner: Box::new(inner),
        }
    }

    pub fn group(inner: Expr) -> Expr {
        Expr::Group {
            inner: Box::new(inner),
        }
    }

    pub fn statement(reference: impl Into<String>, value: Value) -> Expr {
        Expr::Statement {
            reference: reference.into(),
            value,
            negated: false,
        }
    }

    pub fn statement_negated(reference: impl Into<String>, value: Value) -> Expr {
        Expr::Statement {
            reference: reference.into(),
            value,
            negated: true,
        }
    }
}

/// Fold expressions with left-associative `or`.
///
/// Returns `None` for an empty slice; callers skip empty formula lists
/// before folding.
pub fn collapse_or(exprs: &[Expr]) -> Option<Expr> {
    let mut iter = exprs.iter().cloned();
    let first = iter.next()?;
    Some(iter.fold(first, Expr::or))
}
