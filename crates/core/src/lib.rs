//! proplab-core: propositional laboratory model library.
//!
//! Provides the data model for a laboratory bundle (conditions,
//! propositions, concerns, metadata), deserialization from the
//! interchange JSON produced by the external concrete-syntax parser,
//! the reference-graph analyzer, and the structural validator.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Model`] -- one fully parsed laboratory bundle
//! - [`Expr`] -- propositional expression tree
//! - [`Value`] / [`ValueType`] -- clause and statement values
//! - [`Diagnostic`] / [`Severity`] -- validator output
//! - [`validate()`] -- run all structural checks
//! - [`referenced()`] -- entity names mentioned by an expression

pub mod ast;
pub mod model;
pub mod refgraph;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::Expr;
pub use model::{
    BundleError, Clause, Concern, Condition, DisableRule, LabInfo, Model, Proposition, Raise,
    Value, ValueType,
};
pub use refgraph::{condition_cycles, referenced, used_concerns, used_entities};
pub use validate::{has_errors, validate, Diagnostic, Severity};
