//! proplab-eval: laboratory evaluator.
//!
//! Consumes a [`Model`](proplab_core::Model) and owns the mutable
//! evaluation state for one laboratory load: current proposition values,
//! re-evaluated lazily on every read so user edits are always reflected
//! without an explicit recompile step.

pub mod laboratory;
pub mod predicate;
pub mod state;
pub mod types;

pub use laboratory::{DisableInfo, Given, Laboratory, Tweakable};
pub use predicate::evaluate;
pub use state::EvalState;
pub use types::EvalError;
