//! Error types for compilation, the solver boundary, and decoding.

use proplab_core::Value;
use proplab_eval::EvalError;

/// Errors raised while encoding a model as an integer program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// A statement targets a (proposition, value) pair with no minted
    /// variable -- a given, or a value outside the declared clauses.
    #[error("no variable for value '{value}' of proposition '{proposition}'")]
    UnmappedValue { proposition: String, value: Value },

    /// A statement references a name that resolves to nothing.
    #[error("statement references unknown name '{name}'")]
    UnknownReference { name: String },

    /// A condition reference is compared against a non-boolean value.
    #[error("condition '{name}' compared against a non-boolean value")]
    ConditionValue { name: String },
}

/// A transport-level failure of the external solver (the process died,
/// the endpoint was unreachable). Distinct from the solver answering
/// `success: false`, which is a [`SolveError::Failed`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("solver backend error: {0}")]
    Backend(String),
}

/// Errors raised while applying a solver reply to a laboratory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// The solver reported failure. The message is propagated verbatim;
    /// no retry is attempted and no proposition state is touched.
    #[error("solver failed: {message}")]
    Failed { message: String },

    /// A decoded assignment was rejected by the laboratory.
    #[error(transparent)]
    Apply(#[from] EvalError),
}

/// Umbrella error for the one-shot [`optimize`](crate::optimize) entry
/// point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}
