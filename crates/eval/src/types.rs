//! Evaluator error types.

use proplab_core::Value;

/// Errors returned by the laboratory API. Expression evaluation itself
/// is total and never fails; these cover misuse of the mutation surface
/// and models that cannot be loaded into a laboratory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// No proposition with this name exists in the model.
    #[error("unknown proposition: {name}")]
    UnknownProposition { name: String },

    /// The proposition is a given and cannot be updated.
    #[error("proposition '{name}' is a given and cannot be changed")]
    NotTweakable { name: String },

    /// The value is not one of the proposition's declared clause values.
    #[error("'{value}' is not an allowed value of proposition '{name}'")]
    InvalidValue { name: String, value: Value },

    /// A tweakable has no clause marked default, so no initial value
    /// can be assigned.
    #[error("tweakable '{name}' has no default value")]
    MissingDefault { name: String },
}
