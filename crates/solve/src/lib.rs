//! proplab-solve: compiles a laboratory model into a 0/1 integer linear
//! program and decodes solver replies back onto the laboratory.
//!
//! The solver itself is an external collaborator behind the [`Solver`]
//! trait: it consumes an objective string, a variable-name list, and a
//! constraint-string list, and replies with a name-to-value assignment.
//! Everything on this side is deterministic -- variable numbering follows
//! declaration order so compiled programs are reproducible.

pub mod collect;
pub mod compile;
pub mod decode;
pub mod error;
pub mod solver;

pub use collect::raise_formulas;
pub use compile::{compile, CompiledProgram, TweakableVars, VariableMap};
pub use decode::apply_solution;
pub use error::{CompileError, OptimizeError, SolveError, SolverError};
pub use solver::{ProgramInput, Solver, SolverReply, StaticSolver};

use std::collections::BTreeMap;

use proplab_eval::Laboratory;

/// Run one full optimize pass: compile the laboratory's model with the
/// given concern weights, hand the program to the solver, and apply the
/// reply to the laboratory. On any failure the laboratory is left
/// untouched.
pub async fn optimize(
    lab: &mut Laboratory,
    weights: &BTreeMap<String, f64>,
    solver: &dyn Solver,
) -> Result<CompiledProgram, OptimizeError> {
    let program = compile(lab.model(), weights)?;
    let reply = solver.solve(&program.input).await?;
    apply_solution(lab, &program.map, &reply)?;
    Ok(program)
}
