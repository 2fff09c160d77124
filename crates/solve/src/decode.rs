//! Solution decoder.
//!
//! Maps a solver reply back onto the laboratory: every truthy `x`
//! variable names one (tweakable, value) pair via the compiler's
//! mapping and becomes an update. Gate and concern variables are
//! ignored, as are names the mapping does not know. A failed reply
//! leaves the laboratory untouched.

use proplab_eval::Laboratory;

use crate::compile::VariableMap;
use crate::error::SolveError;
use crate::solver::SolverReply;

/// Apply a solver reply to the laboratory.
///
/// Conflicting truthy variables for one tweakable (a solver bug -- the
/// one-hot constraints forbid it) are not reconciled: the last one in
/// iteration order wins.
pub fn apply_solution(
    lab: &mut Laboratory,
    map: &VariableMap,
    reply: &SolverReply,
) -> Result<(), SolveError> {
    if !reply.success {
        return Err(SolveError::Failed {
            message: reply.message.clone().unwrap_or_default(),
        });
    }

    let Some(variables) = &reply.variables else {
        return Ok(());
    };

    for (name, value) in variables {
        if !name.starts_with('x') || *value == 0 {
            continue;
        }
        if let Some((prop, chosen)) = map.assignment_for(name) {
            let chosen = chosen.clone();
            lab.set_value(prop, chosen)?;
        }
    }
    Ok(())
}
