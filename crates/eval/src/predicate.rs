//! Propositional expression evaluator.
//!
//! A stateless recursive walk: each call re-reads the current
//! [`EvalState`], so proposition edits are reflected immediately without
//! recompilation. Evaluation is total -- dangling references contribute
//! `false`, and a condition that is already on the active evaluation
//! stack reads as `false` instead of recursing forever (the validator
//! reports the cycle separately).

use proplab_core::{Expr, Model, Value};

use crate::state::EvalState;

/// Evaluate an expression against the current proposition assignment.
pub fn evaluate(expr: &Expr, model: &Model, state: &EvalState) -> bool {
    eval_inner(expr, model, state, &mut Vec::new())
}

fn eval_inner<'a>(
    expr: &'a Expr,
    model: &'a Model,
    state: &EvalState,
    active: &mut Vec<&'a str>,
) -> bool {
    match expr {
        Expr::Or { left, right } => {
            eval_inner(left, model, state, active) || eval_inner(right, model, state, active)
        }
        Expr::And { left, right } => {
            eval_inner(left, model, state, active) && eval_inner(right, model, state, active)
        }
        Expr::Not { inner } => !eval_inner(inner, model, state, active),
        Expr::Group { inner } => eval_inner(inner, model, state, active),
        Expr::Statement {
            reference,
            value,
            negated,
        } => {
            let current = if let Some(cond) = model.condition(reference) {
                if active.contains(&reference.as_str()) {
                    return false;
                }
                active.push(reference.as_str());
                let truth = eval_inner(&cond.expression, model, state, active);
                active.pop();
                Value::Bool(truth)
            } else if let Some(assigned) = state.get(reference) {
                assigned.clone()
            } else {
                // Dangling reference: no contribution.
                return false;
            };

            let equal = current == *value;
            if *negated {
                !equal
            } else {
                equal
            }
        }
    }
}
