//! Constraint compiler.
//!
//! Encodes the whole model -- independent of the current assignment --
//! as a 0/1 integer linear program: one-hot variables per tweakable
//! value, a Tseytin gate per internal node of each concern's raise
//! formula, a binary concern variable linked to its formula root, and a
//! weighted objective over the concern variables. Variable names are
//! minted in declaration order so identical models compile to identical
//! programs.

use std::collections::BTreeMap;

use serde::Serialize;

use proplab_core::{Expr, Model, Value};

use crate::collect::raise_formulas;
use crate::error::CompileError;
use crate::solver::ProgramInput;

// ──────────────────────────────────────────────
// Variable mappings
// ──────────────────────────────────────────────

/// The minted variables of one tweakable: (value, variable) pairs in
/// clause declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct TweakableVars {
    pub name: String,
    pub values: Vec<(Value, String)>,
}

/// Bidirectional record of what each minted variable stands for.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariableMap {
    /// One entry per tweakable, declaration order.
    pub propositions: Vec<TweakableVars>,
    /// Concern name to `r` variable, declaration order.
    pub concerns: Vec<(String, String)>,
}

impl VariableMap {
    /// The `x` variable standing for `proposition == value`.
    pub fn variable_for(&self, proposition: &str, value: &Value) -> Option<&str> {
        self.propositions
            .iter()
            .find(|entry| entry.name == proposition)?
            .values
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, var)| var.as_str())
    }

    pub fn concern_variable(&self, concern: &str) -> Option<&str> {
        self.concerns
            .iter()
            .find(|(name, _)| name == concern)
            .map(|(_, var)| var.as_str())
    }

    /// Reverse lookup: which (tweakable, value) does a variable encode?
    pub fn assignment_for(&self, variable: &str) -> Option<(&str, &Value)> {
        for entry in &self.propositions {
            for (value, var) in &entry.values {
                if var == variable {
                    return Some((entry.name.as_str(), value));
                }
            }
        }
        None
    }
}

/// A compiled program together with its variable mappings.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledProgram {
    pub input: ProgramInput,
    pub map: VariableMap,
}

// ──────────────────────────────────────────────
// Variable minting
// ──────────────────────────────────────────────

/// Mints `prefix1`, `prefix2`, ... and appends every minted name to the
/// program's variable list, preserving mint order.
struct VarMinter {
    prefix: &'static str,
    next: usize,
}

impl VarMinter {
    fn new(prefix: &'static str) -> VarMinter {
        VarMinter { prefix, next: 1 }
    }

    fn mint(&mut self, variables: &mut Vec<String>) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        variables.push(name.clone());
        name
    }
}

// ──────────────────────────────────────────────
// Compilation
// ──────────────────────────────────────────────

/// Compile a model and a concern-weight map into an integer program.
///
/// A concern missing from `weights` defaults to weight 1; a weight of
/// zero (or less) drops the concern from the objective while its
/// constraints remain.
pub fn compile(
    model: &Model,
    weights: &BTreeMap<String, f64>,
) -> Result<CompiledProgram, CompileError> {
    let mut input = ProgramInput::default();
    let mut map = VariableMap::default();

    // x variables: one per (tweakable, allowed value).
    let mut x = VarMinter::new("x");
    for prop in model.tweakables() {
        let values = prop
            .clauses
            .iter()
            .map(|clause| (clause.value.clone(), x.mint(&mut input.variables)))
            .collect();
        map.propositions.push(TweakableVars {
            name: prop.name.clone(),
            values,
        });
    }

    // r variables: one per declared concern.
    let mut r = VarMinter::new("r");
    for concern in &model.concerns {
        map.concerns
            .push((concern.name.clone(), r.mint(&mut input.variables)));
    }

    // Exactly one value per tweakable.
    for entry in &map.propositions {
        let sum: Vec<&str> = entry.values.iter().map(|(_, var)| var.as_str()).collect();
        input.constraints.push(format!("{} == 1", sum.join("+")));
    }

    // Encode each concern's raise formula and link it to its variable.
    let formulas = raise_formulas(model);
    let mut z = VarMinter::new("z");
    for (name, expr) in &formulas {
        let root = encode(expr, model, &map, &mut z, &mut input)?;
        let r_var = map
            .concern_variable(name)
            .ok_or_else(|| CompileError::UnknownReference { name: name.clone() })?;
        input.constraints.push(format!("{}-{} == 0", root, r_var));
    }

    // Weighted objective over raised concerns, declaration order.
    let mut terms = Vec::new();
    for (name, _) in &formulas {
        let weight = weights.get(name).copied().unwrap_or(1.0);
        if weight <= 0.0 {
            continue;
        }
        let r_var = map
            .concern_variable(name)
            .ok_or_else(|| CompileError::UnknownReference { name: name.clone() })?;
        if weight == 1.0 {
            terms.push(r_var.to_string());
        } else {
            terms.push(format!("({}*{})", weight, r_var));
        }
    }
    input.objective = terms.join("+");

    Ok(CompiledProgram { input, map })
}

/// Encode one formula node, returning the variable that carries its
/// truth value. Gate variables are minted before their children are
/// encoded, which fixes the numbering.
fn encode(
    expr: &Expr,
    model: &Model,
    map: &VariableMap,
    z: &mut VarMinter,
    input: &mut ProgramInput,
) -> Result<String, CompileError> {
    match expr {
        Expr::Or { left, right } => {
            let gate = z.mint(&mut input.variables);
            let a = encode(left, model, map, z, input)?;
            let b = encode(right, model, map, z, input)?;
            input.constraints.push(format!("{}-{}-{} <= 0", gate, a, b));
            input.constraints.push(format!("{}-{} <= 0", a, gate));
            input.constraints.push(format!("{}-{} <= 0", b, gate));
            Ok(gate)
        }
        Expr::And { left, right } => {
            let gate = z.mint(&mut input.variables);
            let a = encode(left, model, map, z, input)?;
            let b = encode(right, model, map, z, input)?;
            input.constraints.push(format!("{}+{}-{} <= 1", a, b, gate));
            input.constraints.push(format!("{}-{} <= 0", gate, a));
            input.constraints.push(format!("{}-{} <= 0", gate, b));
            Ok(gate)
        }
        Expr::Not { inner } => {
            let gate = z.mint(&mut input.variables);
            let a = encode(inner, model, map, z, input)?;
            emit_not(&a, &gate, &mut input.constraints);
            Ok(gate)
        }
        Expr::Group { inner } => encode(inner, model, map, z, input),
        Expr::Statement {
            reference,
            value,
            negated,
        } => {
            if let Some(cond) = model.condition(reference) {
                let target = match value {
                    Value::Bool(b) => *b,
                    Value::Text(_) => {
                        return Err(CompileError::ConditionValue {
                            name: reference.clone(),
                        })
                    }
                };
                // `cond != true` and `cond == false` both complement the
                // condition's own truth; conditions are always inlined.
                if *negated == target {
                    let gate = z.mint(&mut input.variables);
                    let a = encode(&cond.expression, model, map, z, input)?;
                    emit_not(&a, &gate, &mut input.constraints);
                    Ok(gate)
                } else {
                    encode(&cond.expression, model, map, z, input)
                }
            } else if model.proposition(reference).is_some() {
                let var = map.variable_for(reference, value).ok_or_else(|| {
                    CompileError::UnmappedValue {
                        proposition: reference.clone(),
                        value: value.clone(),
                    }
                })?;
                if *negated {
                    let gate = z.mint(&mut input.variables);
                    emit_not(var, &gate, &mut input.constraints);
                    Ok(gate)
                } else {
                    Ok(var.to_string())
                }
            } else {
                Err(CompileError::UnknownReference {
                    name: reference.clone(),
                })
            }
        }
    }
}

fn emit_not(a: &str, gate: &str, constraints: &mut Vec<String>) {
    constraints.push(format!("-{}-{} <= -1", a, gate));
    constraints.push(format!("{}+{} <= 1", a, gate));
}
