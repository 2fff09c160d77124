//! Reference-graph analyzer.
//!
//! Walks expressions to collect the entity names they mention. The
//! resulting sets drive the unused-concern, unused-condition, and
//! condition-recursion checks in the validator. Dangling references
//! resolve to nothing and are ignored.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::Expr;
use crate::model::Model;

/// Collect the names of all *resolved* entities referenced by an
/// expression. Order-independent and idempotent: the result is a set.
pub fn referenced(expr: &Expr, model: &Model) -> BTreeSet<String> {
    let mut output = BTreeSet::new();
    collect(expr, model, &mut output);
    output
}

fn collect(expr: &Expr, model: &Model, output: &mut BTreeSet<String>) {
    match expr {
        Expr::Or { left, right } | Expr::And { left, right } => {
            collect(left, model, output);
            collect(right, model, output);
        }
        Expr::Not { inner } | Expr::Group { inner } => collect(inner, model, output),
        Expr::Statement { reference, .. } => {
            if model.condition(reference).is_some() || model.proposition(reference).is_some() {
                output.insert(reference.clone());
            }
        }
    }
}

/// Concern names referenced by at least one raise, across all clauses
/// of all propositions. Unresolved concern references are skipped.
pub fn used_concerns(model: &Model) -> BTreeSet<String> {
    let mut output = BTreeSet::new();
    for prop in &model.propositions {
        for clause in &prop.clauses {
            for raise in &clause.raises {
                if model.concern(&raise.concern).is_some() {
                    output.insert(raise.concern.clone());
                }
            }
        }
    }
    output
}

/// Entity names referenced by raise guard conditions and disable-rule
/// conditions across the whole model. A condition absent from this set
/// is unused.
pub fn used_entities(model: &Model) -> BTreeSet<String> {
    let mut output = BTreeSet::new();
    for prop in &model.propositions {
        for clause in &prop.clauses {
            for raise in &clause.raises {
                if let Some(guard) = &raise.condition {
                    collect(guard, model, &mut output);
                }
            }
        }
        for rule in &prop.disable {
            collect(&rule.condition, model, &mut output);
        }
    }
    output
}

/// Names of conditions that sit on a reference cycle in the
/// condition-to-condition graph, in declaration order. Direct
/// self-reference is the one-node cycle.
pub fn condition_cycles(model: &Model) -> Vec<String> {
    let mut edges: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for cond in &model.conditions {
        let targets = referenced(&cond.expression, model)
            .into_iter()
            .filter(|name| model.condition(name).is_some())
            .collect();
        edges.insert(cond.name.as_str(), targets);
    }

    model
        .conditions
        .iter()
        .filter(|cond| reaches(&edges, &cond.name, &cond.name, &mut BTreeSet::new()))
        .map(|cond| cond.name.clone())
        .collect()
}

fn reaches<'a>(
    edges: &'a BTreeMap<&str, Vec<String>>,
    from: &'a str,
    target: &str,
    visited: &mut BTreeSet<&'a str>,
) -> bool {
    let Some(targets) = edges.get(from) else {
        return false;
    };
    for next in targets {
        if next == target {
            return true;
        }
        if visited.insert(next.as_str()) && reaches(edges, next, target, visited) {
            return true;
        }
    }
    false
}
