//! Raise-formula collector.
//!
//! Derives, per concern, the full disjunction of circumstances under
//! which it is raised: the owning tweakable holds the clause's value,
//! the optional guard holds, and the tweakable is not disabled. The
//! conjunction nesting and the left-associative fold are fixed so gate
//! variables number identically across runs.

use std::collections::BTreeMap;

use proplab_core::ast::collapse_or;
use proplab_core::{Expr, Model};

/// Collect one folded formula per concern that has at least one raise,
/// in concern declaration order. Concerns never raised are absent;
/// raises naming an unknown concern are skipped.
pub fn raise_formulas(model: &Model) -> Vec<(String, Expr)> {
    let mut by_concern: BTreeMap<&str, Vec<Expr>> = BTreeMap::new();

    for prop in &model.propositions {
        for clause in &prop.clauses {
            for raise in &clause.raises {
                if model.concern(&raise.concern).is_none() {
                    continue;
                }

                // This tweakable must hold this clause's value.
                let mut trigger = Expr::statement(prop.name.clone(), clause.value.clone());

                // Only raised while the guard holds.
                if let Some(guard) = &raise.condition {
                    trigger = Expr::and(trigger, guard.clone());
                }

                // Never raised while the owning tweakable is disabled.
                if !prop.disable.is_empty() {
                    let rules: Vec<Expr> = prop
                        .disable
                        .iter()
                        .map(|rule| rule.condition.clone())
                        .collect();
                    if let Some(disabled) = collapse_or(&rules) {
                        trigger = Expr::and(Expr::not(disabled), trigger);
                    }
                }

                by_concern
                    .entry(raise.concern.as_str())
                    .or_default()
                    .push(trigger);
            }
        }
    }

    model
        .concerns
        .iter()
        .filter_map(|concern| {
            let formulas = by_concern.get(concern.name.as_str())?;
            collapse_or(formulas).map(|expr| (concern.name.clone(), expr))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proplab_core::{Clause, Concern, DisableRule, Proposition, Raise, Value};

    fn concern(name: &str) -> Concern {
        Concern {
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn raising_prop(name: &str, guard: Option<Expr>, disable: Vec<DisableRule>) -> Proposition {
        Proposition {
            name: name.to_string(),
            expression: name.to_string(),
            clauses: vec![
                Clause {
                    value: Value::text("a"),
                    default: true,
                    raises: Vec::new(),
                },
                Clause {
                    value: Value::text("b"),
                    default: false,
                    raises: vec![Raise {
                        concern: "k".to_string(),
                        condition: guard,
                    }],
                },
            ],
            disable,
        }
    }

    #[test]
    fn bare_raise_becomes_a_value_statement() {
        let model = Model {
            propositions: vec![raising_prop("p", None, Vec::new())],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].0, "k");
        assert_eq!(formulas[0].1, Expr::statement("p", Value::text("b")));
    }

    #[test]
    fn guard_is_conjoined_on_the_right() {
        let guard = Expr::statement("p", Value::text("a"));
        let model = Model {
            propositions: vec![raising_prop("p", Some(guard.clone()), Vec::new())],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        assert_eq!(
            formulas[0].1,
            Expr::and(Expr::statement("p", Value::text("b")), guard)
        );
    }

    #[test]
    fn disable_veto_wraps_the_trigger_on_the_left() {
        let lock_a = Expr::statement("q", Value::text("x"));
        let lock_b = Expr::statement("q", Value::text("y"));
        let model = Model {
            propositions: vec![raising_prop(
                "p",
                None,
                vec![
                    DisableRule {
                        condition: lock_a.clone(),
                        message: String::new(),
                    },
                    DisableRule {
                        condition: lock_b.clone(),
                        message: String::new(),
                    },
                ],
            )],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        assert_eq!(
            formulas[0].1,
            Expr::and(
                Expr::not(Expr::or(lock_a, lock_b)),
                Expr::statement("p", Value::text("b")),
            )
        );
    }

    #[test]
    fn formulas_fold_left_in_declaration_order() {
        let mut first = raising_prop("p", None, Vec::new());
        first.clauses[0].raises.push(Raise {
            concern: "k".to_string(),
            condition: None,
        });
        let model = Model {
            propositions: vec![first],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        // Clause order: the "a" raise precedes the "b" raise.
        assert_eq!(
            formulas[0].1,
            Expr::or(
                Expr::statement("p", Value::text("a")),
                Expr::statement("p", Value::text("b")),
            )
        );
    }

    #[test]
    fn unraised_and_unknown_concerns_are_skipped() {
        let mut prop = raising_prop("p", None, Vec::new());
        prop.clauses[0].raises.push(Raise {
            concern: "ghost".to_string(),
            condition: None,
        });
        let model = Model {
            propositions: vec![prop],
            concerns: vec![concern("quiet"), concern("k")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].0, "k");
    }

    #[test]
    fn result_follows_concern_declaration_order() {
        let mut p1 = raising_prop("p1", None, Vec::new());
        p1.clauses[1].raises[0].concern = "late".to_string();
        let mut p2 = raising_prop("p2", None, Vec::new());
        p2.clauses[1].raises[0].concern = "early".to_string();
        let model = Model {
            propositions: vec![p1, p2],
            concerns: vec![concern("early"), concern("late")],
            ..Model::default()
        };
        let formulas = raise_formulas(&model);
        let names: Vec<&str> = formulas
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["early", "late"]);
    }
}
