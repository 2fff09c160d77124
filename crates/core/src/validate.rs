//! Structural validation of a laboratory model.
//!
//! All checks are pure and advisory: they produce a severity-tagged
//! diagnostic list and never fail. Whether errors block downstream use
//! of the model is the caller's policy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ast::Expr;
use crate::model::{Model, Proposition, Value};
use crate::refgraph::{condition_cycles, used_concerns, used_entities};

// ──────────────────────────────────────────────
// Diagnostics
// ──────────────────────────────────────────────

/// Severity of a validation diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One validation finding, attributed to the construct it concerns.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub construct_kind: String,
    pub construct_id: String,
    pub message: String,
}

impl Diagnostic {
    fn new(severity: Severity, kind: &str, id: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            severity,
            construct_kind: kind.to_owned(),
            construct_id: id.to_owned(),
            message: message.into(),
        }
    }

    pub fn error(kind: &str, id: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(Severity::Error, kind, id, message)
    }

    pub fn warning(kind: &str, id: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(Severity::Warning, kind, id, message)
    }

    pub fn info(kind: &str, id: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(Severity::Info, kind, id, message)
    }
}

/// True when any diagnostic in the list is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.severity == Severity::Error)
}

// ──────────────────────────────────────────────
// Validation entry point
// ──────────────────────────────────────────────

/// Run all structural checks over a model.
pub fn validate(model: &Model) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    check_unique_entity_names(model, &mut out);
    check_unique_concern_names(model, &mut out);
    for prop in &model.propositions {
        check_clause_defaults(prop, &mut out);
        check_clause_value_types(prop, &mut out);
    }
    check_statement_values(model, &mut out);
    check_condition_recursion(model, &mut out);
    check_unused_concerns(model, &mut out);
    check_unused_conditions(model, &mut out);
    check_lab_info(model, &mut out);

    out
}

// ──────────────────────────────────────────────
// Individual checks
// ──────────────────────────────────────────────

/// Condition and proposition names share one namespace and must be
/// unique, case-sensitively. Every occurrence of a colliding name is
/// reported.
fn check_unique_entity_names(model: &Model, out: &mut Vec<Diagnostic>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cond in &model.conditions {
        *counts.entry(cond.name.as_str()).or_default() += 1;
    }
    for prop in &model.propositions {
        *counts.entry(prop.name.as_str()).or_default() += 1;
    }

    for cond in &model.conditions {
        if counts[cond.name.as_str()] > 1 {
            out.push(Diagnostic::error(
                "condition",
                &cond.name,
                format!(
                    "condition has non-unique name '{}'; all condition and proposition names must be unique",
                    cond.name
                ),
            ));
        }
    }
    for prop in &model.propositions {
        if counts[prop.name.as_str()] > 1 {
            out.push(Diagnostic::error(
                "proposition",
                &prop.name,
                format!(
                    "proposition has non-unique name '{}'; all condition and proposition names must be unique",
                    prop.name
                ),
            ));
        }
    }
}

fn check_unique_concern_names(model: &Model, out: &mut Vec<Diagnostic>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for concern in &model.concerns {
        *counts.entry(concern.name.as_str()).or_default() += 1;
    }
    for concern in &model.concerns {
        if counts[concern.name.as_str()] > 1 {
            out.push(Diagnostic::error(
                "concern",
                &concern.name,
                format!("concern has non-unique name '{}'", concern.name),
            ));
        }
    }
}

/// A single clause is implicitly default (info); with two or more
/// clauses exactly one explicit default is required.
fn check_clause_defaults(prop: &Proposition, out: &mut Vec<Diagnostic>) {
    if prop.clauses.len() == 1 {
        if !prop.clauses[0].default {
            out.push(Diagnostic::info(
                "proposition",
                &prop.name,
                format!(
                    "value '{}' of proposition '{}' is assumed to be default",
                    prop.clauses[0].value, prop.name
                ),
            ));
        }
        return;
    }

    let defaults: Vec<&Value> = prop
        .clauses
        .iter()
        .filter(|clause| clause.default)
        .map(|clause| &clause.value)
        .collect();

    if defaults.is_empty() && !prop.clauses.is_empty() {
        out.push(Diagnostic::error(
            "proposition",
            &prop.name,
            "proposition has no default value",
        ));
    } else if let Some(second) = defaults.get(1) {
        out.push(Diagnostic::error(
            "proposition",
            &prop.name,
            format!(
                "proposition has multiple default values; '{}' is also marked default",
                second
            ),
        ));
    }
}

/// All clause values of one proposition must share one runtime type.
fn check_clause_value_types(prop: &Proposition, out: &mut Vec<Diagnostic>) {
    let Some(expected) = prop.value_type() else {
        return;
    };
    for clause in &prop.clauses {
        if clause.value.value_type() != expected {
            out.push(Diagnostic::error(
                "proposition",
                &prop.name,
                format!(
                    "clause value '{}' does not match the proposition's value type",
                    clause.value
                ),
            ));
            return;
        }
    }
}

/// A statement's stated value must belong to the referenced entity's
/// domain: booleans for conditions, a declared clause value for
/// propositions. Dangling references are reported here and tolerated
/// everywhere else.
fn check_statement_values(model: &Model, out: &mut Vec<Diagnostic>) {
    for cond in &model.conditions {
        walk_statements(&cond.expression, model, "condition", &cond.name, out);
    }
    for prop in &model.propositions {
        for clause in &prop.clauses {
            for raise in &clause.raises {
                if let Some(guard) = &raise.condition {
                    walk_statements(guard, model, "proposition", &prop.name, out);
                }
            }
        }
        for rule in &prop.disable {
            walk_statements(&rule.condition, model, "proposition", &prop.name, out);
        }
    }
}

fn walk_statements(
    expr: &Expr,
    model: &Model,
    kind: &str,
    id: &str,
    out: &mut Vec<Diagnostic>,
) {
    match expr {
        Expr::Or { left, right } | Expr::And { left, right } => {
            walk_statements(left, model, kind, id, out);
            walk_statements(right, model, kind, id, out);
        }
        Expr::Not { inner } | Expr::Group { inner } => {
            walk_statements(inner, model, kind, id, out)
        }
        Expr::Statement {
            reference, value, ..
        } => {
            if model.condition(reference).is_some() {
                if !matches!(value, Value::Bool(_)) {
                    out.push(Diagnostic::error(
                        kind,
                        id,
                        format!(
                            "stated value '{}' is not a valid value of condition '{}'",
                            value, reference
                        ),
                    ));
                }
            } else if let Some(target) = model.proposition(reference) {
                if target.clause_for(value).is_none() {
                    out.push(Diagnostic::error(
                        kind,
                        id,
                        format!(
                            "stated value '{}' is not a valid value of proposition '{}'",
                            value, reference
                        ),
                    ));
                }
            } else {
                out.push(Diagnostic::error(
                    kind,
                    id,
                    format!("statement references unknown name '{}'", reference),
                ));
            }
        }
    }
}

fn check_condition_recursion(model: &Model, out: &mut Vec<Diagnostic>) {
    for name in condition_cycles(model) {
        out.push(Diagnostic::error(
            "condition",
            &name,
            "recursion is not allowed here",
        ));
    }
}

fn check_unused_concerns(model: &Model, out: &mut Vec<Diagnostic>) {
    let used = used_concerns(model);
    for concern in &model.concerns {
        if !used.contains(&concern.name) {
            out.push(Diagnostic::warning(
                "concern",
                &concern.name,
                "concern is defined but never used",
            ));
        }
    }
}

fn check_unused_conditions(model: &Model, out: &mut Vec<Diagnostic>) {
    let used = used_entities(model);
    for cond in &model.conditions {
        if !used.contains(&cond.name) {
            out.push(Diagnostic::warning(
                "condition",
                &cond.name,
                "condition is defined but never used",
            ));
        }
    }
}

fn check_lab_info(model: &Model, out: &mut Vec<Diagnostic>) {
    let info = &model.laboratory;
    let fields = [
        ("titles", info.titles.len()),
        ("descriptions", info.descriptions.len()),
        ("versions", info.versions.len()),
    ];
    for (field, count) in fields {
        if count > 1 {
            out.push(Diagnostic::error(
                "laboratory",
                field,
                format!("multiple {} for one laboratory are not allowed", field),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clause, Concern, Condition, DisableRule, LabInfo, Raise};

    fn clause(value: Value, default: bool) -> Clause {
        Clause {
            value,
            default,
            raises: Vec::new(),
        }
    }

    fn prop(name: &str, clauses: Vec<Clause>) -> Proposition {
        Proposition {
            name: name.to_string(),
            expression: name.to_string(),
            clauses,
            disable: Vec::new(),
        }
    }

    fn concern(name: &str) -> Concern {
        Concern {
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn errors_of(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
        diags
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    #[test]
    fn duplicate_entity_names_report_every_occurrence() {
        let model = Model {
            conditions: vec![Condition {
                name: "x".to_string(),
                expression: Expr::statement("p", Value::text("a")),
            }],
            propositions: vec![
                prop(
                    "x",
                    vec![
                        clause(Value::text("a"), true),
                        clause(Value::text("b"), false),
                    ],
                ),
                prop("p", vec![clause(Value::text("a"), true)]),
            ],
            ..Model::default()
        };
        let diags = validate(&model);
        let collisions: Vec<_> = diags
            .iter()
            .filter(|d| d.message.contains("non-unique name 'x'"))
            .collect();
        assert_eq!(collisions.len(), 2);
        assert!(collisions.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn duplicate_concern_names_are_errors() {
        let model = Model {
            concerns: vec![concern("k"), concern("k")],
            ..Model::default()
        };
        let diags = validate(&model);
        assert_eq!(
            diags
                .iter()
                .filter(|d| d.construct_kind == "concern" && d.severity == Severity::Error)
                .count(),
            2
        );
    }

    #[test]
    fn single_clause_without_flag_is_informational() {
        let model = Model {
            propositions: vec![prop("p", vec![clause(Value::Bool(true), false)])],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(errors_of(&diags).is_empty());
        assert!(diags
            .iter()
            .any(|d| d.severity == Severity::Info && d.message.contains("assumed to be default")));
    }

    #[test]
    fn missing_default_is_exactly_one_error() {
        let model = Model {
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), false),
                    clause(Value::text("b"), false),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        let defaults: Vec<_> = diags
            .iter()
            .filter(|d| d.message.contains("default value"))
            .collect();
        assert_eq!(defaults.len(), 1);
        assert!(defaults[0].message.contains("no default value"));
    }

    #[test]
    fn extra_defaults_report_once_against_the_second_clause() {
        let model = Model {
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), true),
                    clause(Value::text("c"), true),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        let extra: Vec<_> = diags
            .iter()
            .filter(|d| d.message.contains("default value"))
            .collect();
        assert_eq!(extra.len(), 1);
        assert!(extra[0].message.contains("'b'"));
    }

    #[test]
    fn exactly_one_default_is_clean() {
        let model = Model {
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), false),
                ],
            )],
            ..Model::default()
        };
        assert!(errors_of(&validate(&model)).is_empty());
    }

    #[test]
    fn mixed_clause_types_are_an_error() {
        let model = Model {
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::Bool(true), false),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("does not match the proposition's value type")));
    }

    #[test]
    fn boolean_value_required_for_condition_references() {
        let model = Model {
            conditions: vec![
                Condition {
                    name: "c".to_string(),
                    expression: Expr::statement("p", Value::text("a")),
                },
                Condition {
                    name: "d".to_string(),
                    expression: Expr::statement("c", Value::text("yes")),
                },
            ],
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), false),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("not a valid value of condition 'c'")));
    }

    #[test]
    fn stated_proposition_value_must_be_declared() {
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::statement("p", Value::text("missing")),
            }],
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), false),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("not a valid value of proposition 'p'")));
    }

    #[test]
    fn dangling_reference_is_reported_once_per_statement() {
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::statement("ghost", Value::Bool(true)),
            }],
            ..Model::default()
        };
        let diags = validate(&model);
        assert_eq!(
            diags
                .iter()
                .filter(|d| d.message.contains("unknown name 'ghost'"))
                .count(),
            1
        );
    }

    #[test]
    fn self_recursive_condition_is_always_flagged() {
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::group(Expr::statement("c", Value::Bool(true))),
            }],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags
            .iter()
            .any(|d| d.construct_id == "c" && d.message.contains("recursion")));
    }

    #[test]
    fn indirect_recursion_is_flagged_for_every_participant() {
        let model = Model {
            conditions: vec![
                Condition {
                    name: "a".to_string(),
                    expression: Expr::statement("b", Value::Bool(true)),
                },
                Condition {
                    name: "b".to_string(),
                    expression: Expr::statement("a", Value::Bool(true)),
                },
            ],
            ..Model::default()
        };
        let diags = validate(&model);
        let recursive: Vec<_> = diags
            .iter()
            .filter(|d| d.message.contains("recursion"))
            .collect();
        assert_eq!(recursive.len(), 2);
    }

    #[test]
    fn non_recursive_condition_is_never_flagged() {
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::statement("p", Value::text("a")),
            }],
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), false),
                ],
            )],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(!diags.iter().any(|d| d.message.contains("recursion")));
    }

    #[test]
    fn unused_concern_and_condition_are_warnings() {
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::statement("p", Value::text("a")),
            }],
            propositions: vec![prop(
                "p",
                vec![
                    clause(Value::text("a"), true),
                    clause(Value::text("b"), false),
                ],
            )],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags.iter().any(|d| d.construct_kind == "concern"
            && d.severity == Severity::Warning
            && d.message.contains("never used")));
        assert!(diags.iter().any(|d| d.construct_kind == "condition"
            && d.severity == Severity::Warning
            && d.message.contains("never used")));
    }

    #[test]
    fn referenced_concern_is_used_even_when_unreachable() {
        // Use vs. reachability stay distinct: a raise on any clause
        // counts as use, whether or not that clause can ever hold.
        let mut raising = prop(
            "p",
            vec![
                clause(Value::text("a"), true),
                clause(Value::text("b"), false),
            ],
        );
        raising.clauses[1].raises.push(Raise {
            concern: "k".to_string(),
            condition: None,
        });
        raising.disable.push(DisableRule {
            condition: Expr::statement("p", Value::text("a")),
            message: "locked".to_string(),
        });
        let model = Model {
            propositions: vec![raising],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(!diags
            .iter()
            .any(|d| d.construct_kind == "concern" && d.message.contains("never used")));
    }

    #[test]
    fn repeated_metadata_fields_are_errors() {
        let model = Model {
            laboratory: LabInfo {
                titles: vec!["one".to_string(), "two".to_string()],
                descriptions: Vec::new(),
                versions: Vec::new(),
                authors: vec!["a".to_string(), "b".to_string()],
            },
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags
            .iter()
            .any(|d| d.construct_kind == "laboratory" && d.message.contains("multiple titles")));
        // A single authors list with several names is fine.
        assert!(!diags.iter().any(|d| d.message.contains("authors")));
    }

    #[test]
    fn clean_model_validates_quietly() {
        let mut raising = prop(
            "p",
            vec![
                clause(Value::text("a"), true),
                clause(Value::text("b"), false),
            ],
        );
        raising.clauses[1].raises.push(Raise {
            concern: "k".to_string(),
            condition: Some(Expr::statement("c", Value::Bool(true))),
        });
        let model = Model {
            conditions: vec![Condition {
                name: "c".to_string(),
                expression: Expr::statement("p", Value::text("a")),
            }],
            propositions: vec![raising],
            concerns: vec![concern("k")],
            ..Model::default()
        };
        let diags = validate(&model);
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
        assert!(!has_errors(&diags));
    }
}
