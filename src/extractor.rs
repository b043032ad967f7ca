//! Step extraction
//!
//! Walks a parsed computation body and produces the ordered sequence of
//! dependency-annotated steps plus the set of declared return variables.

use crate::error::StepwiseError;
use crate::parser;
use crate::path::{ReasoningPath, ReasoningStep};
use crate::semantic::Stmt;
use std::collections::BTreeSet;

/// Extract a reasoning path from the textual body of a computation.
///
/// For each single-target assignment, in source order, the step records the
/// assigned variable, the canonical text of its right-hand side, the ids of
/// earlier steps it depends on, and the declared parameters it reads. A name
/// that is neither a declared parameter nor a previously defined variable is
/// dropped silently. Identical source always yields identical ids,
/// dependency sets and return variables.
pub fn extract(
    source: &str,
    parameter_names: &[String],
) -> Result<ReasoningPath, StepwiseError> {
    let stmts = parser::parse_body(source)?;
    Ok(build_path(&stmts, parameter_names))
}

/// Extract a reasoning path from a full `def name(params):` computation
pub fn extract_function(source: &str) -> Result<ReasoningPath, StepwiseError> {
    let function = parser::parse_function(source)?;
    Ok(build_path(&function.body, &function.params))
}

pub(crate) fn build_path(stmts: &[Stmt], parameter_names: &[String]) -> ReasoningPath {
    let params: BTreeSet<&str> = parameter_names.iter().map(String::as_str).collect();
    let mut path = ReasoningPath::new();
    let mut return_vars: BTreeSet<String> = BTreeSet::new();
    let mut next_id = 1;

    for stmt in stmts {
        match stmt {
            Stmt::Assign { target, value } => {
                let mut dependencies: BTreeSet<usize> = BTreeSet::new();
                let mut dependencies_input: BTreeSet<String> = BTreeSet::new();
                for name in value.identifiers() {
                    if name == *target {
                        continue;
                    }
                    if params.contains(name.as_str()) {
                        dependencies_input.insert(name);
                    } else if let Some(step) = path.step_by_var(&name) {
                        dependencies.insert(step.step_id);
                    }
                }
                path.push_step(ReasoningStep {
                    step_id: next_id,
                    variable: target.clone(),
                    expression: value.to_string(),
                    dependencies: dependencies.into_iter().collect(),
                    dependencies_input: dependencies_input.into_iter().collect(),
                });
                next_id += 1;
            }
            Stmt::Return { value: Some(expr) } => {
                if let Some(name) = expr.as_bare_identifier() {
                    return_vars.insert(name.to_string());
                }
            }
            Stmt::Return { value: None } | Stmt::Skipped { .. } => {}
        }
    }

    path.set_return_vars(return_vars);
    path
}
