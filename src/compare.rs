//! Structural comparison of reasoning paths
//!
//! Steps are aligned strictly by variable name. Two steps with the same name
//! but unrelated computations are reported as changed, and two steps with
//! different names computing the same value are reported as unrelated. This
//! name-based matching is a documented limitation, not a defect to be
//! corrected here.

use crate::path::{ReasoningPath, ReasoningStep};
use serde::Serialize;
use std::collections::BTreeMap;

/// The comparable shape of one step: its canonical expression and the names
/// it depends on (step variables and input parameters, sorted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSignature {
    pub expression: String,
    pub depends_on: Vec<String>,
    pub depends_on_input: Vec<String>,
}

/// A variable present in both paths whose expression or dependency shape
/// differs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableChange {
    pub variable: String,
    pub left: StepSignature,
    pub right: StepSignature,
}

/// Diff report between two paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct PathDiff {
    pub changed: Vec<VariableChange>,
    pub only_in_left: Vec<String>,
    pub only_in_right: Vec<String>,
}

impl PathDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.only_in_left.is_empty() && self.only_in_right.is_empty()
    }
}

/// Compare two paths by variable-name alignment.
///
/// For each name the latest definition in each path is compared; shadowed
/// earlier definitions do not participate.
pub fn compare(left: &ReasoningPath, right: &ReasoningPath) -> PathDiff {
    let left_vars = latest_definitions(left);
    let right_vars = latest_definitions(right);

    let mut diff = PathDiff::default();

    for (variable, left_step) in &left_vars {
        match right_vars.get(variable) {
            Some(right_step) => {
                let left_sig = signature(left, left_step);
                let right_sig = signature(right, right_step);
                if left_sig != right_sig {
                    diff.changed.push(VariableChange {
                        variable: variable.clone(),
                        left: left_sig,
                        right: right_sig,
                    });
                }
            }
            None => diff.only_in_left.push(variable.clone()),
        }
    }
    for variable in right_vars.keys() {
        if !left_vars.contains_key(variable) {
            diff.only_in_right.push(variable.clone());
        }
    }

    diff
}

fn latest_definitions(path: &ReasoningPath) -> BTreeMap<String, &ReasoningStep> {
    let mut latest: BTreeMap<String, &ReasoningStep> = BTreeMap::new();
    for step in path.steps() {
        latest.insert(step.variable.clone(), step);
    }
    latest
}

fn signature(path: &ReasoningPath, step: &ReasoningStep) -> StepSignature {
    let mut depends_on: Vec<String> = step
        .dependencies
        .iter()
        .filter_map(|&id| path.step(id).map(|s| s.variable.clone()))
        .collect();
    depends_on.sort();
    depends_on.dedup();
    StepSignature {
        expression: step.expression.clone(),
        depends_on,
        depends_on_input: step.dependencies_input.clone(),
    }
}
