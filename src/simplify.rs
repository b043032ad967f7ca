//! Path canonicalization
//!
//! Removes pure-alias steps and steps unreachable from the declared return
//! variables, then re-indexes the survivors. The input path is never mutated;
//! a new, independently valid path is returned.

use crate::parser;
use crate::path::{ReasoningPath, ReasoningStep};
use std::collections::{BTreeMap, BTreeSet, HashMap};

struct IntermediateStep {
    old_id: usize,
    variable: String,
    expression: String,
    dependencies: BTreeSet<usize>,
    dependencies_input: Vec<String>,
}

/// Simplify a path: alias elimination, dependency rewriting, dead-code
/// elimination and re-indexing.
///
/// A step is a pure alias when its expression is nothing more than a bare
/// reference to one known symbol (a step variable or an input parameter).
/// Alias chains resolve transitively; surviving expressions and dependency
/// edges are rewritten to reference the ultimate sources directly. Steps not
/// reachable from a declared return variable are dropped, and survivors are
/// renumbered 1..n in their original encounter order.
///
/// Returns an equivalent path unchanged when there are no steps or no
/// declared return variables. Applying `simplify` to its own output yields a
/// structurally identical path.
pub fn simplify(path: &ReasoningPath) -> ReasoningPath {
    if path.is_empty() || path.return_vars().is_empty() {
        return path.clone();
    }

    let input_names = path.input_names();

    // Alias detection: variable -> ultimate non-alias source
    let mut alias_map: HashMap<String, String> = HashMap::new();
    let mut redundant: BTreeSet<usize> = BTreeSet::new();
    for step in path.steps() {
        let Some(aliased) = bare_identifier(&step.expression) else {
            continue;
        };
        let known = path.step_by_var(&aliased).is_some() || input_names.contains(&aliased);
        if known {
            redundant.insert(step.step_id);
            let source = alias_map
                .get(&aliased)
                .cloned()
                .unwrap_or_else(|| aliased.clone());
            alias_map.insert(step.variable.clone(), source);
        }
    }
    resolve_alias_chains(&mut alias_map);

    // Dependency and expression rewriting for every non-alias step
    let mut intermediates: Vec<IntermediateStep> = Vec::new();
    for step in path.steps() {
        if redundant.contains(&step.step_id) {
            continue;
        }

        let mut dependencies: BTreeSet<usize> = BTreeSet::new();
        for &dep_id in &step.dependencies {
            if !redundant.contains(&dep_id) {
                dependencies.insert(dep_id);
                continue;
            }
            // Dependency on an alias: follow it to the defining step of its
            // resolved source; a source that is an input parameter has no
            // step and the edge disappears
            let Some(dep_step) = path.step(dep_id) else {
                continue;
            };
            let resolved = alias_map
                .get(&dep_step.variable)
                .unwrap_or(&dep_step.variable);
            if let Some(final_step) = path.step_by_var(resolved) {
                if !redundant.contains(&final_step.step_id) {
                    dependencies.insert(final_step.step_id);
                }
            }
        }

        let (expression, dependencies_input) = rewrite_expression(step, &alias_map, &input_names);
        intermediates.push(IntermediateStep {
            old_id: step.step_id,
            variable: step.variable.clone(),
            expression,
            dependencies,
            dependencies_input,
        });
    }

    // Reachability: backward traversal from the steps defining the
    // alias-resolved return variables
    let by_old_id: BTreeMap<usize, usize> = intermediates
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.old_id, idx))
        .collect();
    let mut reachable: BTreeSet<usize> = BTreeSet::new();
    let mut queue: Vec<usize> = Vec::new();
    for ret in path.return_vars() {
        let resolved = alias_map.get(ret).unwrap_or(ret);
        if let Some(step) = path.step_by_var(resolved) {
            if by_old_id.contains_key(&step.step_id) && reachable.insert(step.step_id) {
                queue.push(step.step_id);
            }
        }
    }
    while let Some(id) = queue.pop() {
        let idx = by_old_id[&id];
        for &dep in &intermediates[idx].dependencies {
            if by_old_id.contains_key(&dep) && reachable.insert(dep) {
                queue.push(dep);
            }
        }
    }

    // Re-indexing: survivors keep their encounter order and receive dense
    // sequential ids starting at 1
    let mut id_map: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next_id = 1;
    for inter in &intermediates {
        if reachable.contains(&inter.old_id) {
            id_map.insert(inter.old_id, next_id);
            next_id += 1;
        }
    }

    let mut simplified = ReasoningPath::new();
    for inter in &intermediates {
        let Some(&new_id) = id_map.get(&inter.old_id) else {
            continue;
        };
        let dependencies: Vec<usize> = inter
            .dependencies
            .iter()
            .filter_map(|dep| id_map.get(dep).copied())
            .collect();
        simplified.push_step(ReasoningStep {
            step_id: new_id,
            variable: inter.variable.clone(),
            expression: inter.expression.clone(),
            dependencies,
            dependencies_input: inter.dependencies_input.clone(),
        });
    }

    // Return variables resolve through the alias map: an alias name would
    // dangle once its defining step is gone
    let resolved_returns: BTreeSet<String> = path
        .return_vars()
        .iter()
        .map(|ret| alias_map.get(ret).cloned().unwrap_or_else(|| ret.clone()))
        .collect();
    simplified.set_return_vars(resolved_returns);
    simplified
}

fn bare_identifier(expression: &str) -> Option<String> {
    parser::parse_expression(expression)
        .ok()
        .and_then(|expr| expr.as_bare_identifier().map(str::to_string))
}

fn resolve_alias_chains(alias_map: &mut HashMap<String, String>) {
    let keys: Vec<String> = alias_map.keys().cloned().collect();
    for key in keys {
        let mut source = alias_map[&key].clone();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        while let Some(next) = alias_map.get(&source) {
            if *next == source || !seen.insert(source.clone()) {
                break;
            }
            source = next.clone();
        }
        alias_map.insert(key, source);
    }
}

/// Rewrite a step's canonical expression through the alias map and recompute
/// which input parameters the rewritten text references
fn rewrite_expression(
    step: &ReasoningStep,
    alias_map: &HashMap<String, String>,
    input_names: &BTreeSet<String>,
) -> (String, Vec<String>) {
    match parser::parse_expression(&step.expression) {
        Ok(expr) => {
            let rewritten = expr.rename_identifiers(alias_map);
            let inputs: Vec<String> = rewritten
                .identifiers()
                .into_iter()
                .filter(|name| input_names.contains(name) && *name != step.variable)
                .collect();
            (rewritten.to_string(), inputs)
        }
        // Canonical text always re-parses for extracted paths; keep foreign
        // step text untouched rather than guessing
        Err(_) => (step.expression.clone(), step.dependencies_input.clone()),
    }
}
