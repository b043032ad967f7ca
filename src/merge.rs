//! Cross-path node merging
//!
//! Collapses the steps of many leveled paths into one graph keyed by
//! (variable, expression), so a consumer can draw equivalent steps from
//! different computations as a single node. Each node carries the set of
//! source identifiers that produced it and its topological level for spatial
//! layout. No rendering happens here.

use crate::analysis::Level;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Input,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Step,
    Input,
}

/// One merged node: a step shared by every source whose path contains an
/// equivalent (variable, expression) pair, or an input parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedNode {
    pub id: String,
    pub variable: String,
    pub expression: String,
    pub kind: NodeKind,
    /// Source identifiers (e.g. "ground_truth", "sample_3"), sorted
    pub sources: Vec<String>,
    /// Highest topological level this step occupies across its sources;
    /// absent for input nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct MergedGraph {
    pub nodes: Vec<MergedNode>,
    pub edges: Vec<MergedEdge>,
}

struct NodeBuilder {
    variable: String,
    expression: String,
    kind: NodeKind,
    sources: BTreeSet<String>,
    level: Option<usize>,
}

/// Merge the level sequences of many labeled paths over a shared set of input
/// parameters.
///
/// Node ids are assigned in first-encounter order, which is deterministic for
/// a fixed argument order.
pub fn merge_level_sequences(
    input_names: &[String],
    paths: &[(String, &[Level])],
) -> MergedGraph {
    fn node_for(
        builders: &mut Vec<NodeBuilder>,
        index: &mut HashMap<(bool, String, String), usize>,
        kind: NodeKind,
        variable: &str,
        expression: &str,
    ) -> usize {
        let key = (
            matches!(kind, NodeKind::Input),
            variable.to_string(),
            expression.to_string(),
        );
        if let Some(&idx) = index.get(&key) {
            return idx;
        }
        let idx = builders.len();
        builders.push(NodeBuilder {
            variable: variable.to_string(),
            expression: expression.to_string(),
            kind,
            sources: BTreeSet::new(),
            level: None,
        });
        index.insert(key, idx);
        idx
    }

    let mut builders: Vec<NodeBuilder> = Vec::new();
    let mut index: HashMap<(bool, String, String), usize> = HashMap::new();
    let mut edge_set: BTreeSet<(usize, usize, bool)> = BTreeSet::new();

    for (label, levels) in paths {
        // Input parameters are shared across every path of the batch
        let mut input_nodes: HashMap<&str, usize> = HashMap::new();
        for name in input_names {
            let expression = format!("Input: {}", name);
            let idx = node_for(&mut builders, &mut index, NodeKind::Input, name, &expression);
            builders[idx].sources.insert(label.clone());
            input_nodes.insert(name.as_str(), idx);
        }

        // First pass: register every step of this path as a merged node
        let mut local_steps: HashMap<usize, usize> = HashMap::new();
        for level in *levels {
            for step in &level.steps {
                let idx = node_for(
                    &mut builders,
                    &mut index,
                    NodeKind::Step,
                    &step.variable,
                    &step.expression,
                );
                builders[idx].sources.insert(label.clone());
                let best = builders[idx].level.map_or(level.level, |l| l.max(level.level));
                builders[idx].level = Some(best);
                local_steps.insert(step.step_id, idx);
            }
        }

        // Second pass: dependency edges, resolved through this path's step ids
        for level in *levels {
            for step in &level.steps {
                let Some(&target) = local_steps.get(&step.step_id) else {
                    continue;
                };
                for dep in &step.dependencies {
                    if let Some(&source) = local_steps.get(dep) {
                        edge_set.insert((source, target, false));
                    }
                }
                for input in &step.dependencies_input {
                    if let Some(&source) = input_nodes.get(input.as_str()) {
                        edge_set.insert((source, target, true));
                    }
                }
            }
        }
    }

    let nodes: Vec<MergedNode> = builders
        .into_iter()
        .enumerate()
        .map(|(i, builder)| MergedNode {
            id: format!("node_{}", i),
            variable: builder.variable,
            expression: builder.expression,
            kind: builder.kind,
            sources: builder.sources.into_iter().collect(),
            level: builder.level,
        })
        .collect();

    let edges: Vec<MergedEdge> = edge_set
        .into_iter()
        .map(|(source, target, is_input)| MergedEdge {
            source: nodes[source].id.clone(),
            target: nodes[target].id.clone(),
            kind: if is_input { EdgeKind::Input } else { EdgeKind::Step },
        })
        .collect();

    MergedGraph { nodes, edges }
}
