//! Topological layering of reasoning paths
//!
//! Computes a deterministic layered ordering of steps from their dependency
//! edges. Levels are derived on demand and never stored on the path.

use crate::path::{ReasoningPath, ReasoningStep};
use serde::de::Deserializer;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One layer of the topological ordering
///
/// Serialized as a `[level, [step, ...]]` pair to match the persisted level
/// sequence format.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub level: usize,
    pub steps: Vec<ReasoningStep>,
}

/// Ordered list of levels, ascending by level, each inner list ascending by
/// step id
pub type LevelSequence = Vec<Level>;

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.level)?;
        tuple.serialize_element(&self.steps)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (level, steps) = <(usize, Vec<ReasoningStep>)>::deserialize(deserializer)?;
        Ok(Level { level, steps })
    }
}

/// Raised when leveling could not account for every step of the path.
///
/// Dependencies only ever point to strictly earlier steps, so this should
/// never occur for extracted paths; it indicates a hand-built path violated
/// that invariant. The partial result is still returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphIntegrityWarning {
    pub expected_steps: usize,
    pub leveled_steps: usize,
    pub missing_step_ids: Vec<usize>,
}

impl fmt::Display for GraphIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Topological leveling placed {} of {} steps; unplaced step ids: {:?}",
            self.leveled_steps, self.expected_steps, self.missing_step_ids
        )
    }
}

/// Result of leveling a path: the layers plus an integrity warning when the
/// dependency graph could not be fully scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct Leveling {
    pub levels: LevelSequence,
    pub warning: Option<GraphIntegrityWarning>,
}

impl Leveling {
    pub fn is_complete(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_levels(self) -> LevelSequence {
        self.levels
    }
}

/// Compute the layered topological ordering of a path.
///
/// Kahn-style scheduling over the dependency edges internal to the path;
/// edges to input parameters are not step-to-step edges and are ignored. The
/// frontier is seeded with all zero-in-degree steps in ascending step id
/// order, and every successive frontier is visited in ascending step id order
/// as well, so the result is deterministic.
pub fn topological_levels(path: &ReasoningPath) -> Leveling {
    let known: BTreeSet<usize> = path.steps().iter().map(|s| s.step_id).collect();
    let mut in_degree: BTreeMap<usize, usize> = known.iter().map(|&id| (id, 0)).collect();
    let mut dependents: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for step in path.steps() {
        for &dep in &step.dependencies {
            if known.contains(&dep) {
                dependents.entry(dep).or_default().push(step.step_id);
                if let Some(degree) = in_degree.get_mut(&step.step_id) {
                    *degree += 1;
                }
            }
        }
    }

    let mut frontier: Vec<usize> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut levels: LevelSequence = Vec::new();
    let mut leveled = 0;
    let mut depth = 0;

    while !frontier.is_empty() {
        let mut steps_in_level = Vec::new();
        let mut next = Vec::new();
        for &id in &frontier {
            if let Some(step) = path.step(id) {
                steps_in_level.push(step.clone());
            }
            leveled += 1;
            if let Some(children) = dependents.get(&id) {
                for &child in children {
                    if let Some(degree) = in_degree.get_mut(&child) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.push(child);
                        }
                    }
                }
            }
        }
        levels.push(Level {
            level: depth,
            steps: steps_in_level,
        });
        next.sort_unstable();
        next.dedup();
        frontier = next;
        depth += 1;
    }

    let warning = if leveled != path.len() {
        let placed: BTreeSet<usize> = levels
            .iter()
            .flat_map(|level| level.steps.iter().map(|s| s.step_id))
            .collect();
        Some(GraphIntegrityWarning {
            expected_steps: path.len(),
            leveled_steps: leveled,
            missing_step_ids: known.difference(&placed).copied().collect(),
        })
    } else {
        None
    };

    Leveling { levels, warning }
}
