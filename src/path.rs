use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One assignment of a computation, with its canonical expression text and
/// resolved dependencies
///
/// `dependencies` holds ids of earlier steps in the same path;
/// `dependencies_input` holds names drawn from the computation's declared
/// parameter list. Both are deduplicated and sorted. The serialized field
/// names are consumed by downstream tooling and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step_id: usize,
    pub variable: String,
    pub expression: String,
    pub dependencies: Vec<usize>,
    pub dependencies_input: Vec<String>,
}

impl fmt::Display for ReasoningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {}: {} = {}",
            self.step_id, self.variable, self.expression
        )?;
        if !self.dependencies.is_empty() {
            let deps: Vec<String> = self
                .dependencies
                .iter()
                .map(|id| format!("Step {}", id))
                .collect();
            write!(f, " (depends on {})", deps.join(", "))?;
        }
        if !self.dependencies_input.is_empty() {
            write!(f, " (input deps: {})", self.dependencies_input.join(", "))?;
        }
        Ok(())
    }
}

/// The ordered collection of steps for one computation, plus its declared
/// return variables
///
/// Built incrementally by appending steps; the symbol table always reflects
/// the latest assignment to a name. A path is never mutated after
/// construction completes; `simplify` derives a new path instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningPath {
    steps: Vec<ReasoningStep>,
    symbol_table: HashMap<String, usize>,
    return_vars: Vec<String>,
}

impl ReasoningPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, registering it as the latest definition of its variable
    pub fn push_step(&mut self, step: ReasoningStep) {
        self.symbol_table
            .insert(step.variable.clone(), step.step_id);
        self.steps.push(step);
    }

    /// Replace the declared return variables (deduplicated and sorted)
    pub fn set_return_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = String>,
    {
        let unique: BTreeSet<String> = vars.into_iter().collect();
        self.return_vars = unique.into_iter().collect();
    }

    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn return_vars(&self) -> &[String] {
        &self.return_vars
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Look up a step by id
    pub fn step(&self, step_id: usize) -> Option<&ReasoningStep> {
        // Ids are dense 1..n for extracted and simplified paths
        if step_id >= 1 {
            if let Some(step) = self.steps.get(step_id - 1) {
                if step.step_id == step_id {
                    return Some(step);
                }
            }
        }
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Look up the latest step defining a variable
    pub fn step_by_var(&self, variable: &str) -> Option<&ReasoningStep> {
        self.symbol_table
            .get(variable)
            .and_then(|&id| self.step(id))
    }

    /// All parameter names referenced anywhere in the path
    pub fn input_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for step in &self.steps {
            names.extend(step.dependencies_input.iter().cloned());
        }
        names
    }

    /// Render the path back to computation source: one assignment per step
    /// followed by one return statement per declared return variable
    pub fn render_source(&self, name: &str, params: &[String]) -> String {
        let mut out = format!("def {}({}):\n", name, params.join(", "));
        for step in &self.steps {
            out.push_str(&format!("    {} = {}\n", step.variable, step.expression));
        }
        for var in &self.return_vars {
            out.push_str(&format!("    return {}\n", var));
        }
        out
    }
}

impl Serialize for ReasoningPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.steps.len()))?;
        for step in &self.steps {
            seq.serialize_element(step)?;
        }
        seq.end()
    }
}

impl fmt::Display for ReasoningPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
