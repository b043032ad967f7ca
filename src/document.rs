//! Persisted reasoning-document record shapes and batch processing
//!
//! The serialized field names are consumed by external evaluation and
//! visualization tooling and must not change. The engine consumes only the
//! function sources and the factual assignment; it produces the
//! `reasoning_path_topological_levels` entries.

use crate::analysis::{topological_levels, LevelSequence};
use crate::error::StepwiseError;
use crate::evaluator;
use crate::extractor;
use crate::simplify::simplify;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A batch of computations: one ground-truth function plus sampled variants,
/// with the parameter binding they share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningDocument {
    /// Opaque run configuration, carried through untouched
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub factual_assignment: BTreeMap<String, f64>,
    pub ground_truth_function: FunctionRecord,
    #[serde(default)]
    pub results: Vec<SampleResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub function_str: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reasoning_path_topological_levels: Option<LevelSequence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    pub sample_id: u64,
    pub function: SampleFunction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reasoning_path_topological_levels: Option<LevelSequence>,
    /// Populated when processing this sample failed; the rest of the batch is
    /// unaffected
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleFunction {
    pub function_str: String,
    /// Provenance of the sampled computation, carried through untouched
    #[serde(default)]
    pub source: Value,
}

/// One failed item of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub message: String,
}

/// Extract, simplify and level one computation source.
///
/// An incomplete leveling would mean a violated acyclicity invariant; it is
/// escalated to an error rather than returned as a truncated sequence.
pub fn reasoning_levels(function_str: &str) -> Result<LevelSequence, StepwiseError> {
    let path = extractor::extract_function(function_str)?;
    let simplified = simplify(&path);
    let leveling = topological_levels(&simplified);
    if let Some(warning) = leveling.warning {
        return Err(StepwiseError::Engine(warning.to_string()));
    }
    Ok(leveling.levels)
}

/// Attach `reasoning_path_topological_levels` to the ground-truth function
/// and every sample.
///
/// Failures are per item: a malformed sample is reported and marked, and the
/// rest of the batch is still processed.
pub fn annotate_reasoning_levels(document: &mut ReasoningDocument) -> Vec<ItemFailure> {
    let mut failures = Vec::new();

    match reasoning_levels(&document.ground_truth_function.function_str) {
        Ok(levels) => {
            document.ground_truth_function.reasoning_path_topological_levels = Some(levels);
        }
        Err(e) => failures.push(ItemFailure {
            item: "ground_truth".to_string(),
            message: e.to_string(),
        }),
    }

    for sample in &mut document.results {
        match reasoning_levels(&sample.function.function_str) {
            Ok(levels) => {
                sample.reasoning_path_topological_levels = Some(levels);
                sample.error = None;
            }
            Err(e) => {
                let message = e.to_string();
                sample.error = Some(message.clone());
                failures.push(ItemFailure {
                    item: format!("sample_{}", sample.sample_id),
                    message,
                });
            }
        }
    }

    failures
}

/// Check a computation's output against an expected value under the given
/// factual assignment
pub fn check_function_output(
    function_str: &str,
    assignment: &BTreeMap<String, f64>,
    expected: f64,
) -> Result<(), StepwiseError> {
    let path = extractor::extract_function(function_str)?;
    let binding = evaluator::binding_from_floats(assignment)?;
    let expected = Decimal::from_f64_retain(expected).ok_or_else(|| {
        StepwiseError::Evaluation(format!("Expected value {} cannot be represented", expected))
    })?;
    evaluator::check_expected(&path, &binding, expected, evaluator::default_tolerance())
}

/// Check a computation against the answer stated in free-form reasoning text
pub fn verify_against_reasoning(
    function_str: &str,
    assignment: &BTreeMap<String, f64>,
    reasoning_text: &str,
) -> Result<(), StepwiseError> {
    let expected = evaluator::extract_answer(reasoning_text).ok_or_else(|| {
        StepwiseError::Evaluation("No answer found in reasoning text".to_string())
    })?;
    let path = extractor::extract_function(function_str)?;
    let binding = evaluator::binding_from_floats(assignment)?;
    evaluator::check_expected(&path, &binding, expected, evaluator::default_tolerance())
}
