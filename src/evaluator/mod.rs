//! Evaluation of reasoning paths over a factual assignment
//!
//! Executes a path's steps in order against a parameter binding, re-parsing
//! each step's canonical expression text. Used to verify that a reconstructed
//! computation agrees with an expected value, and that simplification never
//! changes an observable return value.

pub mod operations;

use crate::error::StepwiseError;
use crate::parser;
use crate::path::ReasoningPath;
use crate::semantic::{Expr, ExprKind, UnaryOp};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Parameter name -> value binding
pub type Binding = BTreeMap<String, Decimal>;

/// Comparison tolerance for verification checks
pub fn default_tolerance() -> Decimal {
    // 1e-6, the tolerance used when matching sampled computations
    Decimal::new(1, 6)
}

/// Convert a JSON-style float assignment into a Decimal binding
pub fn binding_from_floats(
    assignment: &BTreeMap<String, f64>,
) -> Result<Binding, StepwiseError> {
    let mut binding = Binding::new();
    for (name, value) in assignment {
        let decimal = Decimal::from_f64_retain(*value).ok_or_else(|| {
            StepwiseError::Evaluation(format!(
                "Value {} for '{}' cannot be represented",
                value, name
            ))
        })?;
        binding.insert(name.clone(), decimal);
    }
    Ok(binding)
}

/// Evaluate a single expression in an environment of bound names
pub fn evaluate_expression(
    expr: &Expr,
    env: &BTreeMap<String, Decimal>,
) -> Result<Decimal, StepwiseError> {
    match &expr.kind {
        ExprKind::Identifier(name) => env.get(name).copied().ok_or_else(|| {
            StepwiseError::Evaluation(format!("Unknown name '{}'", name))
        }),
        ExprKind::Number(value) => Ok(*value),
        ExprKind::Binary(left, op, right) => {
            let left = evaluate_expression(left, env)?;
            let right = evaluate_expression(right, env)?;
            operations::number_arithmetic(left, *op, right)
        }
        ExprKind::Unary(op, operand) => {
            let value = evaluate_expression(operand, env)?;
            match op {
                UnaryOp::Negate => Ok(-value),
                UnaryOp::Plus => Ok(value),
            }
        }
        ExprKind::Call(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate_expression(arg, env)?);
            }
            operations::builtin_call(name, &values)
        }
        ExprKind::Subscript(_, _) => Err(StepwiseError::Evaluation(
            "Subscripting is not supported in numeric evaluation".to_string(),
        )),
    }
}

/// Execute a path's steps in order and return the value of every declared
/// return variable.
///
/// Each step's canonical expression text is re-parsed, which exercises the
/// round-trip guarantee of the canonical rendering.
pub fn evaluate_path(
    path: &ReasoningPath,
    binding: &Binding,
) -> Result<BTreeMap<String, Decimal>, StepwiseError> {
    let mut env: BTreeMap<String, Decimal> = binding.clone();
    for step in path.steps() {
        let expr = parser::parse_expression(&step.expression).map_err(|e| {
            StepwiseError::Engine(format!(
                "Step {} expression '{}' failed to re-parse: {}",
                step.step_id, step.expression, e
            ))
        })?;
        let value = evaluate_expression(&expr, &env)?;
        env.insert(step.variable.clone(), value);
    }

    let mut results = BTreeMap::new();
    for var in path.return_vars() {
        let value = env.get(var).copied().ok_or_else(|| {
            StepwiseError::Evaluation(format!("Unknown return variable '{}'", var))
        })?;
        results.insert(var.clone(), value);
    }
    Ok(results)
}

/// Check the path's output against an expected value.
///
/// Passes when any declared return variable evaluates within `tolerance` of
/// `expected`; otherwise surfaces an evaluation mismatch carrying the closest
/// actual value.
pub fn check_expected(
    path: &ReasoningPath,
    binding: &Binding,
    expected: Decimal,
    tolerance: Decimal,
) -> Result<(), StepwiseError> {
    let results = evaluate_path(path, binding)?;
    if results.is_empty() {
        return Err(StepwiseError::Evaluation(
            "Path has no return variables to check".to_string(),
        ));
    }

    let mut closest: Option<Decimal> = None;
    for value in results.values() {
        let difference = (*value - expected).abs();
        if difference <= tolerance {
            return Ok(());
        }
        let closer = match closest {
            Some(best) => difference < (best - expected).abs(),
            None => true,
        };
        if closer {
            closest = Some(*value);
        }
    }

    Err(StepwiseError::EvaluationMismatch {
        expected,
        actual: closest.unwrap_or_default(),
        tolerance,
    })
}

/// Pull the expected answer out of free-form reasoning text.
///
/// Prefers the `#### <number>` marker; falls back to the last number in the
/// text. Dollar signs and thousands separators are stripped.
pub fn extract_answer(text: &str) -> Option<Decimal> {
    let cleaned = text.replace('$', "");

    let marker = Regex::new(r"#### (-?[0-9.,]+)").ok()?;
    if let Some(captures) = marker.captures(&cleaned) {
        let matched = captures.get(1)?.as_str().replace(',', "");
        if let Some(value) = parse_answer(&matched) {
            return Some(value);
        }
    }

    let number = Regex::new(r"-?[0-9]+\.?[0-9]*").ok()?;
    let last = number.find_iter(&cleaned).last()?;
    parse_answer(last.as_str())
}

fn parse_answer(text: &str) -> Option<Decimal> {
    let trimmed = text.trim().trim_end_matches('.');
    trimmed.parse::<Decimal>().ok()
}
