use crate::error::StepwiseError;
use crate::evaluator::{
    binding_from_floats, check_expected, default_tolerance, evaluate_path, extract_answer, Binding,
};
use crate::extractor::extract;
use rust_decimal::Decimal;
use std::str::FromStr;

fn params(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn binding(pairs: &[(&str, i64)]) -> Binding {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), Decimal::from(*value)))
        .collect()
}

fn eval_one(source: &str, param_names: &[&str], pairs: &[(&str, i64)]) -> Decimal {
    let path = extract(source, &params(param_names)).unwrap();
    let results = evaluate_path(&path, &binding(pairs)).unwrap();
    *results.values().next().unwrap()
}

#[test]
fn test_arithmetic_evaluation() {
    let z = eval_one(
        "x = a + b; y = x; z = y * 2; unused = a - b; return z",
        &["a", "b"],
        &[("a", 3), ("b", 4)],
    );
    assert_eq!(z, Decimal::from(14));
}

#[test]
fn test_division_is_exact_in_decimal() {
    let z = eval_one("z = a / b\nreturn z", &["a", "b"], &[("a", 1), ("b", 8)]);
    assert_eq!(z, Decimal::from_str("0.125").unwrap());
}

#[test]
fn test_division_by_zero_is_an_evaluation_error() {
    let path = extract("z = a / b\nreturn z", &params(&["a", "b"])).unwrap();
    let result = evaluate_path(&path, &binding(&[("a", 1), ("b", 0)]));
    assert!(matches!(result, Err(StepwiseError::Evaluation(_))));
}

#[test]
fn test_power_floor_division_and_modulo() {
    assert_eq!(
        eval_one("z = a ** b\nreturn z", &["a", "b"], &[("a", 2), ("b", 10)]),
        Decimal::from(1024)
    );
    assert_eq!(
        eval_one("z = a // b\nreturn z", &["a", "b"], &[("a", 7), ("b", 2)]),
        Decimal::from(3)
    );
    assert_eq!(
        eval_one("z = a % b\nreturn z", &["a", "b"], &[("a", 7), ("b", 4)]),
        Decimal::from(3)
    );
}

#[test]
fn test_builtin_calls() {
    assert_eq!(
        eval_one("z = min(a, b)\nreturn z", &["a", "b"], &[("a", 3), ("b", 4)]),
        Decimal::from(3)
    );
    assert_eq!(
        eval_one("z = max(a, b, 10)\nreturn z", &["a", "b"], &[("a", 3), ("b", 4)]),
        Decimal::from(10)
    );
    assert_eq!(
        eval_one("z = abs(a - b)\nreturn z", &["a", "b"], &[("a", 3), ("b", 9)]),
        Decimal::from(6)
    );
    assert_eq!(
        eval_one("z = sqrt(a)\nreturn z", &["a"], &[("a", 9)]),
        Decimal::from(3)
    );
    assert_eq!(
        eval_one("z = floor(a / b)\nreturn z", &["a", "b"], &[("a", 7), ("b", 2)]),
        Decimal::from(3)
    );
    assert_eq!(
        eval_one("z = ceil(a / b)\nreturn z", &["a", "b"], &[("a", 7), ("b", 2)]),
        Decimal::from(4)
    );
    assert_eq!(
        eval_one("z = round(a / b, 2)\nreturn z", &["a", "b"], &[("a", 1), ("b", 3)]),
        Decimal::from_str("0.33").unwrap()
    );
}

#[test]
fn test_unknown_function_and_unknown_name_errors() {
    let path = extract("z = mystery(a)\nreturn z", &params(&["a"])).unwrap();
    assert!(matches!(
        evaluate_path(&path, &binding(&[("a", 1)])),
        Err(StepwiseError::Evaluation(_))
    ));

    let path = extract("z = a + 1\nreturn z", &params(&["a"])).unwrap();
    assert!(matches!(
        evaluate_path(&path, &Binding::new()),
        Err(StepwiseError::Evaluation(_))
    ));
}

#[test]
fn test_subscripts_are_not_evaluated() {
    let path = extract("z = xs[0]\nreturn z", &params(&["xs"])).unwrap();
    assert!(matches!(
        evaluate_path(&path, &binding(&[("xs", 5)])),
        Err(StepwiseError::Evaluation(_))
    ));
}

#[test]
fn test_check_expected_within_tolerance() {
    let path = extract("z = a / b\nreturn z", &params(&["a", "b"])).unwrap();
    let inputs = binding(&[("a", 1), ("b", 3)]);
    let expected = Decimal::from_str("0.333333").unwrap();
    assert!(check_expected(&path, &inputs, expected, default_tolerance()).is_ok());
}

#[test]
fn test_check_expected_mismatch_carries_both_values() {
    let path = extract("z = a * b\nreturn z", &params(&["a", "b"])).unwrap();
    let inputs = binding(&[("a", 3), ("b", 4)]);
    let result = check_expected(&path, &inputs, Decimal::from(13), default_tolerance());
    match result {
        Err(StepwiseError::EvaluationMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, Decimal::from(13));
            assert_eq!(actual, Decimal::from(12));
        }
        other => panic!("expected a mismatch, got {:?}", other),
    }
}

#[test]
fn test_binding_from_floats() {
    let assignment = [("a".to_string(), 2.5f64)].into_iter().collect();
    let bound = binding_from_floats(&assignment).unwrap();
    assert_eq!(bound["a"], Decimal::from_str("2.5").unwrap());
}

#[test]
fn test_extract_answer_prefers_the_marker() {
    assert_eq!(
        extract_answer("adds 3 and 4 to get 7\n#### 7"),
        Some(Decimal::from(7))
    );
    assert_eq!(
        extract_answer("The total is $1,200.\n#### $1,200"),
        Some(Decimal::from(1200))
    );
}

#[test]
fn test_extract_answer_falls_back_to_the_last_number() {
    assert_eq!(
        extract_answer("First we get 12, then the answer is 42."),
        Some(Decimal::from(42))
    );
    assert_eq!(extract_answer("no numbers here"), None);
}
