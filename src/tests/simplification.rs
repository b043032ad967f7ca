use crate::evaluator::{evaluate_path, Binding};
use crate::extractor::extract;
use crate::simplify::simplify;
use rust_decimal::Decimal;

fn params(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn binding(pairs: &[(&str, i64)]) -> Binding {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), Decimal::from(*value)))
        .collect()
}

#[test]
fn test_alias_and_dead_code_elimination() {
    let source = "x = a + b; y = x; z = y * 2; unused = a - b; return z";
    let path = extract(source, &params(&["a", "b"])).unwrap();
    let simplified = simplify(&path);

    assert_eq!(simplified.len(), 2);
    let steps = simplified.steps();
    assert_eq!(steps[0].step_id, 1);
    assert_eq!(steps[0].variable, "x");
    assert_eq!(steps[0].expression, "a + b");
    assert_eq!(steps[0].dependencies_input, ["a", "b"]);

    assert_eq!(steps[1].step_id, 2);
    assert_eq!(steps[1].variable, "z");
    assert_eq!(steps[1].expression, "x * 2");
    assert_eq!(steps[1].dependencies, [1]);
    assert_eq!(simplified.return_vars(), ["z"]);

    // The receiver is untouched
    assert_eq!(path.len(), 4);

    // Dead-code elimination never changes an observable return value
    let inputs = binding(&[("a", 3), ("b", 4)]);
    let original = evaluate_path(&path, &inputs).unwrap();
    let reduced = evaluate_path(&simplified, &inputs).unwrap();
    assert_eq!(original["z"], Decimal::from(14));
    assert_eq!(reduced["z"], Decimal::from(14));
}

#[test]
fn test_simplify_is_idempotent() {
    let source = "x = a + b\ny = x\nw = y\nu = w * 2\nunused = y + 1\nreturn u";
    let path = extract(source, &params(&["a", "b"])).unwrap();
    let once = simplify(&path);
    let twice = simplify(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_simplify_without_return_vars_is_a_no_op() {
    let path = extract("x = a + b\ny = x", &params(&["a", "b"])).unwrap();
    let simplified = simplify(&path);
    assert_eq!(simplified, path);
}

#[test]
fn test_alias_chains_resolve_to_the_ultimate_source() {
    let source = "x = a + b\ny = x\nw = y\nreturn w";
    let path = extract(source, &params(&["a", "b"])).unwrap();
    let simplified = simplify(&path);

    assert_eq!(simplified.len(), 1);
    assert_eq!(simplified.steps()[0].variable, "x");
    // The returned alias resolves to its source so the result stands alone
    assert_eq!(simplified.return_vars(), ["x"]);
}

#[test]
fn test_alias_of_an_input_parameter() {
    let source = "y = a\nz = y * 2\nreturn z";
    let path = extract(source, &params(&["a"])).unwrap();
    let simplified = simplify(&path);

    assert_eq!(simplified.len(), 1);
    let step = &simplified.steps()[0];
    assert_eq!(step.variable, "z");
    assert_eq!(step.expression, "a * 2");
    assert!(step.dependencies.is_empty());
    assert_eq!(step.dependencies_input, ["a"]);

    let inputs = binding(&[("a", 5)]);
    let original = evaluate_path(&path, &inputs).unwrap();
    let reduced = evaluate_path(&simplified, &inputs).unwrap();
    assert_eq!(original["z"], reduced["z"]);
}

#[test]
fn test_dependencies_are_rewritten_through_aliases() {
    let source = "x = a\ny = x + 1\nz = y * 2\nunused = y + 5\nreturn z";
    let path = extract(source, &params(&["a"])).unwrap();
    let simplified = simplify(&path);

    assert_eq!(simplified.len(), 2);
    let steps = simplified.steps();
    assert_eq!(steps[0].variable, "y");
    assert_eq!(steps[0].expression, "a + 1");
    assert!(steps[0].dependencies.is_empty());
    assert_eq!(steps[0].dependencies_input, ["a"]);
    assert_eq!(steps[1].variable, "z");
    assert_eq!(steps[1].dependencies, [1]);
}

#[test]
fn test_step_ids_are_dense_after_simplification() {
    let source = "p = a\nq = p\nr = q + 1\ndead = p + q\ns = r * r\nreturn s";
    let path = extract(source, &params(&["a"])).unwrap();
    let simplified = simplify(&path);

    for (i, step) in simplified.steps().iter().enumerate() {
        assert_eq!(step.step_id, i + 1);
        for &dep in &step.dependencies {
            assert!(dep < step.step_id);
        }
    }
}

#[test]
fn test_unknown_return_var_drops_everything() {
    let path = extract("x = a\nreturn q", &params(&["a"])).unwrap();
    let simplified = simplify(&path);
    assert!(simplified.is_empty());
    assert_eq!(simplified.return_vars(), ["q"]);
}

#[test]
fn test_returned_alias_of_a_parameter() {
    let path = extract("y = a\nreturn y", &params(&["a"])).unwrap();
    let simplified = simplify(&path);
    assert!(simplified.is_empty());
    assert_eq!(simplified.return_vars(), ["a"]);
}
