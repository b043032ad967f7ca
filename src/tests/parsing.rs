use crate::parser::{parse_body, parse_expression, parse_function};
use crate::semantic::Stmt;

fn canonical(text: &str) -> String {
    parse_expression(text).unwrap().to_string()
}

#[test]
fn test_canonical_rendering_is_whitespace_independent() {
    assert_eq!(canonical("a+b*c"), "a + b * c");
    assert_eq!(canonical("  a   *b "), "a * b");
}

#[test]
fn test_canonical_rendering_keeps_required_parens() {
    assert_eq!(canonical("(a + b) * c"), "(a + b) * c");
    assert_eq!(canonical("a - (b - c)"), "a - (b - c)");
    assert_eq!(canonical("(a + b) ** 2"), "(a + b) ** 2");
    assert_eq!(canonical("-(a + b)"), "-(a + b)");
}

#[test]
fn test_canonical_rendering_drops_redundant_parens() {
    assert_eq!(canonical("(a) + (b)"), "a + b");
    assert_eq!(canonical("(a * b) + c"), "a * b + c");
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(canonical("2 ** 3 ** 2"), "2 ** 3 ** 2");
    assert_eq!(canonical("-x ** 2"), "-x ** 2");
}

#[test]
fn test_calls_and_subscripts() {
    assert_eq!(canonical("min( a ,b ) + xs[ 0 ]"), "min(a, b) + xs[0]");
    assert_eq!(canonical("round(a / b, 2)"), "round(a / b, 2)");
}

#[test]
fn test_floor_division_and_modulo() {
    assert_eq!(canonical("a // b % c"), "a // b % c");
}

#[test]
fn test_number_literals() {
    assert_eq!(canonical("2.50 + 0.5"), "2.50 + 0.5");
    assert_eq!(canonical(".5 + 1."), "0.5 + 1");
}

#[test]
fn test_canonical_text_reparses_to_itself() {
    for text in [
        "a + (b + c)",
        "(a + b) * c - d",
        "-x ** 2 + min(a, b)",
        "a / b / c",
        "xs[i + 1] * 2",
    ] {
        let rendered = canonical(text);
        assert_eq!(canonical(&rendered), rendered);
    }
}

#[test]
fn test_expression_parse_errors() {
    assert!(parse_expression("a +").is_err());
    assert!(parse_expression("").is_err());
    assert!(parse_expression("\"text\"").is_err());
}

#[test]
fn test_body_classification() {
    let stmts = parse_body("x = a + b\nreturn x").unwrap();
    assert_eq!(stmts.len(), 2);
    assert!(matches!(&stmts[0], Stmt::Assign { target, .. } if target == "x"));
    assert!(matches!(&stmts[1], Stmt::Return { value: Some(_) }));
}

#[test]
fn test_statements_outside_the_grammar_are_skipped() {
    let source = "x += 1\na, b = 1, 2\nxs[0] = 3\nobj.attr = 4\nfoo(x)\nx = y = 1\npass";
    let stmts = parse_body(source).unwrap();
    assert_eq!(stmts.len(), 7);
    assert!(stmts.iter().all(|s| matches!(s, Stmt::Skipped { .. })));
}

#[test]
fn test_conditional_blocks_are_skipped_but_their_returns_count() {
    let source = "x = a\nif a > 0:\n    y = a * 2\n    return x\nz = a + 1\nreturn z";
    let stmts = parse_body(source).unwrap();

    let assigns: Vec<&str> = stmts
        .iter()
        .filter_map(|s| match s {
            Stmt::Assign { target, .. } => Some(target.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(assigns, vec!["x", "z"]);

    let returns = stmts
        .iter()
        .filter(|s| matches!(s, Stmt::Return { .. }))
        .count();
    assert_eq!(returns, 2);
}

#[test]
fn test_semicolons_and_comments() {
    let stmts = parse_body("x = a; y = x  # alias\nreturn y").unwrap();
    assert_eq!(stmts.len(), 3);
}

#[test]
fn test_assignment_with_malformed_rhs_is_a_parse_error() {
    assert!(parse_body("x = a +").is_err());
    assert!(parse_body("x = \"hello\"").is_err());
    assert!(parse_body("x =").is_err());
}

#[test]
fn test_parse_function() {
    let function = parse_function(
        "def solution(distance, time):\n    speed = distance / time\n    return speed",
    )
    .unwrap();
    assert_eq!(function.name, "solution");
    assert_eq!(function.params, vec!["distance", "time"]);
    assert_eq!(function.body.len(), 2);
}

#[test]
fn test_parse_function_with_inline_body() {
    let function = parse_function("def f(a): return a").unwrap();
    assert_eq!(function.params, vec!["a"]);
    assert!(matches!(&function.body[0], Stmt::Return { value: Some(_) }));
}

#[test]
fn test_parse_function_requires_def_header() {
    assert!(parse_function("x = 1\nreturn x").is_err());
    assert!(parse_function("def f(a:\n    return a").is_err());
}
