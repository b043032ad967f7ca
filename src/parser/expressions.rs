use crate::ast::Span;
use crate::error::StepwiseError;
use crate::parser::Rule;
use crate::semantic::{BinaryOp, Expr, ExprKind, UnaryOp};
use pest::iterators::Pair;
use rust_decimal::Decimal;

// Helper to build an Expr carrying the source span of its pair
fn spanned(kind: ExprKind, pair: &Pair<Rule>) -> Expr {
    Expr::new(kind, Some(Span::from_pest_span(pair.as_span())))
}

pub(crate) fn lower_expression(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    match pair.as_rule() {
        Rule::expression => lower_binary_chain(pair),
        Rule::term => lower_binary_chain(pair),
        Rule::factor => lower_factor(pair),
        Rule::power => lower_power(pair),
        Rule::postfix => lower_postfix(pair),
        Rule::primary => lower_primary(pair),
        rule => Err(StepwiseError::Engine(format!(
            "Unexpected rule in expression position: {:?}",
            rule
        ))),
    }
}

/// Lower `operand (op operand)*` sequences left-associatively
fn lower_binary_chain(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty binary expression".to_string()))?;
    let mut expr = lower_expression(first)?;

    while let Some(op_pair) = inner.next() {
        let op = lower_binary_op(&op_pair)?;
        let right_pair = inner.next().ok_or_else(|| {
            StepwiseError::Engine("Binary operator without right operand".to_string())
        })?;
        let right = lower_expression(right_pair)?;
        expr = Expr::new(ExprKind::Binary(Box::new(expr), op, Box::new(right)), None);
    }

    Ok(expr)
}

fn lower_binary_op(pair: &Pair<Rule>) -> Result<BinaryOp, StepwiseError> {
    match pair.as_str().trim() {
        "+" => Ok(BinaryOp::Add),
        "-" => Ok(BinaryOp::Subtract),
        "*" => Ok(BinaryOp::Multiply),
        "/" => Ok(BinaryOp::Divide),
        "//" => Ok(BinaryOp::FloorDivide),
        "%" => Ok(BinaryOp::Modulo),
        "**" => Ok(BinaryOp::Power),
        other => Err(StepwiseError::Engine(format!(
            "Unknown binary operator '{}'",
            other
        ))),
    }
}

fn lower_factor(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    let source_pair = pair.clone();
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty factor".to_string()))?;

    match first.as_rule() {
        Rule::unary_op => {
            let op = match first.as_str() {
                "-" => UnaryOp::Negate,
                "+" => UnaryOp::Plus,
                other => {
                    return Err(StepwiseError::Engine(format!(
                        "Unknown unary operator '{}'",
                        other
                    )))
                }
            };
            let operand_pair = inner.next().ok_or_else(|| {
                StepwiseError::Engine("Unary operator without operand".to_string())
            })?;
            let operand = lower_expression(operand_pair)?;
            Ok(spanned(ExprKind::Unary(op, Box::new(operand)), &source_pair))
        }
        _ => lower_expression(first),
    }
}

fn lower_power(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    let mut inner = pair.into_inner();
    let base_pair = inner
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty power expression".to_string()))?;
    let base = lower_expression(base_pair)?;

    // power = postfix (pow_op factor)?  -- right operand parsed as a factor,
    // which makes the operator right-associative
    let mut pairs = inner.filter(|p| p.as_rule() != Rule::pow_op);
    match pairs.next() {
        Some(exponent_pair) => {
            let exponent = lower_expression(exponent_pair)?;
            Ok(Expr::new(
                ExprKind::Binary(Box::new(base), BinaryOp::Power, Box::new(exponent)),
                None,
            ))
        }
        None => Ok(base),
    }
}

fn lower_postfix(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    let mut inner = pair.into_inner();
    let primary = inner
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty postfix expression".to_string()))?;
    let mut expr = lower_expression(primary)?;

    for op_pair in inner {
        let op_span = Span::from_pest_span(op_pair.as_span());
        let op = op_pair
            .into_inner()
            .next()
            .ok_or_else(|| StepwiseError::Engine("Empty postfix operator".to_string()))?;
        match op.as_rule() {
            Rule::call_args => {
                let callee = match expr.as_bare_identifier() {
                    Some(name) => name.to_string(),
                    None => {
                        return Err(StepwiseError::parse(
                            "Only named functions can be called",
                            op_span,
                            "<expression>",
                        ))
                    }
                };
                let mut args = Vec::new();
                if let Some(arg_list) = op.into_inner().next() {
                    for arg in arg_list.into_inner() {
                        args.push(lower_expression(arg)?);
                    }
                }
                expr = Expr::new(ExprKind::Call(callee, args), None);
            }
            Rule::index => {
                let index_pair = op.into_inner().next().ok_or_else(|| {
                    StepwiseError::Engine("Subscript without index expression".to_string())
                })?;
                let index = lower_expression(index_pair)?;
                expr = Expr::new(
                    ExprKind::Subscript(Box::new(expr), Box::new(index)),
                    None,
                );
            }
            rule => {
                return Err(StepwiseError::Engine(format!(
                    "Unexpected postfix rule: {:?}",
                    rule
                )))
            }
        }
    }

    Ok(expr)
}

fn lower_primary(pair: Pair<Rule>) -> Result<Expr, StepwiseError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty primary expression".to_string()))?;
    match inner.as_rule() {
        Rule::number_literal => lower_number(&inner),
        Rule::identifier => Ok(spanned(
            ExprKind::Identifier(inner.as_str().to_string()),
            &inner,
        )),
        Rule::expression => lower_expression(inner),
        rule => Err(StepwiseError::Engine(format!(
            "Unexpected primary rule: {:?}",
            rule
        ))),
    }
}

fn lower_number(pair: &Pair<Rule>) -> Result<Expr, StepwiseError> {
    let text = pair.as_str();
    let value = parse_decimal(text).ok_or_else(|| {
        StepwiseError::parse(
            format!("Invalid numeric literal '{}'", text),
            Span::from_pest_span(pair.as_span()),
            "<expression>",
        )
    })?;
    Ok(spanned(ExprKind::Number(value), pair))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains('e') || text.contains('E') {
        return Decimal::from_scientific(text).ok();
    }
    // Tolerate bare leading/trailing dots ("1." / ".5")
    let normalized = if let Some(stripped) = text.strip_prefix('.') {
        format!("0.{}", stripped)
    } else if let Some(stripped) = text.strip_suffix('.') {
        stripped.to_string()
    } else {
        text.to_string()
    };
    normalized.parse::<Decimal>().ok()
}
