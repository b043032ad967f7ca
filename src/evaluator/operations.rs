//! Numeric operations over Decimal values
//!
//! Arithmetic stays in `Decimal`; exponentiation and square roots round-trip
//! through `f64` and back.

use crate::error::StepwiseError;
use crate::semantic::BinaryOp;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub fn number_arithmetic(
    left: Decimal,
    op: BinaryOp,
    right: Decimal,
) -> Result<Decimal, StepwiseError> {
    let result = match op {
        BinaryOp::Add => left + right,
        BinaryOp::Subtract => left - right,
        BinaryOp::Multiply => left * right,
        BinaryOp::Divide => {
            if right == Decimal::ZERO {
                return Err(StepwiseError::Evaluation("Division by zero".to_string()));
            }
            left / right
        }
        BinaryOp::FloorDivide => {
            if right == Decimal::ZERO {
                return Err(StepwiseError::Evaluation("Division by zero".to_string()));
            }
            (left / right).floor()
        }
        BinaryOp::Modulo => {
            if right == Decimal::ZERO {
                return Err(StepwiseError::Evaluation("Modulo by zero".to_string()));
            }
            left % right
        }
        BinaryOp::Power => {
            let base = left.to_f64().ok_or_else(|| {
                StepwiseError::Evaluation("Cannot convert base to float".to_string())
            })?;
            let exp = right.to_f64().ok_or_else(|| {
                StepwiseError::Evaluation("Cannot convert exponent to float".to_string())
            })?;
            let result = base.powf(exp);
            Decimal::from_f64_retain(result).ok_or_else(|| {
                StepwiseError::Evaluation("Power result cannot be represented".to_string())
            })?
        }
    };

    Ok(result)
}

/// Evaluate a builtin call. The set covers the functions short
/// calculator-style computations actually use.
pub fn builtin_call(name: &str, args: &[Decimal]) -> Result<Decimal, StepwiseError> {
    match name {
        "abs" => {
            let value = single_arg(name, args)?;
            Ok(value.abs())
        }
        "min" => {
            require_args(name, args, 1)?;
            Ok(args.iter().copied().fold(args[0], Decimal::min))
        }
        "max" => {
            require_args(name, args, 1)?;
            Ok(args.iter().copied().fold(args[0], Decimal::max))
        }
        "round" => match args {
            [value] => Ok(value.round()),
            [value, places] => {
                let dp = places.to_u32().ok_or_else(|| {
                    StepwiseError::Evaluation(format!(
                        "Invalid number of places in round(): {}",
                        places
                    ))
                })?;
                Ok(value.round_dp(dp))
            }
            _ => Err(StepwiseError::Evaluation(
                "round() takes one or two arguments".to_string(),
            )),
        },
        "floor" => {
            let value = single_arg(name, args)?;
            Ok(value.floor())
        }
        "ceil" => {
            let value = single_arg(name, args)?;
            Ok(value.ceil())
        }
        "int" => {
            let value = single_arg(name, args)?;
            Ok(value.trunc())
        }
        "float" => single_arg(name, args),
        "sqrt" => {
            let value = single_arg(name, args)?;
            let float = value.to_f64().ok_or_else(|| {
                StepwiseError::Evaluation("Cannot convert sqrt argument to float".to_string())
            })?;
            if float < 0.0 {
                return Err(StepwiseError::Evaluation(
                    "Square root of a negative number".to_string(),
                ));
            }
            Decimal::from_f64_retain(float.sqrt()).ok_or_else(|| {
                StepwiseError::Evaluation("Square root result cannot be represented".to_string())
            })
        }
        other => Err(StepwiseError::Evaluation(format!(
            "Unknown function '{}'",
            other
        ))),
    }
}

fn single_arg(name: &str, args: &[Decimal]) -> Result<Decimal, StepwiseError> {
    match args {
        [value] => Ok(*value),
        _ => Err(StepwiseError::Evaluation(format!(
            "{}() takes exactly one argument",
            name
        ))),
    }
}

fn require_args(name: &str, args: &[Decimal], minimum: usize) -> Result<(), StepwiseError> {
    if args.len() < minimum {
        return Err(StepwiseError::Evaluation(format!(
            "{}() requires at least {} argument(s)",
            name, minimum
        )));
    }
    Ok(())
}
