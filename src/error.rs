use crate::ast::Span;
use rust_decimal::Decimal;
use std::fmt;

/// Detailed error information with source location
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_id: String,
}

/// Error types for the stepwise engine
///
/// Parse errors are fatal to the extraction of the one computation they
/// occurred in; batch processing of other computations continues past them.
/// Statements outside the restricted grammar are not errors at all; they are
/// recorded as skipped statements by the parser.
#[derive(Debug, Clone)]
pub enum StepwiseError {
    /// Source text does not conform to the restricted grammar
    Parse(Box<ErrorDetails>),

    /// Runtime failure while evaluating an expression or a path
    Evaluation(String),

    /// A reconstructed computation's output disagrees with an expected value
    EvaluationMismatch {
        expected: Decimal,
        actual: Decimal,
        tolerance: Decimal,
    },

    /// Internal invariant breach without a specific source location
    Engine(String),
}

impl StepwiseError {
    /// Create a parse error with source information
    pub fn parse(message: impl Into<String>, span: Span, source_id: impl Into<String>) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
        }))
    }
}

impl fmt::Display for StepwiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepwiseError::Parse(details) => {
                write!(
                    f,
                    "Parse error: {} at {}:{}:{}",
                    details.message, details.source_id, details.span.line, details.span.col
                )
            }
            StepwiseError::Evaluation(msg) => write!(f, "Evaluation error: {}", msg),
            StepwiseError::EvaluationMismatch {
                expected,
                actual,
                tolerance,
            } => {
                write!(
                    f,
                    "Evaluation mismatch: expected {} (±{}), got {}",
                    expected, tolerance, actual
                )
            }
            StepwiseError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for StepwiseError {}
