//! # Stepwise Engine
//!
//! **Dependency graphs for step-by-step computations**
//!
//! Stepwise extracts a step-level data-dependency graph from a short
//! straight-line computation (assignments ending in a return), computes a
//! deterministic topological layering of that graph, and canonicalizes it by
//! removing pure-alias steps and code unreachable from the declared return
//! value. It is built to compare many independently generated computations
//! against a reference computation.
//!
//! ## Quick Start
//!
//! ```rust
//! use stepwise::{extract, simplify, topological_levels};
//!
//! let source = "subtotal = price * quantity\ntotal = subtotal\nreturn total";
//! let params = vec!["price".to_string(), "quantity".to_string()];
//!
//! let path = extract(source, &params)?;
//! assert_eq!(path.len(), 2);
//!
//! // `total` is a pure alias of `subtotal` and disappears
//! let simplified = simplify(&path);
//! assert_eq!(simplified.len(), 1);
//!
//! let leveling = topological_levels(&simplified);
//! assert_eq!(leveling.levels.len(), 1);
//! # Ok::<(), stepwise::StepwiseError>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Steps
//! One assignment of the computation, with the canonical text of its
//! right-hand side, the earlier steps it depends on, and the declared
//! parameters it reads.
//!
//! ### Reasoning Paths
//! The ordered collection of steps for one computation plus its declared
//! return variables. Paths are append-only; `simplify` derives a new path
//! and never mutates its input.
//!
//! ### Levels
//! A layered topological ordering of the steps, recomputed on demand. Every
//! step sits one level above the highest of its dependencies.

pub mod analysis;
pub mod ast;
pub mod compare;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod extractor;
pub mod merge;
pub mod parser;
pub mod path;
pub mod semantic;
pub mod simplify;

pub use analysis::{topological_levels, GraphIntegrityWarning, Level, LevelSequence, Leveling};
pub use ast::Span;
pub use compare::{compare, PathDiff, StepSignature, VariableChange};
pub use document::{
    annotate_reasoning_levels, check_function_output, reasoning_levels, verify_against_reasoning,
    FunctionRecord, ItemFailure, ReasoningDocument, SampleFunction, SampleResult,
};
pub use error::{ErrorDetails, StepwiseError};
pub use evaluator::{
    binding_from_floats, check_expected, default_tolerance, evaluate_expression, evaluate_path,
    extract_answer, Binding,
};
pub use extractor::{extract, extract_function};
pub use merge::{merge_level_sequences, EdgeKind, MergedEdge, MergedGraph, MergedNode, NodeKind};
pub use parser::{parse_body, parse_expression, parse_function};
pub use path::{ReasoningPath, ReasoningStep};
pub use semantic::{BinaryOp, Expr, ExprKind, Function, Stmt, UnaryOp};
pub use simplify::simplify;

/// Result type for stepwise operations
pub type StepwiseResult<T> = Result<T, StepwiseError>;

#[cfg(test)]
mod tests;
