use crate::ast::Span;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// An expression of the restricted computation grammar, with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Option<Span>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }
}

/// The kind/type of expression
///
/// The grammar is closed: every supported construct has a variant, and
/// dispatch happens through exhaustive matching. Constructs outside this set
/// never reach the expression level; the statement classifier skips them.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    Number(Decimal),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Call(String, Vec<Expr>),
    Subscript(Box<Expr>, Box<Expr>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

impl BinaryOp {
    /// Returns a human-readable name for the operator
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "addition",
            BinaryOp::Subtract => "subtraction",
            BinaryOp::Multiply => "multiplication",
            BinaryOp::Divide => "division",
            BinaryOp::FloorDivide => "floor division",
            BinaryOp::Modulo => "modulo",
            BinaryOp::Power => "exponentiation",
        }
    }

    /// Binding strength used for canonical parenthesization
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::FloorDivide | BinaryOp::Modulo => 2,
            BinaryOp::Power => 4,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Power)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Plus,
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

impl Expr {
    fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Identifier(_)
            | ExprKind::Number(_)
            | ExprKind::Call(_, _)
            | ExprKind::Subscript(_, _) => ATOM_PRECEDENCE,
            ExprKind::Unary(_, _) => UNARY_PRECEDENCE,
            ExprKind::Binary(_, op, _) => op.precedence(),
        }
    }

    /// Every identifier referenced in this expression, including call targets
    /// and subscript bases
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers(&self, names: &mut BTreeSet<String>) {
        match &self.kind {
            ExprKind::Identifier(name) => {
                names.insert(name.clone());
            }
            ExprKind::Number(_) => {}
            ExprKind::Binary(left, _, right) => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            ExprKind::Unary(_, operand) => operand.collect_identifiers(names),
            ExprKind::Call(name, args) => {
                names.insert(name.clone());
                for arg in args {
                    arg.collect_identifiers(names);
                }
            }
            ExprKind::Subscript(base, index) => {
                base.collect_identifiers(names);
                index.collect_identifiers(names);
            }
        }
    }

    /// If the expression is syntactically nothing more than a bare reference
    /// to one symbol, return that symbol
    pub fn as_bare_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Rebuild the expression with identifiers substituted through `renames`
    pub fn rename_identifiers(&self, renames: &HashMap<String, String>) -> Expr {
        let kind = match &self.kind {
            ExprKind::Identifier(name) => {
                let name = renames.get(name).cloned().unwrap_or_else(|| name.clone());
                ExprKind::Identifier(name)
            }
            ExprKind::Number(value) => ExprKind::Number(*value),
            ExprKind::Binary(left, op, right) => ExprKind::Binary(
                Box::new(left.rename_identifiers(renames)),
                *op,
                Box::new(right.rename_identifiers(renames)),
            ),
            ExprKind::Unary(op, operand) => {
                ExprKind::Unary(*op, Box::new(operand.rename_identifiers(renames)))
            }
            ExprKind::Call(name, args) => {
                let name = renames.get(name).cloned().unwrap_or_else(|| name.clone());
                ExprKind::Call(
                    name,
                    args.iter().map(|a| a.rename_identifiers(renames)).collect(),
                )
            }
            ExprKind::Subscript(base, index) => ExprKind::Subscript(
                Box::new(base.rename_identifiers(renames)),
                Box::new(index.rename_identifiers(renames)),
            ),
        };
        Expr::new(kind, None)
    }
}

/// A statement of the restricted computation grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Single-target assignment of a supported expression to one identifier
    Assign { target: String, value: Expr },
    /// Return statement; `value` is `None` for a bare `return`
    Return { value: Option<Expr> },
    /// A statement outside the restricted grammar, preserved as raw text
    Skipped { text: String },
}

/// A parsed computation: declared parameters plus a straight-line body
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Number(value) => write!(f, "{}", value),
            ExprKind::Binary(left, op, right) => {
                let prec = op.precedence();
                let (left_needs, right_needs) = if op.is_right_associative() {
                    (left.precedence() <= prec, right.precedence() < prec)
                } else {
                    (left.precedence() < prec, right.precedence() <= prec)
                };
                if left_needs {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", op)?;
                if right_needs {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
            ExprKind::Unary(op, operand) => {
                let symbol = match op {
                    UnaryOp::Negate => "-",
                    UnaryOp::Plus => "+",
                };
                if operand.precedence() < UNARY_PRECEDENCE {
                    write!(f, "{}({})", symbol, operand)
                } else {
                    write!(f, "{}{}", symbol, operand)
                }
            }
            ExprKind::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExprKind::Subscript(base, index) => {
                if base.precedence() < ATOM_PRECEDENCE {
                    write!(f, "({})[{}]", base, index)
                } else {
                    write!(f, "{}[{}]", base, index)
                }
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Subtract => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::FloorDivide => write!(f, "//"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::Power => write!(f, "**"),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { target, value } => write!(f, "{} = {}", target, value),
            Stmt::Return { value: Some(expr) } => write!(f, "return {}", expr),
            Stmt::Return { value: None } => write!(f, "return"),
            Stmt::Skipped { text } => write!(f, "{}", text),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "def {}({}):", self.name, self.params.join(", "))?;
        for stmt in &self.body {
            writeln!(f, "    {}", stmt)?;
        }
        Ok(())
    }
}
