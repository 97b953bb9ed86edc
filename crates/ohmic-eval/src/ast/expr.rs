use crate::ops::{BinaryOp, UnaryOp};
use crate::scope::Symbol;
use crate::span::Span;
use crate::value::Value;

/// An expression node with its source location.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Constant value, already lowered (`4.7 kohm`, `"R1"`, `true`)
    Literal(Value),

    /// Reference to a declared symbol
    ///
    /// The compiler resolves names to symbols while lowering, so the
    /// evaluator never looks names up.
    SymbolRef(Symbol),

    /// Prefix operator: `-x`, `!x`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Infix operator: `a + b`, `a < b`, `a && b`
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Call: `parallel(r1, b: r2)`
    ///
    /// Positional arguments must come before named ones.
    Call { callee: Box<Expr>, args: Vec<Arg> },

    /// Attribute access: `target.name`
    Attr { target: Box<Expr>, name: String },

    /// Keyed access: `target[key]`
    Index { target: Box<Expr>, key: Box<Expr> },
}

/// One call argument, positional when `name` is `None`.
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(value: Value, span: Span) -> Self {
        Self::new(ExprKind::Literal(value), span)
    }

    pub fn symbol(symbol: Symbol, span: Span) -> Self {
        Self::new(ExprKind::SymbolRef(symbol), span)
    }

    pub fn unary(op: UnaryOp, operand: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// Binary node spanning both operands.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let span = if lhs.span.file_id == rhs.span.file_id {
            lhs.span.merge(&rhs.span)
        } else {
            lhs.span
        };
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn call(callee: Expr, args: Vec<Arg>, span: Span) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        )
    }

    pub fn attr(target: Expr, name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Attr {
                target: Box::new(target),
                name: name.into(),
            },
            span,
        )
    }

    pub fn index(target: Expr, key: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Index {
                target: Box::new(target),
                key: Box::new(key),
            },
            span,
        )
    }

    /// Every symbol referenced anywhere in this tree, in pre-order.
    pub fn referenced_symbols(&self) -> Vec<&Symbol> {
        let mut symbols = Vec::new();
        walk(self, &mut |expr| {
            if let ExprKind::SymbolRef(symbol) = &expr.kind {
                symbols.push(symbol);
            }
        });
        symbols
    }
}

/// Pre-order traversal.
fn walk<'a>(expr: &'a Expr, visitor: &mut impl FnMut(&'a Expr)) {
    visitor(expr);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::SymbolRef(_) => {}
        ExprKind::Unary { operand, .. } => walk(operand, visitor),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk(lhs, visitor);
            walk(rhs, visitor);
        }
        ExprKind::Call { callee, args } => {
            walk(callee, visitor);
            for arg in args {
                walk(&arg.value, visitor);
            }
        }
        ExprKind::Attr { target, .. } => walk(target, visitor),
        ExprKind::Index { target, key } => {
            walk(target, visitor);
            walk(key, visitor);
        }
    }
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        let span = value.span;
        Self {
            name: None,
            value,
            span,
        }
    }

    pub fn named(name: impl Into<String>, value: Expr, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            value,
            span,
        }
    }
}
