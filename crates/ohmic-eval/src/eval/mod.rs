//! Expression evaluation
//!
//! Walks an immutable [`Expr`] against a [`Context`], producing a value and
//! the diagnostics collected on the way. Evaluation never stops at a user
//! error: the failing node yields a Placeholder (or an Unknown of its
//! natural result type) and siblings are still evaluated, so every
//! independent mistake is reported once.
//!
//! # Node rules
//!
//! | Node | Failure | Result |
//! |------|---------|--------|
//! | SymbolRef | unbound | error, Placeholder |
//! | Unary / Binary | capability mismatch | error, Placeholder or `Unknown(Bool)` |
//! | Binary `/` | zero divisor | error, Placeholder |
//! | Call | binding error | error, Placeholder |
//! | Attr | unknown attribute | error, Placeholder |
//! | Index | missing key | error, Placeholder |
//!
//! Operands are always evaluated before dispatch; `&&` and `||` do not
//! short-circuit.

mod call;

use crate::ast::{Expr, ExprKind};
use crate::config::EvalConfig;
use crate::context::Context;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::ops::{apply_binary, apply_unary, BinaryOp, OpError, UnaryOp};
use crate::span::Span;
use crate::value::Value;
use ohmic_units::catalog::closest_matches;

/// Evaluate `expr` with the default configuration.
pub fn evaluate(expr: &Expr, ctx: &Context) -> (Value, Vec<Diagnostic>) {
    evaluate_with(expr, ctx, &EvalConfig::default())
}

/// Evaluate `expr` against `ctx`.
pub fn evaluate_with(expr: &Expr, ctx: &Context, config: &EvalConfig) -> (Value, Vec<Diagnostic>) {
    let mut evaluator = Evaluator::new(ctx, config);
    let value = evaluator.eval(expr);
    (value, evaluator.diagnostics)
}

pub(crate) struct Evaluator<'a> {
    ctx: &'a Context,
    config: &'a EvalConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(ctx: &'a Context, config: &'a EvalConfig) -> Self {
        Self {
            ctx,
            config,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Value {
        match &expr.kind {
            ExprKind::Literal(value) => value.clone(),
            ExprKind::SymbolRef(symbol) => match self.ctx.value(symbol) {
                Some(value) => value,
                None => {
                    self.error(
                        DiagnosticKind::UndefinedSymbol,
                        expr.span,
                        format!("symbol '{}' not yet defined", symbol.name()),
                    );
                    Value::Placeholder
                }
            },
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand);
                self.unary(*op, &value, expr.span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_value = self.eval(lhs);
                let rhs_value = self.eval(rhs);
                self.binary(*op, (&lhs_value, lhs.span), (&rhs_value, rhs.span), expr.span)
            }
            ExprKind::Call { callee, args } => self.call(callee, args, expr.span),
            ExprKind::Attr { target, name } => {
                let target = self.eval(target);
                self.attr(&target, name, expr.span)
            }
            ExprKind::Index { target, key } => {
                let target = self.eval(target);
                let key = self.eval(key);
                self.index(&target, &key, expr.span)
            }
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ============================================================================
    // Operators
    // ============================================================================

    fn unary(&mut self, op: UnaryOp, operand: &Value, span: Span) -> Value {
        match apply_unary(op, operand) {
            Ok(value) => value,
            Err(err) => {
                self.error(DiagnosticKind::InvalidOperands, span, err.to_string());
                op.fallback()
            }
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        (lhs, lhs_span): (&Value, Span),
        (rhs, rhs_span): (&Value, Span),
        span: Span,
    ) -> Value {
        match apply_binary(op, lhs, rhs) {
            Ok(value) => value,
            Err(OpError::DivisionByZero) => {
                let diag = Diagnostic::error(
                    DiagnosticKind::DivisionByZero,
                    Some(span),
                    "division by zero".to_string(),
                )
                .with_label(rhs_span, "divisor is zero".to_string());
                self.diagnostics.push(diag);
                Value::Placeholder
            }
            Err(err) => {
                let mut diag =
                    Diagnostic::error(DiagnosticKind::InvalidOperands, Some(span), err.to_string());
                if let (Some(lhs_ty), Some(rhs_ty)) = (lhs.ty(), rhs.ty()) {
                    diag = diag
                        .with_label(lhs_span, format!("this is {}", lhs_ty))
                        .with_label(rhs_span, format!("this is {}", rhs_ty));
                }
                self.diagnostics.push(diag);
                op.fallback()
            }
        }
    }

    // ============================================================================
    // Access
    // ============================================================================

    fn attr(&mut self, target: &Value, name: &str, span: Span) -> Value {
        let Some(ty) = target.ty() else {
            return Value::Placeholder;
        };
        let Some(attributes) = ty.attributes() else {
            self.error(
                DiagnosticKind::UnknownAttribute,
                span,
                format!("{} has no attributes", ty),
            );
            return Value::Placeholder;
        };
        let Some(attr_ty) = attributes.attr_type(name) else {
            let names = attributes.attr_names();
            let diag = Diagnostic::error(
                DiagnosticKind::UnknownAttribute,
                Some(span),
                format!("{} has no attribute '{}'", ty, name),
            );
            let diag = self.with_suggestions(diag, name, names.iter().map(String::as_str));
            self.diagnostics.push(diag);
            return Value::Placeholder;
        };
        let Some(payload) = target.payload() else {
            return Value::unknown(attr_ty);
        };
        match attributes.attr(payload, name) {
            Some(value) => value,
            None => {
                self.error(
                    DiagnosticKind::Internal,
                    span,
                    format!("attribute '{}' of {} has a type but no value", name, ty),
                );
                Value::Placeholder
            }
        }
    }

    fn index(&mut self, target: &Value, key: &Value, span: Span) -> Value {
        let (Some(ty), Some(key_ty)) = (target.ty(), key.ty()) else {
            return Value::Placeholder;
        };
        let Some(indexable) = ty.indexable().filter(|indexable| indexable.can_index(key_ty)) else {
            self.error(
                DiagnosticKind::InvalidIndex,
                span,
                format!("cannot index {} with {}", ty, key_ty),
            );
            return Value::Placeholder;
        };
        let Some(key_payload) = key.payload() else {
            return match indexable.index_type(None) {
                Some(element) => Value::unknown(element),
                None => {
                    self.diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::IndeterminateType,
                        Some(span),
                        format!("elements of {} differ in type; cannot index with an unknown key", ty),
                    ));
                    Value::Placeholder
                }
            };
        };
        let Some(element) = indexable.index_type(Some(key_payload)) else {
            self.error(
                DiagnosticKind::InvalidIndex,
                span,
                format!("{} has no element {}", ty, key),
            );
            return Value::Placeholder;
        };
        match target.payload() {
            Some(payload) => indexable.index(payload, key_payload).unwrap_or(Value::Placeholder),
            None => Value::unknown(element),
        }
    }

    // ============================================================================
    // Reporting
    // ============================================================================

    fn error(&mut self, kind: DiagnosticKind, span: Span, message: String) {
        self.diagnostics
            .push(Diagnostic::error(kind, Some(span), message));
    }

    /// Attach a "did you mean" note naming the closest candidates.
    fn with_suggestions<'n>(
        &self,
        diag: Diagnostic,
        name: &str,
        candidates: impl IntoIterator<Item = &'n str>,
    ) -> Diagnostic {
        let suggestions = closest_names(name, candidates, self.config);
        if suggestions.is_empty() {
            return diag;
        }
        let quoted: Vec<String> = suggestions.iter().map(|s| format!("'{}'", s)).collect();
        diag.with_note(format!("did you mean {}?", quoted.join(" or ")))
    }
}

/// Candidates within the configured edit distance, nearest first.
pub(crate) fn closest_names<'n>(
    name: &str,
    candidates: impl IntoIterator<Item = &'n str>,
    config: &EvalConfig,
) -> Vec<&'n str> {
    closest_matches(
        name,
        candidates,
        config.suggestion_limit,
        config.suggestion_distance,
    )
}
