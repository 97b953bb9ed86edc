//! Call evaluation and argument binding.

use super::Evaluator;
use crate::ast::{Arg, Expr};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::span::Span;
use crate::types::{Signature, Type};
use crate::value::Value;

/// An argument after binding, by parameter position.
struct Bound {
    value: Value,
    span: Span,
}

impl Evaluator<'_> {
    pub(super) fn call(&mut self, callee_expr: &Expr, args: &[Arg], span: Span) -> Value {
        let callee = self.eval(callee_expr);
        let values: Vec<Value> = args.iter().map(|arg| self.eval(&arg.value)).collect();

        let Some(callee_ty) = callee.ty() else {
            return Value::Placeholder;
        };
        let Some(callable) = callee_ty.callable() else {
            self.error(
                DiagnosticKind::NotCallable,
                callee_expr.span,
                format!("{} is not callable", callee_ty),
            );
            return Value::Placeholder;
        };
        let signature = callable.signature();

        let Some(bound) = self.bind(signature, args, values, span) else {
            return Value::Placeholder;
        };
        if bound.iter().any(Value::is_placeholder) {
            return Value::Placeholder;
        }
        let arg_types: Vec<Type> = bound
            .iter()
            .filter_map(|value| value.ty().cloned())
            .collect();
        let return_type = signature.return_type(&arg_types);

        let Some(payload) = callee.payload() else {
            return Value::unknown(return_type);
        };
        if bound.iter().any(Value::is_unknown) {
            return Value::unknown(return_type);
        }
        match callable.call(payload, &bound) {
            Ok(value) => value,
            Err(message) => {
                self.error(
                    DiagnosticKind::CallFailed,
                    span,
                    format!("call failed: {}", message),
                );
                Value::Placeholder
            }
        }
    }

    /// Match arguments to parameters: positional first, then named, then
    /// defaults. `None` when any binding error was reported.
    fn bind(
        &mut self,
        signature: &Signature,
        args: &[Arg],
        values: Vec<Value>,
        span: Span,
    ) -> Option<Vec<Value>> {
        let params = &signature.params;
        let mut slots: Vec<Option<Bound>> = params.iter().map(|_| None).collect();
        let mut failed = false;
        let mut positional = 0;
        let mut excess = Vec::new();

        for (arg, value) in args.iter().zip(values) {
            let bound = Bound {
                value,
                span: arg.span,
            };
            match &arg.name {
                None => {
                    if positional < params.len() {
                        slots[positional] = Some(bound);
                    } else {
                        excess.push(arg.span);
                    }
                    positional += 1;
                }
                Some(name) => match signature.param_index(name) {
                    Some(index) => match &slots[index] {
                        Some(previous) => {
                            let diag = Diagnostic::error(
                                DiagnosticKind::DuplicateArgument,
                                Some(arg.span),
                                format!("argument '{}' given more than once", name),
                            )
                            .with_label(previous.span, "first given here".to_string());
                            self.diagnostics.push(diag);
                            failed = true;
                        }
                        None => slots[index] = Some(bound),
                    },
                    None => {
                        let diag = Diagnostic::error(
                            DiagnosticKind::UnknownArgument,
                            Some(arg.span),
                            format!("unknown argument '{}'", name),
                        );
                        let names = params.iter().map(|param| param.name.as_str());
                        let diag = self.with_suggestions(diag, name, names);
                        self.diagnostics.push(diag);
                        failed = true;
                    }
                },
            }
        }

        if !excess.is_empty() {
            let mut diag = Diagnostic::error(
                DiagnosticKind::TooManyArguments,
                Some(span),
                format!(
                    "expected at most {} arguments, got {}",
                    params.len(),
                    positional
                ),
            );
            for extra in excess {
                diag = diag.with_label(extra, "unexpected argument".to_string());
            }
            self.diagnostics.push(diag);
            failed = true;
        }

        for (slot, param) in slots.iter_mut().zip(params) {
            if slot.is_some() {
                continue;
            }
            match &param.default {
                Some(default) => {
                    *slot = Some(Bound {
                        value: default.clone(),
                        span,
                    })
                }
                None => {
                    self.error(
                        DiagnosticKind::MissingArgument,
                        span,
                        format!("missing argument '{}'", param.name),
                    );
                    failed = true;
                }
            }
        }

        let bound_types: Vec<Option<Type>> = slots
            .iter()
            .map(|slot| slot.as_ref().and_then(|bound| bound.value.ty().cloned()))
            .collect();
        for (index, slot) in slots.iter().enumerate() {
            let Some(bound) = slot else { continue };
            let Some(ty) = bound.value.ty() else { continue };
            if !signature.accepts(index, ty, &bound_types) {
                self.error(
                    DiagnosticKind::ArgumentType,
                    bound.span,
                    format!(
                        "argument '{}' expects {}, found {}",
                        params[index].name,
                        signature.describe_param(index),
                        ty
                    ),
                );
                failed = true;
            }
        }

        if failed {
            return None;
        }
        Some(
            slots
                .into_iter()
                .map(|slot| slot.map_or(Value::Placeholder, |bound| bound.value))
                .collect(),
        )
    }
}
