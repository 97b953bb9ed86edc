//! Reusable declarations
//!
//! A [`Template`] is a parameterized declaration block, such as a voltage
//! divider taking `vin`, `r1` and `r2`. It is scheduled once when built and
//! instantiated any number of times, each instantiation running the block in
//! a fresh child [`Context`] with the parameters bound.
//!
//! ```text
//! template divider(vin: Voltage, r1: Resistance, r2: Resistance) {
//!     i = vin / (r1 + r2)
//!     export i * r2
//! }
//! ```

use crate::ast::Stmt;
use crate::config::EvalConfig;
use crate::context::Context;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::eval::closest_names;
use crate::schedule::{schedule, StmtBlock};
use crate::scope::{Scope, Symbol};
use crate::types::{Param, ParamType, ReturnType, Signature, Type};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One template parameter, declared in the template's scope.
#[derive(Debug, Clone)]
pub struct TemplateParam {
    pub symbol: Symbol,
    pub ty: Type,
    /// Bound when the instantiation omits the parameter
    pub default: Option<Value>,
}

/// A scheduled, parameterized declaration block.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    params: Vec<TemplateParam>,
    block: StmtBlock,
}

impl TemplateParam {
    pub fn new(symbol: Symbol, ty: Type) -> Self {
        Self {
            symbol,
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }
}

impl Template {
    /// Build a template, scheduling `stmts` in `scope`.
    ///
    /// Parameter symbols must be declared in `scope`. A statement assigning
    /// to a parameter is reported and left out of the block.
    pub fn new(
        name: impl Into<String>,
        scope: &Scope,
        params: Vec<TemplateParam>,
        stmts: Vec<Stmt>,
    ) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let stmts: Vec<Stmt> = stmts
            .into_iter()
            .filter(|stmt| {
                let Some(symbol) = stmt.defined_symbol() else {
                    return true;
                };
                if !params.iter().any(|param| param.symbol == *symbol) {
                    return true;
                }
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::DuplicateDefinition,
                    Some(stmt.span()),
                    format!(
                        "'{}' is a template parameter and cannot be redefined",
                        symbol.name()
                    ),
                ));
                false
            })
            .collect();
        let (block, scheduled) = schedule(stmts, scope);
        diagnostics.extend(scheduled);
        let template = Self {
            name: name.into(),
            params,
            block,
        };
        (template, diagnostics)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        self.block.scope()
    }

    pub fn params(&self) -> &[TemplateParam] {
        &self.params
    }

    pub fn block(&self) -> &StmtBlock {
        &self.block
    }

    /// Instantiate with the default configuration.
    pub fn instantiate(
        &self,
        parent: &Context,
        args: impl IntoIterator<Item = (String, Value)>,
    ) -> (Value, Vec<Diagnostic>) {
        self.instantiate_with(parent, args, &EvalConfig::default())
    }

    /// Run the block in a fresh child of `parent` with `args` bound by
    /// parameter name.
    ///
    /// A missing parameter is reported and bound to an Unknown of its type,
    /// so the rest of the block still type-checks. An argument of the wrong
    /// type is reported and bound to a Placeholder.
    #[instrument(skip_all, fields(template = %self.name))]
    pub fn instantiate_with(
        &self,
        parent: &Context,
        args: impl IntoIterator<Item = (String, Value)>,
        config: &EvalConfig,
    ) -> (Value, Vec<Diagnostic>) {
        let ctx = parent.new_child();
        let mut diagnostics = Vec::new();
        let mut given: IndexMap<usize, Value> = IndexMap::new();

        for (name, value) in args {
            let Some(index) = self.params.iter().position(|param| param.name() == name) else {
                let mut diag = Diagnostic::error(
                    DiagnosticKind::UnknownArgument,
                    None,
                    format!("template '{}' has no parameter '{}'", self.name, name),
                );
                let suggestions = closest_names(&name, self.params.iter().map(TemplateParam::name), config);
                if let Some(closest) = suggestions.first() {
                    diag = diag.with_note(format!("did you mean '{}'?", closest));
                }
                diagnostics.push(diag);
                continue;
            };
            if given.contains_key(&index) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::DuplicateArgument,
                    None,
                    format!("parameter '{}' given more than once", name),
                ));
                continue;
            }
            given.insert(index, value);
        }

        for (index, param) in self.params.iter().enumerate() {
            let value = match given.shift_remove(&index) {
                Some(value) => match value.ty() {
                    Some(ty) if *ty != param.ty => {
                        diagnostics.push(Diagnostic::error(
                            DiagnosticKind::ArgumentType,
                            None,
                            format!(
                                "parameter '{}' expects {}, found {}",
                                param.name(),
                                param.ty,
                                ty
                            ),
                        ));
                        Value::Placeholder
                    }
                    _ => value,
                },
                None => match &param.default {
                    Some(default) => default.clone(),
                    None => {
                        diagnostics.push(Diagnostic::error(
                            DiagnosticKind::MissingArgument,
                            None,
                            format!(
                                "template '{}' is missing parameter '{}'",
                                self.name,
                                param.name()
                            ),
                        ));
                        Value::unknown(param.ty.clone())
                    }
                },
            };
            ctx.define(&param.symbol, value);
        }

        let (value, block_diagnostics) = self.block.execute_with(&ctx, config);
        diagnostics.extend(block_diagnostics);
        debug!(
            params = self.params.len(),
            diagnostics = diagnostics.len(),
            "instantiated template"
        );
        (value, diagnostics)
    }

    /// Run the block with every parameter bound to an Unknown of its type.
    ///
    /// The result's type is the type every instantiation will produce.
    pub fn evaluate_abstract(&self, parent: &Context) -> (Value, Vec<Diagnostic>) {
        let ctx = parent.new_child();
        for param in &self.params {
            ctx.define(&param.symbol, Value::unknown(param.ty.clone()));
        }
        self.block.execute(&ctx)
    }

    /// Call signature: parameters in declaration order, returning the
    /// abstract result type. `None` when that type cannot be determined.
    pub fn signature(&self, parent: &Context) -> Option<Signature> {
        let (result, _) = self.evaluate_abstract(parent);
        let returns = result.ty()?.clone();
        let params = self
            .params
            .iter()
            .map(|param| {
                let declared = Param::new(param.name(), ParamType::Exact(param.ty.clone()));
                match &param.default {
                    Some(default) => declared.with_default(default.clone()),
                    None => declared,
                }
            })
            .collect();
        Some(Signature::new(params, ReturnType::Fixed(returns)))
    }

    /// Expose the template as a Function value instantiating in children of
    /// `parent`.
    ///
    /// Errors from an instantiation are returned as the call's failure
    /// message. When the result type cannot be determined the function is a
    /// Placeholder and the abstract evaluation's diagnostics are returned.
    pub fn to_function(self: &Arc<Self>, parent: &Context) -> (Value, Vec<Diagnostic>) {
        let Some(signature) = self.signature(parent) else {
            let (_, diagnostics) = self.evaluate_abstract(parent);
            return (Value::Placeholder, diagnostics);
        };
        let template = Arc::clone(self);
        let parent = parent.clone();
        let function = Value::function(signature, move |args| {
            let named = template
                .params
                .iter()
                .zip(args)
                .map(|(param, value)| (param.name().to_string(), value.clone()));
            let (value, diagnostics) = template.instantiate(&parent, named);
            let errors: Vec<String> = diagnostics
                .iter()
                .filter(|diag| diag.is_error())
                .map(|diag| diag.message.clone())
                .collect();
            if errors.is_empty() {
                Ok(value)
            } else {
                Err(errors.join("; "))
            }
        });
        (function, Vec::new())
    }
}
