//! Runtime symbol bindings.
//!
//! A [`Context`] mirrors the scope tree at run time: each node maps symbols
//! to values and falls back to its parent on lookup. A fresh child context
//! is created per evaluation pass (for example per template instantiation)
//! and every symbol is bound in it at most once.

use crate::error::ContextError;
use crate::scope::{Scope, Symbol};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

struct ContextNode {
    parent: Option<Context>,
    values: RwLock<IndexMap<Symbol, Value>>,
    sealed: bool,
}

/// Symbol → value bindings for one evaluation pass.
#[derive(Clone)]
pub struct Context(Arc<ContextNode>);

impl Context {
    fn with_parent(parent: Option<Context>, sealed: bool) -> Self {
        Context(Arc::new(ContextNode {
            parent,
            values: RwLock::new(IndexMap::new()),
            sealed,
        }))
    }

    /// Root context holding `bindings`, closed to further definitions.
    pub(crate) fn sealed_root(bindings: impl IntoIterator<Item = (Symbol, Value)>) -> Context {
        Context(Arc::new(ContextNode {
            parent: None,
            values: RwLock::new(bindings.into_iter().collect()),
            sealed: true,
        }))
    }

    /// An empty, unsealed root. Hosts normally start from
    /// [`global_context`](crate::builtins::global_context) instead.
    pub fn detached() -> Context {
        Context::with_parent(None, false)
    }

    pub fn new_child(&self) -> Context {
        Context::with_parent(Some(self.clone()), false)
    }

    pub fn parent(&self) -> Option<&Context> {
        self.0.parent.as_ref()
    }

    pub fn is_global(&self) -> bool {
        self.0.sealed
    }

    /// Bind `symbol` in this context.
    ///
    /// # Panics
    ///
    /// If `symbol` already has a binding directly in this context, whatever
    /// the value, or this is the global context.
    pub fn define(&self, symbol: &Symbol, value: Value) {
        if let Err(err) = self.try_define(symbol, value) {
            panic!("{}", err);
        }
    }

    /// Bind `symbol`, reporting a conflict instead of panicking.
    pub fn try_define(&self, symbol: &Symbol, value: Value) -> Result<(), ContextError> {
        if self.0.sealed {
            return Err(ContextError::GlobalContext {
                name: symbol.name().to_string(),
            });
        }
        let mut values = self.0.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.contains_key(symbol) {
            return Err(ContextError::AlreadyDefined {
                name: symbol.name().to_string(),
            });
        }
        values.insert(symbol.clone(), value);
        Ok(())
    }

    /// Whether `symbol` is bound directly in this context.
    pub fn defined(&self, symbol: &Symbol) -> bool {
        self.read().contains_key(symbol)
    }

    /// Value of `symbol`, walking towards the root. `None` means Absent.
    pub fn value(&self, symbol: &Symbol) -> Option<Value> {
        let mut context = Some(self);
        while let Some(current) = context {
            if let Some(value) = current.read().get(symbol) {
                return Some(value.clone());
            }
            context = current.parent();
        }
        None
    }

    /// Snapshot of every symbol declared directly in `scope`, by name.
    pub fn all_values(&self, scope: &Scope) -> IndexMap<String, Option<Value>> {
        scope
            .symbols()
            .into_iter()
            .map(|symbol| {
                let value = self.value(&symbol);
                (symbol.name().to_string(), value)
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<Symbol, Value>> {
        self.0.values.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bindings", &self.read().len())
            .field("sealed", &self.0.sealed)
            .finish()
    }
}
