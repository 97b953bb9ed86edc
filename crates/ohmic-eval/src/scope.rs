//! Lexical scopes and symbols
//!
//! A [`Scope`] is a node in the compile-time namespace tree. Declaring a
//! name mints a [`Symbol`]; after that the symbol is compared by identity,
//! never by name, so shadowing a name in a child scope yields a distinct
//! symbol.
//!
//! # Scoping Rules
//!
//! - **Global scope** - builtin types and functions; sealed after
//!   initialization, see [`crate::builtins::global_scope`]
//! - **Child scopes** - one per declaration block; may shadow any outer name
//!
//! Scopes are shared (`Arc`) nodes so one tree can be evaluated against many
//! contexts, on any thread.

use crate::error::ScopeError;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u64);

/// Unique identity of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

#[derive(Debug)]
struct SymbolData {
    id: SymbolId,
    name: String,
    scope: ScopeId,
}

/// One declaration in one scope.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    pub fn id(&self) -> SymbolId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Scope the symbol was declared in.
    pub fn scope_id(&self) -> ScopeId {
        self.0.scope
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.0.name, self.0.id.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

struct ScopeNode {
    id: ScopeId,
    parent: Option<Scope>,
    symbols: RwLock<IndexMap<String, Symbol>>,
    sealed: bool,
}

/// A lexical namespace.
#[derive(Clone)]
pub struct Scope(Arc<ScopeNode>);

impl Scope {
    fn with_parent(parent: Option<Scope>, sealed: bool) -> Self {
        Scope(Arc::new(ScopeNode {
            id: ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)),
            parent,
            symbols: RwLock::new(IndexMap::new()),
            sealed,
        }))
    }

    /// Root scope holding `names`, closed to further declarations.
    pub(crate) fn sealed_root<'a>(names: impl IntoIterator<Item = &'a str>) -> (Scope, Vec<Symbol>) {
        let scope = Scope::with_parent(None, true);
        let mut symbols = Vec::new();
        {
            let mut map = scope.write();
            for name in names {
                let symbol = scope.mint(name);
                let previous = map.insert(name.to_string(), symbol.clone());
                assert!(previous.is_none(), "Duplicate builtin registration: {}", name);
                symbols.push(symbol);
            }
        }
        (scope, symbols)
    }

    /// A new, empty scope nested in this one.
    pub fn new_child(&self) -> Scope {
        Scope::with_parent(Some(self.clone()), false)
    }

    pub fn id(&self) -> ScopeId {
        self.0.id
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// True for the sealed root.
    pub fn is_global(&self) -> bool {
        self.0.sealed
    }

    /// Declare `name` in this scope.
    ///
    /// # Panics
    ///
    /// If `name` is already declared directly here, or this is the global
    /// scope. Both mean the compiler built a broken tree.
    pub fn declare(&self, name: &str) -> Symbol {
        self.try_declare(name).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Declare `name`, reporting a conflict instead of panicking.
    pub fn try_declare(&self, name: &str) -> Result<Symbol, ScopeError> {
        if self.0.sealed {
            return Err(ScopeError::GlobalScope {
                name: name.to_string(),
            });
        }
        let mut symbols = self.write();
        if symbols.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared {
                name: name.to_string(),
            });
        }
        let symbol = self.mint(name);
        symbols.insert(name.to_string(), symbol.clone());
        Ok(symbol)
    }

    /// Symbol declared directly in this scope.
    pub fn declared(&self, name: &str) -> Option<Symbol> {
        self.read().get(name).cloned()
    }

    /// Nearest declaration of `name`, walking towards the root.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(symbol) = current.declared(name) {
                return Some(symbol);
            }
            scope = current.parent();
        }
        None
    }

    /// Direct declarations in declaration order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.read().values().cloned().collect()
    }

    /// Names visible from this scope, nearest first; used for suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            for name in current.read().keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            scope = current.parent();
        }
        names
    }

    /// Whether `symbol` was declared directly in this scope.
    pub fn owns(&self, symbol: &Symbol) -> bool {
        symbol.scope_id() == self.0.id
    }

    fn mint(&self, name: &str) -> Symbol {
        Symbol(Arc::new(SymbolData {
            id: SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            scope: self.0.id,
        }))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, IndexMap<String, Symbol>> {
        self.0.symbols.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, IndexMap<String, Symbol>> {
        self.0.symbols.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.0.id.0)
            .field("symbols", &self.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
