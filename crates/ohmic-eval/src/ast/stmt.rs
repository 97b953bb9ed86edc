use super::Expr;
use crate::scope::{Scope, Symbol};
use crate::span::Span;
use indexmap::IndexSet;

/// A statement in a declaration block.
///
/// Statements are unordered as written; the scheduler orders them by the
/// symbols they define and require.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Binding: `symbol = expr`
    Assign { symbol: Symbol, expr: Expr },

    /// Explicit block result: `export expr`
    ///
    /// A block without one exports an object of all its symbols.
    Export { expr: Expr },
}

impl Stmt {
    pub fn assign(symbol: Symbol, expr: Expr) -> Self {
        Stmt::Assign { symbol, expr }
    }

    pub fn export(expr: Expr) -> Self {
        Stmt::Export { expr }
    }

    /// Symbol this statement defines, if any.
    pub fn defined_symbol(&self) -> Option<&Symbol> {
        match self {
            Stmt::Assign { symbol, .. } => Some(symbol),
            Stmt::Export { .. } => None,
        }
    }

    /// Symbols declared directly in `scope` that the expression refers to.
    ///
    /// References to outer scopes are excluded; they are bound before the
    /// block runs.
    pub fn required_symbols(&self, scope: &Scope) -> IndexSet<Symbol> {
        self.expr()
            .referenced_symbols()
            .into_iter()
            .filter(|symbol| scope.owns(symbol))
            .cloned()
            .collect()
    }

    pub fn expr(&self) -> &Expr {
        match self {
            Stmt::Assign { expr, .. } | Stmt::Export { expr } => expr,
        }
    }

    pub fn span(&self) -> Span {
        self.expr().span
    }
}
