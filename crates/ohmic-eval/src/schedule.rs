//! Statement scheduling
//!
//! Orders the statements of a declaration block so that every symbol is
//! defined before it is used, then runs them against a context.
//!
//! # What This Pass Does
//!
//! 1. **Definitions** - maps each symbol to the statement defining it;
//!    duplicate definitions and a second `export` are reported and dropped
//! 2. **Dependencies** - adds an edge from the definer of `s` to every
//!    statement requiring `s`
//! 3. **Ordering** - Kahn's algorithm with a FIFO queue seeded in input
//!    order; statements released together keep their input order
//! 4. **Cycle Detection** - statements never released are excluded and
//!    reported in a single diagnostic tracing one concrete cycle
//!
//! # Examples
//!
//! ```text
//! i = v / r        // requires v, r
//! v = 5 V
//! r = 1 kohm
//! ```
//!
//! schedules as `v`, `r`, `i`.

use crate::ast::Stmt;
use crate::config::EvalConfig;
use crate::context::Context;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::eval::Evaluator;
use crate::scope::{Scope, Symbol};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::{debug, instrument, trace, warn};

/// Statements in execution order, with the scope they define symbols in.
#[derive(Debug, Clone)]
pub struct StmtBlock {
    scope: Scope,
    stmts: Vec<Stmt>,
}

/// Order `stmts`, which define symbols in `scope`.
///
/// Statements that cannot be ordered are left out of the block; the
/// returned diagnostics explain why.
#[instrument(skip_all, fields(stmts = stmts.len()))]
pub fn schedule(stmts: Vec<Stmt>, scope: &Scope) -> (StmtBlock, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    // 1. Definitions
    let mut definers: IndexMap<Symbol, usize> = IndexMap::new();
    let mut export: Option<usize> = None;
    let mut accepted = Vec::new();
    for (index, stmt) in stmts.iter().enumerate() {
        match stmt {
            Stmt::Assign { symbol, .. } => {
                if let Some(&first) = definers.get(symbol) {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::DuplicateDefinition,
                            Some(stmt.span()),
                            format!("'{}' is defined more than once", symbol.name()),
                        )
                        .with_label(stmts[first].span(), "first defined here".to_string()),
                    );
                    continue;
                }
                definers.insert(symbol.clone(), index);
            }
            Stmt::Export { .. } => {
                if let Some(first) = export {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::DuplicateExport,
                            Some(stmt.span()),
                            "block exports more than one value".to_string(),
                        )
                        .with_label(stmts[first].span(), "first export here".to_string()),
                    );
                    continue;
                }
                export = Some(index);
            }
        }
        accepted.push(index);
    }

    // 2. Dependencies
    let mut in_degree: IndexMap<usize, usize> = accepted.iter().map(|&i| (i, 0)).collect();
    let mut dependents: IndexMap<usize, Vec<usize>> =
        accepted.iter().map(|&i| (i, Vec::new())).collect();
    let mut requires: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for &index in &accepted {
        let required: IndexSet<Symbol> = stmts[index].required_symbols(scope);
        for symbol in &required {
            let Some(&definer) = definers.get(symbol) else {
                continue;
            };
            dependents[&definer].push(index);
            in_degree[&index] += 1;
            requires.entry(index).or_default().push(definer);
        }
    }

    // 3. Kahn's algorithm
    let mut queue: VecDeque<usize> = accepted
        .iter()
        .copied()
        .filter(|i| in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(accepted.len());
    while let Some(index) = queue.pop_front() {
        order.push(index);
        for &dependent in &dependents[&index] {
            let degree = &mut in_degree[&dependent];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    // 4. Cycle detection
    let stuck: Vec<usize> = accepted
        .iter()
        .copied()
        .filter(|i| in_degree[i] > 0)
        .collect();
    if !stuck.is_empty() {
        warn!(excluded = stuck.len(), "excluding statements in a dependency cycle");
        diagnostics.push(cycle_diagnostic(&stmts, &stuck, &requires));
    }
    debug!(
        ordered = order.len(),
        excluded = stmts.len() - order.len(),
        "scheduled block"
    );

    let mut slots: Vec<Option<Stmt>> = stmts.into_iter().map(Some).collect();
    let ordered = order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();
    (
        StmtBlock {
            scope: scope.clone(),
            stmts: ordered,
        },
        diagnostics,
    )
}

fn stmt_name(stmt: &Stmt) -> String {
    match stmt.defined_symbol() {
        Some(symbol) => symbol.name().to_string(),
        None => "export".to_string(),
    }
}

/// Walks requirements backwards from the first stuck statement until one
/// repeats.
///
/// Every stuck statement requires at least one other stuck statement, so
/// the walk always closes. Returns a path like `[a, b, a]` where each
/// entry depends on the next.
fn trace_cycle_path(start: usize, stuck: &[usize], requires: &IndexMap<usize, Vec<usize>>) -> Vec<usize> {
    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(next) = requires
            .get(&current)
            .and_then(|definers| definers.iter().copied().find(|d| stuck.contains(d)))
        else {
            return path;
        };
        if let Some(position) = path.iter().position(|&p| p == next) {
            let mut cycle = path.split_off(position);
            cycle.push(next);
            return cycle;
        }
        path.push(next);
        current = next;
    }
}

fn cycle_diagnostic(stmts: &[Stmt], stuck: &[usize], requires: &IndexMap<usize, Vec<usize>>) -> Diagnostic {
    let cycle_path = trace_cycle_path(stuck[0], stuck, requires);
    let description = cycle_path
        .iter()
        .map(|&i| stmt_name(&stmts[i]))
        .collect::<Vec<_>>()
        .join(" → ");

    let first_span = cycle_path.first().map(|&i| stmts[i].span());
    let mut diag = Diagnostic::error(
        DiagnosticKind::CyclicDependency,
        first_span,
        format!("dependency cycle: {}", description),
    );
    for (position, &index) in cycle_path.iter().enumerate() {
        let span = stmts[index].span();
        diag = if position == 0 {
            diag.with_label(span, "cycle starts here".to_string())
        } else if position == cycle_path.len() - 1 {
            diag.with_label(span, "cycle completes here".to_string())
        } else {
            let next = cycle_path[position + 1];
            diag.with_label(span, format!("depends on '{}'", stmt_name(&stmts[next])))
        };
    }
    let excluded: Vec<String> = stuck.iter().map(|&i| stmt_name(&stmts[i])).collect();
    diag.with_note(format!("not evaluated: {}", excluded.join(", ")))
}

impl StmtBlock {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Statements in execution order.
    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Run the block with the default configuration.
    pub fn execute(&self, ctx: &Context) -> (Value, Vec<Diagnostic>) {
        self.execute_with(ctx, &EvalConfig::default())
    }

    /// Run every statement against `ctx` and return the block's value.
    ///
    /// The value is the exported expression, or else an object of every
    /// symbol declared in the block's scope.
    ///
    /// # Panics
    ///
    /// If `ctx` already binds a symbol the block defines.
    #[instrument(skip_all, fields(stmts = self.stmts.len()))]
    pub fn execute_with(&self, ctx: &Context, config: &EvalConfig) -> (Value, Vec<Diagnostic>) {
        let mut evaluator = Evaluator::new(ctx, config);
        let mut exported = None;
        for stmt in &self.stmts {
            let value = evaluator.eval(stmt.expr());
            trace!(
                stmt = %stmt_name(stmt),
                value = %value.render(config.display_digits),
                "executed statement"
            );
            match stmt {
                Stmt::Assign { symbol, .. } => {
                    debug_assert!(
                        self.scope.owns(symbol),
                        "'{}' assigned outside the block's scope",
                        symbol.name()
                    );
                    ctx.define(symbol, value)
                }
                Stmt::Export { .. } => exported = Some(value),
            }
        }
        let result = exported.unwrap_or_else(|| {
            Value::object(
                ctx.all_values(&self.scope)
                    .into_iter()
                    .map(|(name, value)| (name, value.unwrap_or(Value::Placeholder))),
            )
        });
        (result, evaluator.into_diagnostics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::builtins::global_scope;
    use crate::ops::BinaryOp;
    use crate::span::Span;

    fn sym(symbol: &Symbol) -> Expr {
        Expr::symbol(symbol.clone(), Span::zero(0))
    }

    fn lit(text: &str) -> Expr {
        Expr::literal(Value::parse_quantity(text).unwrap(), Span::zero(0))
    }

    fn names(block: &StmtBlock) -> Vec<String> {
        block.stmts().iter().map(stmt_name).collect()
    }

    #[test]
    fn test_orders_by_dependency() {
        let scope = global_scope().new_child();
        let s1 = scope.declare("s1");
        let s2 = scope.declare("s2");
        let user = scope.declare("user");

        let stmts = vec![
            Stmt::assign(user.clone(), sym(&s2)),
            Stmt::assign(s1.clone(), lit("1 V")),
            Stmt::assign(s2.clone(), sym(&s1)),
        ];
        let (block, diagnostics) = schedule(stmts, &scope);
        assert!(diagnostics.is_empty());
        assert_eq!(names(&block), ["s1", "s2", "user"]);
    }

    #[test]
    fn test_ready_statements_keep_input_order() {
        let scope = global_scope().new_child();
        let c = scope.declare("c");
        let a = scope.declare("a");
        let b = scope.declare("b");
        let stmts = vec![
            Stmt::assign(c.clone(), lit("3 V")),
            Stmt::assign(a.clone(), lit("1 V")),
            Stmt::assign(b.clone(), lit("2 V")),
        ];
        let (block, _) = schedule(stmts, &scope);
        assert_eq!(names(&block), ["c", "a", "b"]);
    }

    #[test]
    fn test_two_statement_cycle() {
        let scope = global_scope().new_child();
        let s1 = scope.declare("s1");
        let s2 = scope.declare("s2");
        let stmts = vec![
            Stmt::assign(s1.clone(), sym(&s2)),
            Stmt::assign(s2.clone(), sym(&s1)),
        ];
        let (block, diagnostics) = schedule(stmts, &scope);
        assert!(block.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CyclicDependency);
        assert_eq!(diagnostics[0].message, "dependency cycle: s1 → s2 → s1");
        assert_eq!(diagnostics[0].labels.len(), 3);
    }

    #[test]
    fn test_self_reference() {
        let scope = global_scope().new_child();
        let s1 = scope.declare("s1");
        let ok = scope.declare("ok");
        let stmts = vec![
            Stmt::assign(s1.clone(), Expr::binary(BinaryOp::Add, sym(&s1), lit("1 V"))),
            Stmt::assign(ok.clone(), lit("2 V")),
        ];
        let (block, diagnostics) = schedule(stmts, &scope);
        assert_eq!(names(&block), ["ok"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "dependency cycle: s1 → s1");
    }

    #[test]
    fn test_downstream_of_cycle_is_excluded() {
        let scope = global_scope().new_child();
        let a = scope.declare("a");
        let b = scope.declare("b");
        let c = scope.declare("c");
        // c depends on the a/b cycle without being part of it
        let stmts = vec![
            Stmt::assign(c.clone(), sym(&a)),
            Stmt::assign(a.clone(), sym(&b)),
            Stmt::assign(b.clone(), sym(&a)),
        ];
        let (block, diagnostics) = schedule(stmts, &scope);
        assert!(block.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "dependency cycle: a → b → a");
        assert_eq!(diagnostics[0].notes, ["not evaluated: c, a, b"]);
    }

    #[test]
    fn test_duplicate_definition_and_export() {
        let scope = global_scope().new_child();
        let a = scope.declare("a");
        let stmts = vec![
            Stmt::assign(a.clone(), lit("1 V")),
            Stmt::assign(a.clone(), lit("2 V")),
            Stmt::export(sym(&a)),
            Stmt::export(lit("3 V")),
        ];
        let (block, diagnostics) = schedule(stmts, &scope);
        assert_eq!(block.len(), 2);
        let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [DiagnosticKind::DuplicateDefinition, DiagnosticKind::DuplicateExport]
        );

        let (value, diagnostics) = block.execute(&Context::detached());
        assert!(diagnostics.is_empty());
        assert_eq!(value, Value::parse_quantity("1 V").unwrap());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "assigned outside the block's scope")]
    fn test_assign_outside_scope_panics() {
        let scope = global_scope().new_child();
        let stray = global_scope().new_child().declare("stray");
        let (block, _) = schedule(vec![Stmt::assign(stray, lit("1 V"))], &scope);
        block.execute(&Context::detached());
    }

    #[test]
    fn test_execute_builds_implicit_object() {
        let scope = global_scope().new_child();
        let v = scope.declare("v");
        let r = scope.declare("r");
        let i = scope.declare("i");
        let stmts = vec![
            Stmt::assign(i.clone(), Expr::binary(BinaryOp::Div, sym(&v), sym(&r))),
            Stmt::assign(v.clone(), lit("5 V")),
            Stmt::assign(r.clone(), lit("1 kohm")),
        ];
        let (block, _) = schedule(stmts, &scope);
        let ctx = Context::detached();
        let (value, diagnostics) = block.execute(&ctx);
        assert!(diagnostics.is_empty());
        let fields = value.as_object().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["v", "r", "i"]);
        assert_eq!(fields["i"], Value::parse_quantity("5 mA").unwrap());
        assert_eq!(ctx.value(&i), Some(Value::parse_quantity("5 mA").unwrap()));
    }

    #[test]
    fn test_excluded_symbols_make_implicit_object_placeholder() {
        let scope = global_scope().new_child();
        let a = scope.declare("a");
        let stmts = vec![Stmt::assign(a.clone(), sym(&a))];
        let (block, _) = schedule(stmts, &scope);
        let (value, diagnostics) = block.execute(&Context::detached());
        assert!(diagnostics.is_empty());
        assert!(value.is_placeholder());
    }
}
