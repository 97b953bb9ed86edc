//! Host-level errors.
//!
//! These are not user diagnostics. `ScopeError` and `ContextError` describe
//! misuse by the compiler that builds scopes and contexts; the panicking
//! `declare`/`define` entry points format them into their panic message.
//! `ConfigError` rejects an unusable [`EvalConfig`](crate::config::EvalConfig).

use thiserror::Error;

/// Failure to declare a name in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The name is already declared directly in this scope.
    #[error("'{name}' is already declared in this scope")]
    AlreadyDeclared { name: String },

    /// The global scope is sealed after builtins are installed.
    #[error("cannot declare '{name}' in the global scope")]
    GlobalScope { name: String },
}

/// Failure to bind a symbol in a context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The symbol already has a value directly in this context.
    #[error("symbol '{name}' is already defined in this context")]
    AlreadyDefined { name: String },

    /// The global context is sealed after builtins are installed.
    #[error("cannot define '{name}' in the global context")]
    GlobalContext { name: String },
}

/// Invalid evaluator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("display_digits must be between 1 and {max}, got {value}")]
    DisplayDigits { value: usize, max: usize },

    #[error("suggestion_distance must be at most {max}, got {value}")]
    SuggestionDistance { value: usize, max: usize },
}
