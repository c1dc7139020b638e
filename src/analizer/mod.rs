//! Semantic analysis for the AST, run between parsing and interpretation.
//!
//! The resolver is a separate pass (not folded into the parser) so that
//! the `Env` chain stays a plain runtime structure.

pub mod resolver;
