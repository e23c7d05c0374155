//! Structural model for C++ translation units.
//!
//! This crate defines the abstract syntax tree produced by a lenient C++
//! parser: declarations, definitions, preprocessor directives, statements
//! and expressions, together with the read-only traversal helpers a
//! post-parse consumer needs. It performs no name resolution and no
//! semantic analysis; nodes record what the source *says*, not what it
//! *means*.

pub mod ast;
pub mod visit;
