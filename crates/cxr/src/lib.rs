//! cxr reads real-world C++ headers, recovers a structural AST for them
//! (declarations, preprocessor directives, statements, expressions) and
//! renders that AST back as formatted C++ text.
//!
//! The pipeline is `parse -> AST -> emit`: [`parser::Parser`] produces a
//! [`lang_cxx::ast::Obj`] translation-unit root, [`emit::Writer`] prints
//! it, and [`compare`] checks emitted files against expected masters.

pub mod compare;
pub mod emit;
pub mod parser;
