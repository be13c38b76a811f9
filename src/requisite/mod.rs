//! Requisite parsing pipeline
//!
//! This module turns one upper-cased chunk like "CIS*1910, [1 OF HK*3810, ZOO*3600]"
//! into a canonical `RequisiteExpression`:
//! lexer -> chart parser -> transformer -> canonicalizer.

mod ast;
pub mod canonical;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod transformer;
pub mod validate;


pub use ast::*;
pub use canonical::{canonicalize, is_canonical};
pub use parser::{parse, parse_with_limits, GrammarRejection, ParseLimits, ParseTree};
pub use render::render;
pub use transformer::transform;
pub use validate::validate;
