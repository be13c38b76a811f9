//! Prereq Core - deterministic parser for course prerequisite strings
//!
//! This crate turns free-form requirement text such as
//! `"BIOC*2580, [1 of HK*3810, ZOO*3600]"` into canonical, strongly-typed
//! requisite trees, with optional Python bindings via PyO3.

pub mod backend;
pub mod batch;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod requisite;

#[cfg(feature = "python")]
mod python;

pub use config::{DispatchConfig, DispatchSettings};
pub use dispatch::{parse_chunk, parse_prereq, parse_prereq_with};
pub use error::{RequisiteError, Result};
pub use requisite::{canonicalize, Choices, RequisiteExpression};
