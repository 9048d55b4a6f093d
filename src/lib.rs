//! Core library for the abr-compiler command line application.
//!
//! The library merges a directory of ABR instrument exports into one styled
//! workbook. Readers and writers live under [`io`], the cell and table types
//! in [`model`], the per-export stages in [`transform`], and the run
//! orchestration in [`compile`].

pub mod compile;
pub mod error;
pub mod io;
pub mod model;
pub mod transform;

pub use error::{Result, ToolError};
