//! Per-export transformation stages, applied in module order: metadata
//! extraction, normalization, wave amplitude derivation, column reordering
//! and sub-threshold suppression.

pub mod amplitude;
pub mod metadata;
pub mod normalize;
pub mod reorder;
pub mod suppress;

pub use metadata::{HeaderLayout, SessionMetadata};
