//! Structure inspection
//!
//! Infers the nested field structure of a dataset from the first record of a
//! small sample and renders it for display.

pub mod hierarchy;
pub mod render;

pub use hierarchy::{analyze, analyze_with, describe, divergent_records, Hierarchy};
pub use render::render_table;
