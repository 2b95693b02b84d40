//! CLI command implementations

pub mod blocks;
pub mod check;
pub mod render;
