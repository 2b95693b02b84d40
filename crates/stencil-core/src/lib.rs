// Core modules
pub mod config;
pub mod data;
pub mod error;
pub mod template;

// Re-export commonly used types
pub use error::{Result, StencilError};
