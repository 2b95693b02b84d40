//! Tests for template engine
//!
//! Organized into focused submodules, one per concern.

use super::*;
use crate::template::error::{CompileErrorKind, RenderErrorKind};

// Test helper functions
mod helpers;

mod compile_structure;
mod scan;

mod render_loops;
