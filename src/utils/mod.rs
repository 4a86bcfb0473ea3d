//! Shared utilities for validation and color handling
//!
//! Consolidates checks that every engine performs before touching pixels,
//! so the boundary layer, the CLI and the WASM bindings agree on them.

pub mod color;
pub mod validation;

pub use color::ColorParser;
pub use validation::{BufferValidator, NumericValidator};
