//! Validation utilities
//!
//! Buffer geometry checks and numeric parameter domains.

mod buffer;
mod numeric;

pub use buffer::BufferValidator;
pub use numeric::NumericValidator;
