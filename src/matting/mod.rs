//! Segmentation and matting engines
//!
//! Three tools share the raster model from [`crate::types`]:
//!
//! - [`color_key`]: alpha keying against a solid color, with an optional feather ramp
//! - [`magic_wand`]: seeded selection by color distance, connected or global
//! - [`grabcut`]: rectangle-seeded iterative foreground/background segmentation
//!
//! Each call is self-contained. Working state (visited sets, trimaps, color
//! models, flow graphs) is allocated per call and dropped on return.

pub mod color_key;
pub mod grabcut;
pub mod magic_wand;

pub use color_key::{remove_color, remove_color_into, ColorKeyParams};
pub use grabcut::{segment, segment_into, GrabCutParams};
pub use magic_wand::{select, select_into, WandParams};
