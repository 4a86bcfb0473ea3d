//! IMG.LY Pixelcut CLI Tool
//!
//! Command-line interface for color keying, magic wand selection, GrabCut
//! segmentation, compression and transforms on image files.

#[cfg(feature = "cli")]
use imgly_pixelcut::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
