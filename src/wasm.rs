//! WebAssembly bindings for browsers
//!
//! Mirrors the [`Engine`](crate::engine::Engine) surface with JS-friendly
//! scalar arguments. Input rasters are `Uint8Array`s in RGBA order; results
//! are written into caller-provided arrays and the functions return the
//! number of bytes written.

use crate::{
    compress::{CompressionReport, SearchOutcome},
    config::CompressionFormat,
    engine::{self, Engine},
    error::PixelError,
    transform::{CropRect, FlipDirection, ResizeFilter, RotateAngle},
    types::RectSeed,
};
use wasm_bindgen::prelude::*;

/// JavaScript-compatible error type
#[wasm_bindgen]
#[derive(Debug)]
pub struct WasmError {
    kind: String,
    message: String,
}

#[wasm_bindgen]
impl WasmError {
    /// `dimension`, `parameter` or `encode`
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.kind.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<PixelError> for WasmError {
    fn from(err: PixelError) -> Self {
        Self {
            kind: format!("{:?}", err.kind()).to_lowercase(),
            message: err.to_string(),
        }
    }
}

type WasmResult<T> = std::result::Result<T, WasmError>;

/// Outcome of [`compress_to_size`]
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct WasmCompressionReport {
    bytes_written: usize,
    quality: u8,
    within_target: bool,
}

#[wasm_bindgen]
impl WasmCompressionReport {
    #[wasm_bindgen(getter, js_name = bytesWritten)]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Chosen quality; 0 for lossless formats
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// False when even the lowest quality exceeded the target
    #[wasm_bindgen(getter, js_name = withinTarget)]
    pub fn within_target(&self) -> bool {
        self.within_target
    }
}

impl From<CompressionReport> for WasmCompressionReport {
    fn from(report: CompressionReport) -> Self {
        Self {
            bytes_written: report.bytes_written,
            quality: report.quality.map_or(0, u8::from),
            within_target: report.outcome != SearchOutcome::FloorExceedsTarget,
        }
    }
}

fn engine() -> &'static Engine {
    engine::init()
}

/// Initialize the shared engine; safe to call more than once
#[wasm_bindgen(js_name = initEngine)]
pub fn init_engine() {
    engine();
}

#[wasm_bindgen(js_name = removeSolidColor)]
#[allow(clippy::too_many_arguments)]
pub fn remove_solid_color(
    input: &[u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    tolerance: f32,
    feather: f32,
    output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().remove_solid_color(input, width, height, [r, g, b], tolerance, feather, output)?)
}

#[wasm_bindgen(js_name = magicWandSelect)]
#[allow(clippy::too_many_arguments)]
pub fn magic_wand_select(
    input: &[u8],
    width: u32,
    height: u32,
    seed_x: u32,
    seed_y: u32,
    tolerance: f32,
    connected: bool,
    mask_output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().magic_wand_select(
        input,
        width,
        height,
        seed_x,
        seed_y,
        tolerance,
        connected,
        mask_output,
    )?)
}

#[wasm_bindgen(js_name = grabcutSegment)]
#[allow(clippy::too_many_arguments)]
pub fn grabcut_segment(
    input: &[u8],
    width: u32,
    height: u32,
    rect_x: i32,
    rect_y: i32,
    rect_width: u32,
    rect_height: u32,
    iterations: u32,
    mask_output: &mut [u8],
) -> WasmResult<usize> {
    let rect = RectSeed::new(
        i64::from(rect_x),
        i64::from(rect_y),
        rect_width,
        rect_height,
    );
    Ok(engine().grabcut_segment(input, width, height, rect, iterations, mask_output)?)
}

#[wasm_bindgen(js_name = compressJpeg)]
pub fn compress_jpeg(
    input: &[u8],
    width: u32,
    height: u32,
    quality: u8,
    output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().compress_jpeg(input, width, height, quality, output)?)
}

#[wasm_bindgen(js_name = compressWebp)]
pub fn compress_webp(
    input: &[u8],
    width: u32,
    height: u32,
    quality: u8,
    output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().compress_webp(input, width, height, quality, output)?)
}

#[wasm_bindgen(js_name = compressPng)]
pub fn compress_png(
    input: &[u8],
    width: u32,
    height: u32,
    quality: u8,
    output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().compress_png(input, width, height, quality, output)?)
}

/// `format` is one of `jpeg`, `jpg`, `webp`, `png`
#[wasm_bindgen(js_name = compressToSize)]
pub fn compress_to_size(
    input: &[u8],
    width: u32,
    height: u32,
    target_size: usize,
    format: &str,
    output: &mut [u8],
) -> WasmResult<WasmCompressionReport> {
    let format: CompressionFormat = format.parse()?;
    let report = engine().compress_to_size(input, width, height, target_size, format, output)?;
    Ok(report.into())
}

#[wasm_bindgen(js_name = cropImage)]
#[allow(clippy::too_many_arguments)]
pub fn crop_image(
    input: &[u8],
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    crop_width: u32,
    crop_height: u32,
    output: &mut [u8],
) -> WasmResult<usize> {
    let rect = CropRect::new(x, y, crop_width, crop_height);
    Ok(engine().crop_image(input, width, height, rect, output)?)
}

/// Clockwise rotation by a multiple of 90 degrees
#[wasm_bindgen(js_name = rotateImage)]
pub fn rotate_image(
    input: &[u8],
    width: u32,
    height: u32,
    degrees: u32,
    output: &mut [u8],
) -> WasmResult<usize> {
    let angle = RotateAngle::from_degrees(degrees)?;
    Ok(engine().rotate_image(input, width, height, angle, output)?)
}

#[wasm_bindgen(js_name = flipImage)]
pub fn flip_image(
    input: &[u8],
    width: u32,
    height: u32,
    horizontal: bool,
    output: &mut [u8],
) -> WasmResult<usize> {
    let direction = if horizontal {
        FlipDirection::Horizontal
    } else {
        FlipDirection::Vertical
    };
    Ok(engine().flip_image(input, width, height, direction, output)?)
}

#[wasm_bindgen(js_name = resizeImage)]
pub fn resize_image(
    input: &[u8],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
    output: &mut [u8],
) -> WasmResult<usize> {
    Ok(engine().resize_image(
        input,
        width,
        height,
        new_width,
        new_height,
        ResizeFilter::default(),
        output,
    )?)
}
