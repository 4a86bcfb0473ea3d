//! Rectangle-seeded GrabCut segmentation
//!
//! Pixels outside the seed rectangle are fixed background. Pixels inside
//! start as probable foreground and are relabeled each round by a minimum
//! s-t cut over the 8-connected pixel graph:
//!
//! 1. Fit background and foreground color models ([`gmm::ColorModel`]) to the
//!    current labeling.
//! 2. Terminal links carry the negative log-likelihood of each model; fixed
//!    background pixels are tied to the sink.
//! 3. Neighbor links are `gamma * exp(-beta * |c_p - c_q|^2)`, with diagonal
//!    links scaled by `1/sqrt(2)` and `beta = 1 / (2 * mean |c_p - c_q|^2)`.
//! 4. Pixels on the source side of the cut become foreground.
//!
//! Rounds stop early once a cut changes no label.

mod gmm;
mod graph;

use crate::{
    error::Result,
    types::{RasterView, RectSeed, SegmentationMask},
    utils::{BufferValidator, NumericValidator},
};
use gmm::{Color, ColorModel};
use graph::FlowGraph;
use instant::Instant;
use tracing::{debug, instrument};

/// Rounds used when the caller does not choose
pub const DEFAULT_ITERATIONS: u32 = 5;

/// Upper bound on refinement rounds
pub const MAX_ITERATIONS: u32 = 20;

/// Neighbor link scale
const GAMMA: f64 = 50.0;

/// Terminal weight tying fixed background to the sink
const LAMBDA: f64 = 9.0 * GAMMA;

/// Likelihood floor so `-ln` stays finite
const MIN_LIKELIHOOD: f64 = 1e-300;

/// Parameters for [`segment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabCutParams {
    pub rect: RectSeed,
    pub iterations: u32,
}

impl GrabCutParams {
    #[must_use]
    pub fn new(rect: RectSeed) -> Self {
        Self {
            rect,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        NumericValidator::validate_range(self.iterations, 1, MAX_ITERATIONS, "iterations")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Background,
    ProbableBackground,
    ProbableForeground,
}

/// Precomputed neighbor link weights toward the left, upper-left, upper and
/// upper-right neighbor of each pixel
struct Smoothness {
    left: Vec<f64>,
    up_left: Vec<f64>,
    up: Vec<f64>,
    up_right: Vec<f64>,
}

fn color_diff_sq(a: Color, b: Color) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

impl Smoothness {
    fn new(colors: &[Color], width: usize, height: usize) -> Self {
        let neighbors = |x: usize, y: usize| {
            let i = y * width + x;
            [
                (x > 0).then(|| i - 1),
                (x > 0 && y > 0).then(|| i - width - 1),
                (y > 0).then(|| i - width),
                (x + 1 < width && y > 0).then(|| i - width + 1),
            ]
        };

        let mut total = 0.0;
        let mut pairs = 0usize;
        for y in 0..height {
            for x in 0..width {
                let c = colors[y * width + x];
                for j in neighbors(x, y).into_iter().flatten() {
                    total += color_diff_sq(c, colors[j]);
                    pairs += 1;
                }
            }
        }
        let beta = if pairs == 0 || total <= f64::EPSILON {
            0.0
        } else {
            1.0 / (2.0 * total / pairs as f64)
        };

        let n = width * height;
        let mut weights = Self {
            left: vec![0.0; n],
            up_left: vec![0.0; n],
            up: vec![0.0; n],
            up_right: vec![0.0; n],
        };
        let diagonal = GAMMA / std::f64::consts::SQRT_2;
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let c = colors[i];
                let [left, up_left, up, up_right] = neighbors(x, y);
                let link = |j: Option<usize>, scale: f64| {
                    j.map_or(0.0, |j| scale * (-beta * color_diff_sq(c, colors[j])).exp())
                };
                weights.left[i] = link(left, GAMMA);
                weights.up_left[i] = link(up_left, diagonal);
                weights.up[i] = link(up, GAMMA);
                weights.up_right[i] = link(up_right, diagonal);
            }
        }
        weights
    }
}

/// Segment the foreground inside `params.rect`
///
/// # Errors
/// - `InvalidParameter` for a zero-area or fully outside rectangle, or
///   iterations outside `1..=20`
pub fn segment(raster: RasterView<'_>, params: &GrabCutParams) -> Result<SegmentationMask> {
    let mut data = vec![SegmentationMask::UNSELECTED; raster.pixel_count()];
    segment_into(raster, params, &mut data)?;
    Ok(SegmentationMask::new(data, raster.dimensions()))
}

/// Segment into a `width * height` mask buffer, returning the foreground count
///
/// # Errors
/// - `BufferLength` when `mask` is not exactly one byte per pixel
/// - `InvalidParameter` for a zero-area or fully outside rectangle, or
///   iterations outside `1..=20`
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        rect = ?params.rect,
        iterations = params.iterations
    )
)]
pub fn segment_into(
    raster: RasterView<'_>,
    params: &GrabCutParams,
    mask: &mut [u8],
) -> Result<usize> {
    BufferValidator::validate_mask_output(mask, raster.pixel_count())?;
    params.validate()?;
    let rect = params.rect.clip(raster.width(), raster.height())?;

    let start = Instant::now();
    let width = raster.width() as usize;
    let height = raster.height() as usize;

    let colors: Vec<Color> = raster
        .pixels()
        .map(|p| [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])])
        .collect();
    let mut labels: Vec<Label> = (0..colors.len())
        .map(|i| {
            if rect.contains((i % width) as u32, (i / width) as u32) {
                Label::ProbableForeground
            } else {
                Label::Background
            }
        })
        .collect();
    let smoothness = Smoothness::new(&colors, width, height);

    let mut models: Option<(ColorModel, ColorModel)> = None;
    for round in 0..params.iterations {
        let (bg_samples, fg_samples) = partition(&colors, &labels);
        let (background, foreground) = match models.take() {
            Some(models) => models,
            None => (
                ColorModel::from_samples(&bg_samples),
                ColorModel::from_samples(&fg_samples),
            ),
        };
        let background = background.refit(&bg_samples);
        let foreground = foreground.refit(&fg_samples);

        // Rectangle covers the raster: nothing to contrast against
        if background.is_empty() {
            debug!(round, "no background samples, keeping rectangle as foreground");
            break;
        }

        let (source_side, flow) =
            min_cut(&colors, &labels, &smoothness, &background, &foreground, width);
        let changed = relabel(&mut labels, &source_side);
        debug!(round, flow, changed, "grabcut round complete");

        models = Some((background, foreground));
        if changed == 0 {
            break;
        }
    }

    let mut selected = 0;
    for (slot, label) in mask.iter_mut().zip(&labels) {
        *slot = if *label == Label::ProbableForeground {
            selected += 1;
            SegmentationMask::SELECTED
        } else {
            SegmentationMask::UNSELECTED
        };
    }

    debug!(
        selected,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "grabcut segmentation complete"
    );
    Ok(selected)
}

fn partition(colors: &[Color], labels: &[Label]) -> (Vec<Color>, Vec<Color>) {
    let mut background = Vec::new();
    let mut foreground = Vec::new();
    for (&color, &label) in colors.iter().zip(labels) {
        match label {
            Label::ProbableForeground => foreground.push(color),
            Label::Background | Label::ProbableBackground => background.push(color),
        }
    }
    (background, foreground)
}

fn neg_log(likelihood: f64) -> f64 {
    -likelihood.max(MIN_LIKELIHOOD).ln()
}

/// Build the pixel graph and return the source side of a minimum cut
fn min_cut(
    colors: &[Color],
    labels: &[Label],
    smoothness: &Smoothness,
    background: &ColorModel,
    foreground: &ColorModel,
    width: usize,
) -> (Vec<bool>, f64) {
    let n = colors.len();
    let source = n;
    let sink = n + 1;
    let mut graph = FlowGraph::new(n + 2, n * 5);

    for (i, (&color, &label)) in colors.iter().zip(labels).enumerate() {
        let (from_source, to_sink) = match label {
            Label::Background => (0.0, LAMBDA),
            Label::ProbableBackground | Label::ProbableForeground => (
                neg_log(background.likelihood(color)),
                neg_log(foreground.likelihood(color)),
            ),
        };
        // Only the difference between the two terminal links affects the cut
        if from_source > to_sink {
            graph.add_edge(source, i, from_source - to_sink, 0.0);
        } else if to_sink > from_source {
            graph.add_edge(i, sink, to_sink - from_source, 0.0);
        }

        let x = i % width;
        if x > 0 {
            let w = smoothness.left[i];
            graph.add_edge(i, i - 1, w, w);
        }
        if i >= width {
            if x > 0 {
                let w = smoothness.up_left[i];
                graph.add_edge(i, i - width - 1, w, w);
            }
            let w = smoothness.up[i];
            graph.add_edge(i, i - width, w, w);
            if x + 1 < width {
                let w = smoothness.up_right[i];
                graph.add_edge(i, i - width + 1, w, w);
            }
        }
    }

    let flow = graph.max_flow(source, sink);
    let mut side = graph.source_side(source);
    side.truncate(n);
    (side, flow)
}

/// Apply the cut to undecided pixels, returning how many changed
fn relabel(labels: &mut [Label], source_side: &[bool]) -> usize {
    let mut changed = 0;
    for (label, &is_foreground) in labels.iter_mut().zip(source_side) {
        if *label == Label::Background {
            continue;
        }
        let next = if is_foreground {
            Label::ProbableForeground
        } else {
            Label::ProbableBackground
        };
        if next != *label {
            *label = next;
            changed += 1;
        }
    }
    changed
}
