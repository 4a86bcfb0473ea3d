//! Gaussian mixture color model
//!
//! Five full-covariance components over RGB. Initialization is a
//! deterministic k-means (farthest-point seeding, then Lloyd iterations), so
//! identical inputs always yield identical models.

/// Number of mixture components per model
pub(crate) const COMPONENTS: usize = 5;

/// Added to the covariance diagonal when it is singular
const COVARIANCE_REGULARIZATION: f64 = 0.01;

const KMEANS_ITERATIONS: usize = 10;

pub(crate) type Color = [f64; 3];

#[derive(Debug, Clone, Copy, Default)]
struct Component {
    weight: f64,
    mean: Color,
    inverse: [[f64; 3]; 3],
    determinant: f64,
}

impl Component {
    /// Unweighted Gaussian density, without the `(2*pi)^(3/2)` constant
    fn density(&self, color: Color) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        let d = [
            color[0] - self.mean[0],
            color[1] - self.mean[1],
            color[2] - self.mean[2],
        ];
        let mut mahalanobis = 0.0;
        for (i, row) in self.inverse.iter().enumerate() {
            mahalanobis += d[i] * (row[0] * d[0] + row[1] * d[1] + row[2] * d[2]);
        }
        (-0.5 * mahalanobis).exp() / self.determinant.sqrt()
    }
}

/// Running sums for one component while fitting
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: Color,
    products: [[f64; 3]; 3],
}

impl Accumulator {
    fn add(&mut self, color: Color) {
        self.count += 1;
        for i in 0..3 {
            self.sum[i] += color[i];
            for j in 0..3 {
                self.products[i][j] += color[i] * color[j];
            }
        }
    }

    fn finish(&self, total: usize) -> Component {
        if self.count == 0 || total == 0 {
            return Component::default();
        }
        let n = self.count as f64;
        let mean = [self.sum[0] / n, self.sum[1] / n, self.sum[2] / n];

        let mut covariance = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                covariance[i][j] = self.products[i][j] / n - mean[i] * mean[j];
            }
        }

        let mut det = determinant(&covariance);
        if det <= f64::EPSILON {
            for (i, row) in covariance.iter_mut().enumerate() {
                row[i] += COVARIANCE_REGULARIZATION;
            }
            det = determinant(&covariance);
        }

        Component {
            weight: n / total as f64,
            mean,
            inverse: inverse(&covariance, det),
            determinant: det,
        }
    }
}

fn determinant(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn inverse(m: &[[f64; 3]; 3], det: f64) -> [[f64; 3]; 3] {
    let inv = 1.0 / det;
    [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
        ],
    ]
}

fn squared_distance(a: Color, b: Color) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest_center(color: Color, centers: &[Color]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (k, center) in centers.iter().enumerate() {
        let distance = squared_distance(color, *center);
        if distance < best_distance {
            best = k;
            best_distance = distance;
        }
    }
    best
}

/// Deterministic k-means clustering, returning a component per sample
pub(crate) fn kmeans(samples: &[Color]) -> Vec<usize> {
    let Some(&first) = samples.first() else {
        return Vec::new();
    };

    // Farthest-point seeding: each new center is the sample farthest from
    // all centers chosen so far.
    let mut centers = vec![first];
    let mut closest: Vec<f64> = samples
        .iter()
        .map(|&c| squared_distance(c, first))
        .collect();
    while centers.len() < COMPONENTS {
        let (index, distance) = closest
            .iter()
            .copied()
            .enumerate()
            .fold((0, -1.0), |best, (i, d)| if d > best.1 { (i, d) } else { best });
        if distance <= 0.0 {
            break;
        }
        let center = samples[index];
        centers.push(center);
        for (slot, &color) in closest.iter_mut().zip(samples) {
            *slot = slot.min(squared_distance(color, center));
        }
    }

    let mut labels: Vec<usize> = samples.iter().map(|&c| nearest_center(c, &centers)).collect();
    for _ in 0..KMEANS_ITERATIONS {
        let mut sums = vec![[0.0; 3]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (&label, color) in labels.iter().zip(samples) {
            counts[label] += 1;
            for c in 0..3 {
                sums[label][c] += color[c];
            }
        }
        for (k, center) in centers.iter_mut().enumerate() {
            if counts[k] > 0 {
                let n = counts[k] as f64;
                *center = [sums[k][0] / n, sums[k][1] / n, sums[k][2] / n];
            }
        }

        let mut changed = false;
        for (label, &color) in labels.iter_mut().zip(samples) {
            let nearest = nearest_center(color, &centers);
            if nearest != *label {
                *label = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    labels
}

/// Mixture of up to [`COMPONENTS`] Gaussians
#[derive(Debug, Clone, Default)]
pub(crate) struct ColorModel {
    components: [Component; COMPONENTS],
}

impl ColorModel {
    /// Fit a model to `samples` with a fixed component assignment
    pub(crate) fn fit(samples: &[Color], assignments: &[usize]) -> Self {
        let mut accumulators = [Accumulator::default(); COMPONENTS];
        for (&k, &color) in assignments.iter().zip(samples) {
            if let Some(acc) = accumulators.get_mut(k) {
                acc.add(color);
            }
        }
        let total = samples.len();
        let mut model = Self::default();
        for (component, acc) in model.components.iter_mut().zip(&accumulators) {
            *component = acc.finish(total);
        }
        model
    }

    /// Fit a fresh model using k-means to seed the component assignment
    pub(crate) fn from_samples(samples: &[Color]) -> Self {
        Self::fit(samples, &kmeans(samples))
    }

    /// Whether no component carries any weight
    pub(crate) fn is_empty(&self) -> bool {
        self.components.iter().all(|c| c.weight <= 0.0)
    }

    /// Mixture likelihood `sum(w_k * N_k(color))`
    pub(crate) fn likelihood(&self, color: Color) -> f64 {
        self.components
            .iter()
            .map(|c| c.weight * c.density(color))
            .sum()
    }

    /// Component with the highest density for `color`
    pub(crate) fn most_likely_component(&self, color: Color) -> usize {
        let mut best = 0;
        let mut best_density = 0.0;
        for (k, component) in self.components.iter().enumerate() {
            let density = component.density(color);
            if density > best_density {
                best = k;
                best_density = density;
            }
        }
        best
    }

    /// Reassign every sample to its most likely component, then refit
    pub(crate) fn refit(&self, samples: &[Color]) -> Self {
        let assignments: Vec<usize> = samples
            .iter()
            .map(|&c| self.most_likely_component(c))
            .collect();
        Self::fit(samples, &assignments)
    }
}
