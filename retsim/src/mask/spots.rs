use cgmath::Vector2;

use super::*;

/// A lesion that appears at its threshold and grows over a bounded severity span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    /// Normalized center.
    pub center: Vector2<f32>,
    /// Fully grown half-axes in reference lengths.
    pub radius_x: f32,
    pub radius_y: f32,
    pub threshold: f32,
    pub max_opacity: f32,
}

impl Spot {
    /// Growth in `[0,1]`; zero at and below the threshold.
    pub fn growth(&self, severity: f32, span: f32) -> f32 {
        let growth = if span > 0.0 {
            ((severity - self.threshold) / span).max(0.0).min(1.0)
        } else if severity > self.threshold {
            1.0
        } else {
            0.0
        };
        // absorb f32 rounding at the end of the span
        if growth > 1.0 - 1e-4 {
            1.0
        } else {
            growth
        }
    }

    /// Grown half-axes in reference lengths.
    pub fn extent(&self, severity: f32, span: f32) -> (f32, f32) {
        let growth = self.growth(severity, span);
        (self.radius_x * growth, self.radius_y * growth)
    }

    /// Peak opacity at the current severity.
    pub fn opacity(&self, severity: f32, span: f32) -> f32 {
        self.max_opacity.max(0.0).min(1.0) * self.growth(severity, span)
    }
}

/// Seeded placement of a fixed spot list inside an annulus of the visual field.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLayout {
    pub seed: u64,
    pub count: usize,
    /// Normalized center of the placement region.
    pub center: Vector2<f32>,
    /// Inner and outer normalized radius of the placement region.
    pub region: (f32, f32),
    /// Fully grown radius range in reference lengths.
    pub radius: (f32, f32),
    /// Ratio range between the vertical and horizontal half-axis.
    pub aspect: (f32, f32),
    /// Range the activation thresholds are drawn from.
    pub thresholds: (f32, f32),
    pub opacity: (f32, f32),
}

impl Default for SpotLayout {
    fn default() -> Self {
        SpotLayout {
            seed: 1,
            count: 16,
            center: Vector2::new(0.5, 0.5),
            region: (0.0, 0.5),
            radius: (0.01, 0.04),
            aspect: (0.7, 1.3),
            thresholds: (0.1, 0.9),
            opacity: (0.5, 1.0),
        }
    }
}

impl SpotLayout {
    /// Generates the spot list; the same layout always yields the same spots.
    pub fn generate(&self) -> Vec<Spot> {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let range = |rng: &mut fastrand::Rng, (lo, hi): (f32, f32)| lo + (hi - lo) * rng.f32();
        (0..self.count)
            .map(|_| {
                let (inner, outer) = self.region;
                let inner2 = inner.max(0.0).powi(2);
                let outer2 = outer.max(inner).powi(2);
                let rho = (inner2 + (outer2 - inner2) * rng.f32()).sqrt();
                let theta = std::f32::consts::PI * 2.0 * rng.f32();
                let radius = range(&mut rng, self.radius).max(0.0);
                let aspect = range(&mut rng, self.aspect).max(0.0);
                Spot {
                    center: self.center + Vector2::new(rho * theta.cos(), rho * theta.sin()),
                    radius_x: radius,
                    radius_y: radius * aspect,
                    threshold: clamp_severity(range(&mut rng, self.thresholds)),
                    max_opacity: range(&mut rng, self.opacity).max(0.0).min(1.0),
                }
            })
            .collect()
    }
}

///
/// Accumulates spots into a lesion mask.
///
/// Each spot is opaque inside its grown ellipse and fades linearly to zero at twice that
/// size. Overlapping spots combine by maximum.
///
pub fn build_lesions(spots: &[Spot], growth_span: f32, severity: f32, mask: &mut Grid) {
    mask.fill(0.0);
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let length = reference_length(width, height);

    for spot in spots.iter() {
        let opacity = spot.opacity(severity, growth_span);
        let (rx, ry) = spot.extent(severity, growth_span);
        let (rx, ry) = (rx * length, ry * length);
        if opacity <= 0.0 || rx < 1e-3 || ry < 1e-3 {
            continue;
        }
        let (cx, cy) = pixel_center(width, height, spot.center);

        let x_start = (cx - 2.0 * rx).floor().max(0.0) as u32;
        let x_end = ((cx + 2.0 * rx).ceil().max(0.0) as u32).min(width - 1);
        let y_start = (cy - 2.0 * ry).floor().max(0.0) as u32;
        let y_end = ((cy + 2.0 * ry).ceil().max(0.0) as u32).min(height - 1);
        if x_start > x_end || y_start > y_end {
            continue;
        }

        for y in y_start..=y_end {
            let v = (y as f32 - cy) / ry;
            for x in x_start..=x_end {
                let u = (x as f32 - cx) / rx;
                let q = (u * u + v * v).sqrt();
                let falloff = if q <= 1.0 {
                    1.0
                } else if q < 2.0 {
                    2.0 - q
                } else {
                    continue;
                };
                let value = opacity * falloff;
                if value > mask.get(x, y) {
                    mask.set(x, y, value);
                }
            }
        }
    }
}
