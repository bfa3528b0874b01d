use std::ops::Deref;

use super::*;

/// Seed and smoothing of a [NoiseField].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSpec {
    pub seed: u64,
    /// Box radius of the smoothing pass as a fraction of the larger frame side.
    pub smoothing: f32,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec {
            seed: 0x5eed,
            smoothing: 0.04,
        }
    }
}

impl NoiseSpec {
    pub fn with_seed(seed: u64) -> Self {
        NoiseSpec {
            seed,
            ..NoiseSpec::default()
        }
    }
}

/// Heavily smoothed gaussian noise rescaled to `[-1,1]`.
///
/// The same spec and resolution always produce a bit-identical field.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    spec: NoiseSpec,
    grid: Grid,
}

impl NoiseField {
    pub fn generate(width: u32, height: u32, spec: NoiseSpec) -> Result<Self, Error> {
        let mut grid = Grid::new(width, height)?;
        let mut rng = fastrand::Rng::with_seed(spec.seed);
        for pair in grid.as_mut_slice().chunks_mut(2) {
            let (a, b) = standard_normal_pair(&mut rng);
            pair[0] = a;
            if let Some(second) = pair.get_mut(1) {
                *second = b;
            }
        }

        let radius = (spec.smoothing.max(0.0) * width.max(height) as f32).round() as usize;
        BoxBlur::new().apply(
            grid.as_mut_slice(),
            width as usize,
            height as usize,
            1,
            radius,
            BOX_PASSES,
        )?;

        let (lo, hi) = grid.min_max();
        let range = hi - lo;
        for v in grid.as_mut_slice().iter_mut() {
            *v = if range > 0.0 {
                ((*v - lo) / range * 2.0 - 1.0).max(-1.0).min(1.0)
            } else {
                0.0
            };
        }

        Ok(NoiseField { spec, grid })
    }

    pub fn spec(&self) -> NoiseSpec {
        self.spec
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl Deref for NoiseField {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &self.grid
    }
}

/// Two independent standard-normal samples (Box-Muller).
fn standard_normal_pair(rng: &mut fastrand::Rng) -> (f32, f32) {
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = std::f64::consts::PI * 2.0 * u2;
    ((r * theta.cos()) as f32, (r * theta.sin()) as f32)
}
