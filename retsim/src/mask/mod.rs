//!
//! Mask builders: pure functions from severity and cached fields to weight grids in `[0,1]`.
//!
mod rim;
mod spots;

pub use self::rim::*;
pub use self::spots::*;

use crate::*;

/// How an overlay mask is read by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// The mask is the lost fraction: `O = O·(1-m) + fill·m`.
    Occlusion,
    /// The mask is the kept fraction: `O = O·m + fill·(1-m)`.
    Visible,
}

/// A piecewise-linear function of severity, flat outside its first and last knot.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    knots: Vec<(f32, f32)>,
}

impl Ramp {
    /// Knots are `(severity, value)` pairs with non-decreasing severities. Two knots at the
    /// same severity form a step; the later knot applies from that severity on.
    pub fn new(knots: Vec<(f32, f32)>) -> Result<Self, Error> {
        if knots.is_empty() {
            return Err(Error::InvalidDescriptor("ramp without knots".into()));
        }
        if knots.iter().any(|(s, v)| !s.is_finite() || !v.is_finite()) {
            return Err(Error::InvalidDescriptor("ramp with non-finite knot".into()));
        }
        if knots.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(Error::InvalidDescriptor(format!(
                "ramp knots out of order: {:?}",
                knots
            )));
        }
        Ok(Ramp { knots })
    }

    pub fn constant(value: f32) -> Self {
        Ramp {
            knots: vec![(0.0, value)],
        }
    }

    /// A single linear segment, flat outside `[from.0, to.0]`.
    pub fn linear(from: (f32, f32), to: (f32, f32)) -> Self {
        if to.0 < from.0 {
            Ramp {
                knots: vec![to, from],
            }
        } else {
            Ramp {
                knots: vec![from, to],
            }
        }
    }

    /// A ramp through `values[k]` at the lower edge of band `k` (severity 0 for band 0).
    pub fn from_bands(bands: &Bands, values: &[f32]) -> Result<Self, Error> {
        if values.len() != bands.len() + 1 {
            return Err(Error::InvalidDescriptor(format!(
                "{} band values for {} thresholds",
                values.len(),
                bands.len()
            )));
        }
        let mut knots = Vec::with_capacity(values.len());
        knots.push((0.0, values[0]));
        for (edge, value) in bands.edges().iter().zip(values[1..].iter()) {
            knots.push((*edge, *value));
        }
        Ramp::new(knots)
    }

    pub fn eval(&self, severity: f32) -> f32 {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        if severity < first.0 {
            return first.1;
        }
        if severity >= last.0 {
            return last.1;
        }
        for w in self.knots.windows(2) {
            let (a, b) = (w[0], w[1]);
            if severity >= a.0 && severity < b.0 {
                let t = (severity - a.0) / (b.0 - a.0);
                return a.1 + (b.1 - a.1) * t;
            }
        }
        last.1
    }

    pub fn knots(&self) -> &[(f32, f32)] {
        &self.knots
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.knots.windows(2).all(|w| w[1].1 >= w[0].1)
    }

    pub fn max_value(&self) -> f32 {
        self.knots.iter().map(|k| k.1).fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Named severity thresholds `S1 ≤ S2 ≤ …`.
///
/// Band `k` covers `[S_k, S_{k+1})`: the lower edge is inclusive, the upper edge exclusive.
/// Severities below `S1` are band 0 and the last band also holds 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    edges: Vec<f32>,
}

impl Bands {
    pub fn new(edges: Vec<f32>) -> Result<Self, Error> {
        if edges.iter().any(|e| !(*e >= 0.0 && *e <= 1.0)) {
            return Err(Error::InvalidDescriptor(format!(
                "band thresholds outside [0,1]: {:?}",
                edges
            )));
        }
        if edges.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidDescriptor(format!(
                "band thresholds out of order: {:?}",
                edges
            )));
        }
        Ok(Bands { edges })
    }

    /// Builds bands from possibly unordered user thresholds, clamping each into `[0,1]` and
    /// raising it to at least its predecessor.
    pub fn clamped(edges: &[f32]) -> Self {
        let mut previous = 0.0f32;
        let edges = edges
            .iter()
            .map(|e| {
                let e = clamp_severity(*e).max(previous);
                previous = e;
                e
            })
            .collect();
        Bands { edges }
    }

    pub fn none() -> Self {
        Bands { edges: Vec::new() }
    }

    pub fn band(&self, severity: f32) -> usize {
        self.edges.iter().filter(|e| **e <= severity).count()
    }

    /// Threshold `S_k`, 1-based like the band names.
    pub fn threshold(&self, k: usize) -> Option<f32> {
        if k == 0 {
            None
        } else {
            self.edges.get(k - 1).copied()
        }
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Fills `mask` with a constant weight.
pub fn build_uniform(value: f32, mask: &mut Grid) {
    mask.fill(value.max(0.0).min(1.0));
}
