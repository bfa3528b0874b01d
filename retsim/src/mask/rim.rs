use cgmath::Vector2;

use super::*;

/// Where a vision-loss rim starts eating into the visual field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RimAnchor {
    /// Loss grows outward from the pixel nearest the center (scotoma, curtain).
    Central,
    /// Loss grows inward from one reference length around the center (tunnel vision).
    Peripheral,
}

/// Geometry of a soft-rimmed vision-loss region.
///
/// All ramps are in units of the reference length (half the frame diagonal) and must be
/// non-decreasing, so the affected area never shrinks as severity grows.
#[derive(Debug, Clone, PartialEq)]
pub struct RimSpec {
    pub anchor: RimAnchor,
    /// Normalized center of the distance field.
    pub center: Vector2<f32>,
    /// Depth of the loss measured from the anchor.
    pub radius: Ramp,
    /// Amplitude of the noise displacement of the rim.
    pub irregularity: Ramp,
    /// Width of the soft transition.
    pub fade: Ramp,
    pub noise: NoiseSpec,
}

impl RimSpec {
    pub fn central(radius: Ramp) -> Self {
        RimSpec {
            anchor: RimAnchor::Central,
            center: Vector2::new(0.5, 0.5),
            radius,
            irregularity: Ramp::constant(0.0),
            fade: Ramp::constant(0.05),
            noise: NoiseSpec::default(),
        }
    }

    pub fn peripheral(radius: Ramp) -> Self {
        RimSpec {
            anchor: RimAnchor::Peripheral,
            ..RimSpec::central(radius)
        }
    }

    pub fn with_center(mut self, center: Vector2<f32>) -> Self {
        self.center = center;
        self
    }

    pub fn with_irregularity(mut self, irregularity: Ramp) -> Self {
        self.irregularity = irregularity;
        self
    }

    pub fn with_fade(mut self, fade: Ramp) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_noise(mut self, noise: NoiseSpec) -> Self {
        self.noise = noise;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, ramp) in [
            ("radius", &self.radius),
            ("irregularity", &self.irregularity),
            ("fade", &self.fade),
        ]
        .iter()
        {
            if !ramp.is_non_decreasing() {
                return Err(Error::InvalidDescriptor(format!(
                    "rim {} must not decrease with severity: {:?}",
                    name,
                    ramp.knots()
                )));
            }
            if ramp.knots().iter().any(|k| k.1 < 0.0) {
                return Err(Error::InvalidDescriptor(format!(
                    "rim {} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }
}

///
/// Builds a soft-rimmed vision-loss mask.
///
/// The rim sits at the loss depth `r(s) + a(s)·noise` from the anchor, fades over `fade(s)`
/// and is finally smoothed with a box blur of a quarter fade width. The noise amplitude never
/// exceeds the depth, so nothing is lost while the depth is zero.
///
/// # Arguments
///
/// - `spec`       - rim geometry
/// - `severity`   - clamped severity
/// - `distance`   - distance field around `spec.center` at the mask resolution
/// - `noise`      - noise field for `spec.noise` at the mask resolution
/// - `convention` - whether the mask holds lost or kept fractions
/// - `mask`       - output grid, its size selects the resolution
///
pub fn build_rim(
    spec: &RimSpec,
    severity: f32,
    distance: &DistanceField,
    noise: &NoiseField,
    convention: Convention,
    blur: &mut BoxBlur,
    mask: &mut Grid,
) -> Result<(), Error> {
    let (width, height) = mask.dimensions();
    distance.ensure_dimensions(width, height)?;
    noise.ensure_dimensions(width, height)?;

    let length = reference_length(width, height);
    let radius = spec.radius.eval(severity).max(0.0) * length;
    let amplitude = (spec.irregularity.eval(severity).max(0.0) * length).min(radius);
    let fade = (spec.fade.eval(severity) * length).max(1.0);
    let origin = match spec.anchor {
        RimAnchor::Central => distance.nearest(),
        RimAnchor::Peripheral => length,
    };

    let distances = distance.as_slice();
    let offsets = noise.as_slice();
    for (i, out) in mask.as_mut_slice().iter_mut().enumerate() {
        let depth = match spec.anchor {
            RimAnchor::Central => distances[i] - origin,
            RimAnchor::Peripheral => origin - distances[i],
        };
        let effective = radius + amplitude * offsets[i];
        let loss = if effective <= 0.0 {
            0.0
        } else {
            let fade = fade.min(2.0 * effective);
            ((effective - depth) / fade + 0.5).max(0.0).min(1.0)
        };
        *out = match convention {
            Convention::Occlusion => loss,
            Convention::Visible => 1.0 - loss,
        };
    }

    blur.apply(
        mask.as_mut_slice(),
        width as usize,
        height as usize,
        1,
        quantize_radius(fade / 4.0),
        BOX_PASSES,
    )?;
    mask.clamp_unit();
    Ok(())
}
