//!
//! Metamorphopsia: periodic displacement fields and bilinear remapping.
//!
use cgmath::Vector2;

use crate::*;

/// Confines distortion to a disk around a normalized center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionGate {
    pub center: Vector2<f32>,
    /// Radius in reference lengths.
    pub radius: f32,
}

/// Static per-pixel phase tables for one resolution and wavelength.
///
/// `sin_x` drives the horizontal displacement and varies along rows, `cos_y` drives the
/// vertical displacement and varies along columns. The optional gate weight is folded into
/// both tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTables {
    width: u32,
    height: u32,
    wavelength: f32,
    gate: Option<DistortionGate>,
    sin_x: Vec<f32>,
    cos_y: Vec<f32>,
}

impl PhaseTables {
    ///
    /// # Arguments
    ///
    /// - `wavelength` - spatial period in pixels, at least 2
    /// - `gate`       - optional radial confinement
    ///
    pub fn new(
        width: u32,
        height: u32,
        wavelength: f32,
        gate: Option<DistortionGate>,
    ) -> Result<Self, Error> {
        let wavelength = wavelength.max(2.0);
        let len = width as usize * height as usize;
        let mut sin_x = try_alloc::<f32>(len, "distortion phase table")?;
        let mut cos_y = try_alloc::<f32>(len, "distortion phase table")?;
        let omega = std::f32::consts::PI * 2.0 / wavelength;
        let length = reference_length(width, height);
        let gate_center = gate.map(|g| pixel_center(width, height, g.center));

        for y in 0..height {
            for x in 0..width {
                let i = (y * width + x) as usize;
                let weight = match (gate, gate_center) {
                    (Some(g), Some((cx, cy))) => {
                        let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                        let reach = (g.radius * length).max(1.0);
                        (1.0 - d / reach).max(0.0).min(1.0).powi(2)
                    }
                    _ => 1.0,
                };
                sin_x[i] = (omega * y as f32).sin() * weight;
                cos_y[i] = (omega * x as f32).cos() * weight;
            }
        }

        Ok(PhaseTables {
            width,
            height,
            wavelength,
            gate,
            sin_x,
            cos_y,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn matches(&self, width: u32, height: u32, wavelength: f32, gate: Option<DistortionGate>) -> bool {
        self.width == width
            && self.height == height
            && self.wavelength == wavelength.max(2.0)
            && self.gate == gate
    }
}

/// Per-pixel displacement in pixels, recomputed every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    width: u32,
    height: u32,
    amplitude: f32,
    dx: Vec<f32>,
    dy: Vec<f32>,
}

impl DisplacementField {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let len = width as usize * height as usize;
        Ok(DisplacementField {
            width,
            height,
            amplitude: 0.0,
            dx: try_alloc(len, "displacement field")?,
            dy: try_alloc(len, "displacement field")?,
        })
    }

    /// Recomputes `dx = amplitude·sin_x`, `dy = amplitude·cos_y`.
    pub fn update(&mut self, tables: &PhaseTables, amplitude: f32) -> Result<(), Error> {
        if tables.dimensions() != (self.width, self.height) {
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: tables.dimensions(),
            });
        }
        self.amplitude = if amplitude.is_finite() { amplitude } else { 0.0 };
        let amplitude = self.amplitude;
        for (d, s) in self.dx.iter_mut().zip(tables.sin_x.iter()) {
            *d = amplitude * s;
        }
        for (d, c) in self.dy.iter_mut().zip(tables.cos_y.iter()) {
            *d = amplitude * c;
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn is_identity(&self) -> bool {
        self.amplitude == 0.0
    }

    pub fn dx(&self) -> &[f32] {
        &self.dx
    }

    pub fn dy(&self) -> &[f32] {
        &self.dy
    }
}

/// Samples an interleaved RGB `f32` buffer at a fractional position, reflecting at the
/// borders.
#[inline]
pub fn sample_bilinear(src: &[f32], width: usize, height: usize, x: f32, y: f32) -> [f32; 3] {
    let xf = x.floor();
    let yf = y.floor();
    let tx = x - xf;
    let ty = y - yf;
    let x0 = reflect(xf as isize, width);
    let x1 = reflect(xf as isize + 1, width);
    let y0 = reflect(yf as isize, height);
    let y1 = reflect(yf as isize + 1, height);

    let p00 = (y0 * width + x0) * 3;
    let p10 = (y0 * width + x1) * 3;
    let p01 = (y1 * width + x0) * 3;
    let p11 = (y1 * width + x1) * 3;

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let top = src[p00 + c] * (1.0 - tx) + src[p10 + c] * tx;
        let bottom = src[p01 + c] * (1.0 - tx) + src[p11 + c] * tx;
        out[c] = top * (1.0 - ty) + bottom * ty;
    }
    out
}

/// Resamples `src` at `(x + dx, y + dy)` into `dst`. Both are interleaved RGB `f32`.
pub fn remap(src: &[f32], dst: &mut [f32], field: &DisplacementField) -> Result<(), Error> {
    let (width, height) = field.dimensions();
    let len = width as usize * height as usize * 3;
    if src.len() != len || dst.len() != len {
        return Err(Error::DimensionMismatch {
            expected: (width, height),
            actual: ((src.len() / 3 / height.max(1) as usize) as u32, height),
        });
    }
    if field.is_identity() {
        dst.copy_from_slice(src);
        return Ok(());
    }
    let (w, h) = (width as usize, height as usize);
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let px = sample_bilinear(src, w, h, x as f32 + field.dx[i], y as f32 + field.dy[i]);
            dst[i * 3..i * 3 + 3].copy_from_slice(&px);
        }
    }
    Ok(())
}

/// Remaps an 8-bit frame; a zero-amplitude field returns an exact copy.
pub fn remap_frame(frame: &Frame, field: &DisplacementField) -> Result<Frame, Error> {
    let (width, height) = frame.dimensions();
    if field.dimensions() != (width, height) {
        return Err(Error::DimensionMismatch {
            expected: field.dimensions(),
            actual: (width, height),
        });
    }
    if field.is_identity() {
        return Ok(frame.clone());
    }
    let mut src = try_alloc::<f32>(frame.as_raw().len(), "remap source")?;
    frame_to_f32(frame, &mut src);
    let mut dst = try_alloc::<f32>(src.len(), "remap target")?;
    remap(&src, &mut dst, field)?;
    f32_to_frame(&dst, width, height)
}
