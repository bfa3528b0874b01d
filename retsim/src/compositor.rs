use crate::*;

/// One composition step. Steps are applied in the order the effect lists them.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    /// `O = O·(1-m) + B·m` with a blurred variant `B` (interleaved RGB `f32`).
    Blend { blurred: &'a [f32], mask: &'a Grid },
    /// Resample `O` through a displacement field.
    Warp(&'a DisplacementField),
    /// Overlay a mask toward a fill colour under the given convention.
    Overlay {
        mask: &'a Grid,
        convention: Convention,
        fill: [f32; 3],
    },
    /// Global contrast reduction around the input's mean luminance, then tint and dimming.
    Contrast {
        reduction: f32,
        tint: [f32; 3],
        tint_strength: f32,
        dimming: f32,
    },
}

/// Blends the raw frame, blurred variants and masks into the output frame.
///
/// Keeps its working buffers between ticks.
#[derive(Debug, Default)]
pub struct Compositor {
    width: u32,
    height: u32,
    mean_luminance: f32,
    buffer: Vec<f32>,
    scratch: Vec<f32>,
}

impl Compositor {
    pub fn new() -> Self {
        Compositor::default()
    }

    /// Loads the raw frame as the starting composite.
    pub fn begin(&mut self, frame: &Frame) -> Result<(), Error> {
        let (width, height) = frame.dimensions();
        self.width = width;
        self.height = height;
        try_resize(&mut self.buffer, frame.as_raw().len(), "composite buffer")?;
        frame_to_f32(frame, &mut self.buffer);
        self.mean_luminance = mean_luminance(&self.buffer);
        Ok(())
    }

    pub fn apply(&mut self, step: Step) -> Result<(), Error> {
        match step {
            Step::Blend { blurred, mask } => {
                mask.ensure_dimensions(self.width, self.height)?;
                if blurred.len() != self.buffer.len() {
                    return Err(self.mismatch(blurred.len()));
                }
                for (i, m) in mask.as_slice().iter().enumerate() {
                    if *m <= 0.0 {
                        continue;
                    }
                    for c in 0..3 {
                        let o = &mut self.buffer[i * 3 + c];
                        *o = *o * (1.0 - m) + blurred[i * 3 + c] * m;
                    }
                }
            }
            Step::Warp(field) => {
                if field.dimensions() != (self.width, self.height) {
                    return Err(Error::DimensionMismatch {
                        expected: field.dimensions(),
                        actual: (self.width, self.height),
                    });
                }
                if !field.is_identity() {
                    try_resize(&mut self.scratch, self.buffer.len(), "composite scratch")?;
                    remap(&self.buffer, &mut self.scratch, field)?;
                    std::mem::swap(&mut self.buffer, &mut self.scratch);
                }
            }
            Step::Overlay {
                mask,
                convention,
                fill,
            } => {
                mask.ensure_dimensions(self.width, self.height)?;
                for (i, m) in mask.as_slice().iter().enumerate() {
                    let lost = match convention {
                        Convention::Occlusion => *m,
                        Convention::Visible => 1.0 - *m,
                    };
                    if lost <= 0.0 {
                        continue;
                    }
                    for c in 0..3 {
                        let o = &mut self.buffer[i * 3 + c];
                        *o = *o * (1.0 - lost) + fill[c] * lost;
                    }
                }
            }
            Step::Contrast {
                reduction,
                tint,
                tint_strength,
                dimming,
            } => {
                let keep = 1.0 - reduction.max(0.0).min(1.0);
                let t = tint_strength.max(0.0).min(1.0);
                let bright = 1.0 - dimming.max(0.0).min(1.0);
                let pivot = self.mean_luminance;
                for px in self.buffer.chunks_exact_mut(3) {
                    for c in 0..3 {
                        let v = pivot + (px[c] - pivot) * keep;
                        let v = v * (1.0 - t) + v * tint[c] * t;
                        px[c] = v * bright;
                    }
                }
            }
        }
        Ok(())
    }

    /// The composite so far, interleaved RGB in `[0,255]`.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub fn finish(&self) -> Result<Frame, Error> {
        f32_to_frame(&self.buffer, self.width, self.height)
    }

    fn mismatch(&self, len: usize) -> Error {
        Error::DimensionMismatch {
            expected: (self.width, self.height),
            actual: ((len / 3 / self.height.max(1) as usize) as u32, self.height),
        }
    }
}

/// Rec. 709 mean luminance of an interleaved RGB buffer.
pub fn mean_luminance(rgb: &[f32]) -> f32 {
    let pixels = rgb.len() / 3;
    if pixels == 0 {
        return 0.0;
    }
    let sum: f64 = rgb
        .chunks_exact(3)
        .map(|px| 0.2126 * px[0] as f64 + 0.7152 * px[1] as f64 + 0.0722 * px[2] as f64)
        .sum();
    (sum / pixels as f64) as f32
}

/// Widens an 8-bit frame into `out`, which must already hold `w·h·3` samples.
pub fn frame_to_f32(frame: &Frame, out: &mut [f32]) {
    for (o, v) in out.iter_mut().zip(frame.as_raw().iter()) {
        *o = *v as f32;
    }
}

/// Rounds and clamps an interleaved RGB buffer back into an 8-bit frame.
pub fn f32_to_frame(rgb: &[f32], width: u32, height: u32) -> Result<Frame, Error> {
    let mut raw = try_alloc::<u8>(rgb.len(), "output frame")?;
    for (o, v) in raw.iter_mut().zip(rgb.iter()) {
        *o = v.round().max(0.0).min(255.0) as u8;
    }
    Frame::from_raw(width, height, raw).ok_or(Error::DimensionMismatch {
        expected: (width, height),
        actual: ((rgb.len() / 3 / height.max(1) as usize) as u32, height),
    })
}
