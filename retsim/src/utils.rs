use std::path::Path;

use crate::*;

/// Severities at or below this value leave the frame untouched.
pub const IDLE_SEVERITY: f32 = 1e-3;

/// Allocates a default-filled buffer, reporting allocation failure instead of aborting.
pub fn try_alloc<T: Clone + Default>(len: usize, what: &'static str) -> Result<Vec<T>, Error> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| Error::ResourceExhaustion {
            what,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Resizes `buffer` to `len` elements, reporting allocation failure.
pub fn try_resize<T: Clone + Default>(
    buffer: &mut Vec<T>,
    len: usize,
    what: &'static str,
) -> Result<(), Error> {
    if len > buffer.len() {
        buffer
            .try_reserve_exact(len - buffer.len())
            .map_err(|_| Error::ResourceExhaustion {
                what,
                bytes: len.saturating_mul(std::mem::size_of::<T>()),
            })?;
    }
    buffer.resize(len, T::default());
    Ok(())
}

/// Mirrors `index` into `0..len` without repeating the edge sample (reflect-101).
#[inline]
pub fn reflect(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = index.rem_euclid(period);
    if m >= len as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Half the frame diagonal; the unit of every geometric parameter.
pub fn reference_length(width: u32, height: u32) -> f32 {
    0.5 * ((width as f32).powi(2) + (height as f32).powi(2)).sqrt()
}

/// Clamps a severity reading into `[0,1]`; NaN reads as zero.
pub fn clamp_severity(severity: f32) -> f32 {
    if severity.is_nan() {
        0.0
    } else {
        severity.max(0.0).min(1.0)
    }
}

/// Size of the reduced working resolution for a `scale` in `[0.1, 1]`.
pub fn work_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = clamp_work_scale(scale);
    (
        ((width as f32 * scale).ceil() as u32).max(1).min(width.max(1)),
        ((height as f32 * scale).ceil() as u32).max(1).min(height.max(1)),
    )
}

pub fn clamp_work_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        1.0
    } else {
        scale.max(0.1).min(1.0)
    }
}

/// Loads an image file as an RGB frame.
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame, Error> {
    Ok(image::open(path)?.to_rgb8())
}
