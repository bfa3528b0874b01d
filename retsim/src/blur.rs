use crate::*;

/// Box radii the blur stages are allowed to use.
pub const KERNEL_LADDER: [usize; 13] = [0, 1, 2, 3, 4, 6, 8, 11, 16, 22, 32, 45, 64];

/// Number of box passes; three approximate a gaussian.
pub const BOX_PASSES: usize = 3;

/// Snaps a requested radius in pixels to the nearest ladder entry.
pub fn quantize_radius(radius: f32) -> usize {
    if !(radius > 0.0) {
        return 0;
    }
    let mut best = KERNEL_LADDER[0];
    for &candidate in KERNEL_LADDER.iter() {
        if (candidate as f32 - radius).abs() < (best as f32 - radius).abs() {
            best = candidate;
        }
    }
    best
}

/// Separable box blur over interleaved `f32` buffers with reflected borders.
///
/// The scratch buffer is kept between calls so per-tick blurs do not allocate once the
/// resolution is stable.
#[derive(Debug, Default)]
pub struct BoxBlur {
    scratch: Vec<f32>,
}

impl BoxBlur {
    pub fn new() -> Self {
        BoxBlur {
            scratch: Vec::new(),
        }
    }

    ///
    /// Blurs `data` in place.
    ///
    /// # Arguments
    ///
    /// - `data`     - `width * height * channels` interleaved samples
    /// - `channels` - samples per pixel
    /// - `radius`   - box radius in pixels (window `2 * radius + 1`)
    /// - `passes`   - number of horizontal+vertical box passes
    ///
    pub fn apply(
        &mut self,
        data: &mut [f32],
        width: usize,
        height: usize,
        channels: usize,
        radius: usize,
        passes: usize,
    ) -> Result<(), Error> {
        if radius == 0 || passes == 0 || width == 0 || height == 0 {
            return Ok(());
        }
        let len = width * height * channels;
        if data.len() != len {
            return Err(Error::DimensionMismatch {
                expected: (width as u32, height as u32),
                actual: ((data.len() / (height * channels).max(1)) as u32, height as u32),
            });
        }
        try_resize(&mut self.scratch, len, "blur scratch")?;
        for _ in 0..passes {
            horizontal(data, &mut self.scratch, width, height, channels, radius);
            vertical(&self.scratch, data, width, height, channels, radius);
        }
        Ok(())
    }
}

fn horizontal(src: &[f32], dst: &mut [f32], width: usize, height: usize, channels: usize, radius: usize) {
    let window = (2 * radius + 1) as f32;
    let r = radius as isize;
    for y in 0..height {
        let row = y * width * channels;
        for c in 0..channels {
            let at = |x: isize| src[row + reflect(x, width) * channels + c];
            let mut sum = 0.0f32;
            for x in -r..=r {
                sum += at(x);
            }
            for x in 0..width {
                dst[row + x * channels + c] = sum / window;
                let xi = x as isize;
                sum += at(xi + r + 1) - at(xi - r);
            }
        }
    }
}

fn vertical(src: &[f32], dst: &mut [f32], width: usize, height: usize, channels: usize, radius: usize) {
    let window = (2 * radius + 1) as f32;
    let r = radius as isize;
    let stride = width * channels;
    for x in 0..width {
        for c in 0..channels {
            let column = x * channels + c;
            let at = |y: isize| src[reflect(y, height) * stride + column];
            let mut sum = 0.0f32;
            for y in -r..=r {
                sum += at(y);
            }
            for y in 0..height {
                dst[y * stride + column] = sum / window;
                let yi = y as isize;
                sum += at(yi + r + 1) - at(yi - r);
            }
        }
    }
}
