//!
//! Per-pixel scalar grids: masks, distance fields and noise fields.
//!
mod cache;
mod distance;
mod noise;

pub use self::cache::*;
pub use self::distance::*;
pub use self::noise::*;

use crate::*;

/// A row-major `width × height` grid of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// A grid whose values lie in `[0,1]`.
pub type Mask = Grid;

impl Grid {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self, Error> {
        let mut data = try_alloc::<f32>(width as usize * height as usize, "grid")?;
        if value != 0.0 {
            data.iter_mut().for_each(|v| *v = value);
        }
        Ok(Grid {
            width,
            height,
            data,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, Error>
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut grid = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                grid.data[(y * width + x) as usize] = f(x, y);
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[(y * self.width + x) as usize] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Smallest and largest value, `(0, 0)` for an empty grid.
    pub fn min_max(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub fn clamp_unit(&mut self) {
        self.data.iter_mut().for_each(|v| *v = v.max(0.0).min(1.0));
    }

    /// Fails with [Error::DimensionMismatch] unless the grid is `width × height`.
    pub fn ensure_dimensions(&self, width: u32, height: u32) -> Result<(), Error> {
        if self.width == width && self.height == height {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (width, height),
            })
        }
    }

    /// Bilinear resample to `width × height`, aligning pixel centers.
    pub fn resized(&self, width: u32, height: u32) -> Result<Grid, Error> {
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }
        let mut out = Grid::new(width, height)?;
        if self.data.is_empty() {
            return Ok(out);
        }
        let sx = self.width as f32 / width.max(1) as f32;
        let sy = self.height as f32 / height.max(1) as f32;
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        for y in 0..height {
            let fy = ((y as f32 + 0.5) * sy - 0.5).max(0.0).min(max_y);
            let y0 = fy.floor() as u32;
            let y1 = (y0 + 1).min(self.height - 1);
            let ty = fy - y0 as f32;
            for x in 0..width {
                let fx = ((x as f32 + 0.5) * sx - 0.5).max(0.0).min(max_x);
                let x0 = fx.floor() as u32;
                let x1 = (x0 + 1).min(self.width - 1);
                let tx = fx - x0 as f32;
                let top = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
                let bottom = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;
                out.set(x, y, top * (1.0 - ty) + bottom * ty);
            }
        }
        Ok(out)
    }
}
