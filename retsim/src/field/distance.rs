use std::ops::Deref;

use cgmath::Vector2;

use super::*;

/// Euclidean distance of every pixel from a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    center: Vector2<f32>,
    nearest: f32,
    farthest: f32,
    grid: Grid,
}

impl DistanceField {
    ///
    /// Builds the distance field for a frame.
    ///
    /// # Arguments
    ///
    /// - `width`, `height` - frame resolution
    /// - `center`          - normalized center, `(0,0)` top-left and `(1,1)` bottom-right;
    ///                       values outside the frame are allowed
    ///
    pub fn generate(width: u32, height: u32, center: Vector2<f32>) -> Result<Self, Error> {
        let (cx, cy) = pixel_center(width, height, center);
        let grid = Grid::from_fn(width, height, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            (dx * dx + dy * dy).sqrt()
        })?;
        let (nearest, farthest) = grid.min_max();
        Ok(DistanceField {
            center,
            nearest,
            farthest,
            grid,
        })
    }

    pub fn center(&self) -> Vector2<f32> {
        self.center
    }

    /// Distance of the closest pixel; zero when the center lies on the frame.
    pub fn nearest(&self) -> f32 {
        self.nearest
    }

    /// Distance of the farthest pixel.
    pub fn farthest(&self) -> f32 {
        self.farthest
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl Deref for DistanceField {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &self.grid
    }
}

/// Pixel coordinates of a normalized point.
pub fn pixel_center(width: u32, height: u32, center: Vector2<f32>) -> (f32, f32) {
    (
        center.x * width.saturating_sub(1) as f32,
        center.y * height.saturating_sub(1) as f32,
    )
}
