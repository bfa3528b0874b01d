use std::sync::Arc;

use cgmath::Vector2;

use super::*;

/// Lazily built, shared distance and noise fields.
///
/// Fields are immutable once built and handed out as `Arc`s, so a worker thread and the
/// thread that configured the effect can read them without locking. A request for a
/// resolution the cache does not hold rebuilds the matching field in place.
#[derive(Debug, Default)]
pub struct FieldCache {
    distances: Vec<Arc<DistanceField>>,
    noises: Vec<Arc<NoiseField>>,
}

impl FieldCache {
    pub fn new() -> Self {
        FieldCache::default()
    }

    pub fn distance(
        &mut self,
        width: u32,
        height: u32,
        center: Vector2<f32>,
    ) -> Result<Arc<DistanceField>, Error> {
        let slot = self.distances.iter().position(|field| field.center() == center);
        if let Some(index) = slot {
            match self.distances[index].ensure_dimensions(width, height) {
                Ok(()) => return Ok(self.distances[index].clone()),
                Err(err) => log::debug!("[fields] rebuilding distance field: {}", err),
            }
        }
        let field = Arc::new(DistanceField::generate(width, height, center)?);
        match slot {
            Some(index) => self.distances[index] = field.clone(),
            None => self.distances.push(field.clone()),
        }
        Ok(field)
    }

    pub fn noise(&mut self, width: u32, height: u32, spec: NoiseSpec) -> Result<Arc<NoiseField>, Error> {
        let slot = self.noises.iter().position(|field| field.spec() == spec);
        if let Some(index) = slot {
            match self.noises[index].ensure_dimensions(width, height) {
                Ok(()) => return Ok(self.noises[index].clone()),
                Err(err) => log::debug!("[fields] rebuilding noise field: {}", err),
            }
        }
        let field = Arc::new(NoiseField::generate(width, height, spec)?);
        match slot {
            Some(index) => self.noises[index] = field.clone(),
            None => self.noises.push(field.clone()),
        }
        Ok(field)
    }

    pub fn len(&self) -> usize {
        self.distances.len() + self.noises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.distances.clear();
        self.noises.clear();
    }
}
