//!
//! The effect engine: runs one [EffectDescriptor] against incoming frames.
//!
mod descriptor;

pub use self::descriptor::*;

use std::sync::Arc;

use image::imageops::{self, FilterType};

use crate::*;

/// Whether the last processed frame was passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    Idle,
    Active,
}

/// A mask remembered for one severity and frame size.
#[derive(Debug, Default)]
struct MaskMemo {
    key: Option<(u32, u32, u32)>,
    mask: Option<Grid>,
}

impl MaskMemo {
    fn get_or_build<F>(&mut self, key: (u32, u32, u32), build: F) -> Result<&Grid, Error>
    where
        F: FnOnce() -> Result<Grid, Error>,
    {
        let cached = if self.key == Some(key) {
            self.mask.take()
        } else {
            None
        };
        let mask = match cached {
            Some(mask) => mask,
            None => build()?,
        };
        self.key = Some(key);
        let mask: &Grid = self.mask.insert(mask);
        Ok(mask)
    }

    fn clear(&mut self) {
        self.key = None;
        self.mask = None;
    }
}

/// Per-layer buffers owned by the effect.
#[derive(Debug, Default)]
struct LayerCache {
    memo: MaskMemo,
    blurred: Vec<f32>,
    phases: Option<PhaseTables>,
    displacement: Option<DisplacementField>,
}

///
/// A disease effect instance.
///
/// Masks are memoized on (severity, resolution) and rebuilt whenever either changes, so
/// the output for a severity never depends on the severities visited before. Enabled
/// layers are re-derived from their onsets on every call.
///
pub struct Effect {
    descriptor: EffectDescriptor,
    spots: Vec<Arc<[Spot]>>,
    work_scale: f32,
    fields: FieldCache,
    blur: BoxBlur,
    compositor: Compositor,
    caches: Vec<LayerCache>,
    band: Option<usize>,
    state: EffectState,
}

impl Effect {
    /// Validates the descriptor and places the lesion spots of every lesion layer.
    pub fn new(descriptor: EffectDescriptor) -> Result<Self, Error> {
        descriptor.validate()?;
        let spots = descriptor
            .layers
            .iter()
            .map(|layer| match layer {
                Layer::Lesions(layer) => Arc::<[Spot]>::from(layer.layout.generate()),
                _ => Arc::<[Spot]>::from(Vec::new()),
            })
            .collect();
        let caches = descriptor.layers.iter().map(|_| LayerCache::default()).collect();
        log::info!(
            "[{}] effect with {} layers",
            descriptor.name,
            descriptor.layers.len()
        );
        Ok(Effect {
            descriptor,
            spots,
            work_scale: 1.0,
            fields: FieldCache::new(),
            blur: BoxBlur::new(),
            compositor: Compositor::new(),
            caches,
            band: None,
            state: EffectState::Idle,
        })
    }

    /// Computes masks and blurred variants at a fraction of the frame resolution.
    pub fn with_work_scale(mut self, scale: f32) -> Self {
        self.set_work_scale(scale);
        self
    }

    pub fn set_work_scale(&mut self, scale: f32) {
        let scale = clamp_work_scale(scale);
        if scale != self.work_scale {
            self.work_scale = scale;
            self.reset();
        }
    }

    pub fn work_scale(&self) -> f32 {
        self.work_scale
    }

    pub fn descriptor(&self) -> &EffectDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn stages(&self, severity: f32) -> Stages {
        self.descriptor.stages(severity)
    }

    /// The spot list of layer `index`; empty for layers without lesions.
    pub fn spots(&self, index: usize) -> Option<Arc<[Spot]>> {
        self.spots.get(index).cloned()
    }

    /// Drops every cached field, mask and buffer.
    pub fn reset(&mut self) {
        self.fields.clear();
        for cache in self.caches.iter_mut() {
            cache.memo.clear();
            cache.blurred = Vec::new();
            cache.phases = None;
            cache.displacement = None;
        }
        self.band = None;
        self.state = EffectState::Idle;
    }

    ///
    /// Builds the mask layer `index` would blend at `severity` for a `width × height` frame,
    /// without compositing. Layers without a mask and disabled layers yield `None`.
    ///
    pub fn layer_mask(
        &mut self,
        index: usize,
        width: u32,
        height: u32,
        severity: f32,
    ) -> Result<Option<Grid>, Error> {
        let severity = clamp_severity(severity);
        let layer = match self.descriptor.layers.get(index) {
            Some(layer) => layer,
            None => return Ok(None),
        };
        if severity <= IDLE_SEVERITY || severity < layer.onset() {
            return Ok(None);
        }
        let work = work_dimensions(width, height, self.work_scale);
        build_layer_mask(
            layer,
            &self.spots[index],
            severity,
            work,
            (width, height),
            &mut self.fields,
            &mut self.blur,
        )
    }

    ///
    /// Composites one frame.
    ///
    /// # Arguments
    ///
    /// - `frame`    - raw input frame
    /// - `severity` - progression, clamped into `[0,1]`
    ///
    pub fn process(&mut self, frame: &Frame, severity: f32) -> Result<Frame, Error> {
        let severity = clamp_severity(severity);
        self.track_band(severity);
        if severity <= IDLE_SEVERITY {
            self.state = EffectState::Idle;
            return Ok(frame.clone());
        }
        self.state = EffectState::Active;

        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Ok(frame.clone());
        }
        let work = work_dimensions(width, height, self.work_scale);
        let key = (severity.to_bits(), width, height);

        let Effect {
            descriptor,
            spots,
            fields,
            blur,
            compositor,
            caches,
            ..
        } = self;

        compositor.begin(frame)?;
        for (index, layer) in descriptor.layers.iter().enumerate() {
            if severity < layer.onset() {
                continue;
            }
            let cache = &mut caches[index];
            let spots = &spots[index];
            match layer {
                Layer::Blur(blur_layer) => {
                    let radius = quantize_radius(
                        blur_layer.radius.eval(severity) * reference_length(work.0, work.1),
                    );
                    blurred_variant(frame, work, radius, blur, &mut cache.blurred)?;
                    let mask = cache.memo.get_or_build(key, || {
                        required(build_layer_mask(
                            layer,
                            spots,
                            severity,
                            work,
                            (width, height),
                            fields,
                            blur,
                        )?)
                    })?;
                    compositor.apply(Step::Blend {
                        blurred: &cache.blurred,
                        mask,
                    })?;
                }
                Layer::Distortion(distortion) => {
                    let length = reference_length(width, height);
                    let wavelength = distortion.wavelength * length;
                    let amplitude = distortion.amplitude.eval(severity) * length;
                    let tables = match cache.phases.take() {
                        Some(tables) if tables.matches(width, height, wavelength, distortion.gate) => {
                            tables
                        }
                        _ => PhaseTables::new(width, height, wavelength, distortion.gate)?,
                    };
                    let tables = cache.phases.insert(tables);
                    let field = match cache.displacement.take() {
                        Some(field) if field.dimensions() == (width, height) => field,
                        _ => DisplacementField::new(width, height)?,
                    };
                    let field = cache.displacement.insert(field);
                    field.update(tables, amplitude)?;
                    compositor.apply(Step::Warp(&*field))?;
                }
                Layer::Lesions(lesions) => {
                    let mask = cache.memo.get_or_build(key, || {
                        required(build_layer_mask(
                            layer,
                            spots,
                            severity,
                            work,
                            (width, height),
                            fields,
                            blur,
                        )?)
                    })?;
                    compositor.apply(Step::Overlay {
                        mask,
                        convention: Convention::Occlusion,
                        fill: fill_color(lesions.fill),
                    })?;
                }
                Layer::VisionLoss(loss) => {
                    let mask = cache.memo.get_or_build(key, || {
                        required(build_layer_mask(
                            layer,
                            spots,
                            severity,
                            work,
                            (width, height),
                            fields,
                            blur,
                        )?)
                    })?;
                    compositor.apply(Step::Overlay {
                        mask,
                        convention: loss.convention,
                        fill: fill_color(loss.fill),
                    })?;
                }
                Layer::Contrast(contrast) => {
                    compositor.apply(Step::Contrast {
                        reduction: contrast.reduction.eval(severity),
                        tint: contrast.tint,
                        tint_strength: contrast.tint_strength.eval(severity),
                        dimming: contrast.dimming.eval(severity),
                    })?;
                }
            }
        }
        compositor.finish()
    }

    fn track_band(&mut self, severity: f32) {
        let band = self.descriptor.bands.band(severity);
        if self.band != Some(band) {
            log::debug!(
                "[{}] severity {:.3} is in band {}",
                self.descriptor.name,
                severity,
                band
            );
            self.band = Some(band);
        }
    }
}

/// Builds the full-resolution mask of a masked layer.
fn build_layer_mask(
    layer: &Layer,
    spots: &[Spot],
    severity: f32,
    work: (u32, u32),
    full: (u32, u32),
    fields: &mut FieldCache,
    blur: &mut BoxBlur,
) -> Result<Option<Grid>, Error> {
    let mask = match layer {
        Layer::Blur(layer) => {
            let strength = layer.strength.eval(severity);
            match &layer.region {
                Some(rim) => rim_mask(
                    rim,
                    severity,
                    Convention::Occlusion,
                    strength,
                    work,
                    fields,
                    blur,
                )?,
                None => {
                    let mut mask = Grid::new(work.0, work.1)?;
                    build_uniform(strength, &mut mask);
                    mask
                }
            }
        }
        Layer::Lesions(layer) => {
            let mut mask = Grid::new(work.0, work.1)?;
            build_lesions(spots, layer.growth_span, severity, &mut mask);
            mask
        }
        Layer::VisionLoss(layer) => rim_mask(
            &layer.rim,
            severity,
            layer.convention,
            layer.strength.eval(severity),
            work,
            fields,
            blur,
        )?,
        Layer::Distortion(_) | Layer::Contrast(_) => return Ok(None),
    };
    let mut mask = mask.resized(full.0, full.1)?;
    mask.clamp_unit();
    Ok(Some(mask))
}

fn rim_mask(
    rim: &RimSpec,
    severity: f32,
    convention: Convention,
    strength: f32,
    work: (u32, u32),
    fields: &mut FieldCache,
    blur: &mut BoxBlur,
) -> Result<Grid, Error> {
    let distance = fields.distance(work.0, work.1, rim.center)?;
    let noise = fields.noise(work.0, work.1, rim.noise)?;
    let mut mask = Grid::new(work.0, work.1)?;
    build_rim(rim, severity, &distance, &noise, convention, blur, &mut mask)?;

    let strength = strength.max(0.0).min(1.0);
    if strength < 1.0 {
        for m in mask.as_mut_slice().iter_mut() {
            *m = match convention {
                Convention::Occlusion => *m * strength,
                Convention::Visible => 1.0 - (1.0 - *m) * strength,
            };
        }
    }
    Ok(mask)
}

/// Blurs `frame` into `out` (interleaved RGB `f32`), going through the work resolution.
fn blurred_variant(
    frame: &Frame,
    work: (u32, u32),
    radius: usize,
    blur: &mut BoxBlur,
    out: &mut Vec<f32>,
) -> Result<(), Error> {
    let (width, height) = frame.dimensions();
    try_resize(out, frame.as_raw().len(), "blurred frame")?;
    if work == (width, height) {
        frame_to_f32(frame, out);
        return blur.apply(out, width as usize, height as usize, 3, radius, BOX_PASSES);
    }

    let small = imageops::resize(frame, work.0, work.1, FilterType::Triangle);
    let mut data = try_alloc::<f32>(small.as_raw().len(), "reduced frame")?;
    frame_to_f32(&small, &mut data);
    blur.apply(
        &mut data,
        work.0 as usize,
        work.1 as usize,
        3,
        radius,
        BOX_PASSES,
    )?;
    let small = f32_to_frame(&data, work.0, work.1)?;
    let large = imageops::resize(&small, width, height, FilterType::Triangle);
    frame_to_f32(&large, out);
    Ok(())
}

fn required(mask: Option<Grid>) -> Result<Grid, Error> {
    mask.ok_or_else(|| Error::InvalidDescriptor("layer has no mask".into()))
}

fn fill_color(fill: [u8; 3]) -> [f32; 3] {
    [fill[0] as f32, fill[1] as f32, fill[2] as f32]
}
