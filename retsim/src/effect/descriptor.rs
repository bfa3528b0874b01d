use super::*;

bitflags! {
    /// Layers enabled at a given severity.
    pub struct Stages : u32 {
        const BLUR = 1;
        const DISTORTION = 2;
        const LESIONS = 4;
        const VISION_LOSS = 8;
        const CONTRAST = 16;
    }
}

/// Blends a blurred copy of the frame in, either everywhere or inside a rim region.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurLayer {
    pub onset: f32,
    /// Box radius in reference lengths.
    pub radius: Ramp,
    /// Weight of the blurred copy.
    pub strength: Ramp,
    /// Restricts the blur to the lost side of a rim; `None` blurs uniformly.
    pub region: Option<RimSpec>,
}

/// Warps the frame with a periodic displacement field.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionLayer {
    pub onset: f32,
    /// Peak displacement in reference lengths.
    pub amplitude: Ramp,
    /// Spatial period in reference lengths.
    pub wavelength: f32,
    pub gate: Option<DistortionGate>,
}

/// Dark spots that appear at their threshold and grow over `growth_span`.
#[derive(Debug, Clone, PartialEq)]
pub struct LesionLayer {
    pub onset: f32,
    pub layout: SpotLayout,
    pub growth_span: f32,
    pub fill: [u8; 3],
}

/// Loss of vision behind a soft rim.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionLossLayer {
    pub onset: f32,
    pub rim: RimSpec,
    pub convention: Convention,
    pub fill: [u8; 3],
    /// How opaque the lost region gets.
    pub strength: Ramp,
}

/// Global contrast reduction, tint and dimming.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastLayer {
    pub onset: f32,
    pub reduction: Ramp,
    /// Per-channel multiplier the frame is tinted toward.
    pub tint: [f32; 3],
    pub tint_strength: Ramp,
    pub dimming: Ramp,
}

/// One entry of an effect's composition order.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Blur(BlurLayer),
    Distortion(DistortionLayer),
    Lesions(LesionLayer),
    VisionLoss(VisionLossLayer),
    Contrast(ContrastLayer),
}

impl Layer {
    /// Lowest severity (inclusive) at which the layer is applied.
    pub fn onset(&self) -> f32 {
        match self {
            Layer::Blur(layer) => layer.onset,
            Layer::Distortion(layer) => layer.onset,
            Layer::Lesions(layer) => layer.onset,
            Layer::VisionLoss(layer) => layer.onset,
            Layer::Contrast(layer) => layer.onset,
        }
    }

    pub fn stage(&self) -> Stages {
        match self {
            Layer::Blur(_) => Stages::BLUR,
            Layer::Distortion(_) => Stages::DISTORTION,
            Layer::Lesions(_) => Stages::LESIONS,
            Layer::VisionLoss(_) => Stages::VISION_LOSS,
            Layer::Contrast(_) => Stages::CONTRAST,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let onset = self.onset();
        if !(onset >= 0.0 && onset <= 1.0) {
            return Err(Error::InvalidDescriptor(format!(
                "{:?} onset {} outside [0,1]",
                self.stage(),
                onset
            )));
        }
        match self {
            Layer::Blur(layer) => {
                if let Some(region) = &layer.region {
                    region.validate()?;
                }
                Ok(())
            }
            Layer::Distortion(layer) => {
                if !(layer.wavelength > 0.0) {
                    return Err(Error::InvalidDescriptor(format!(
                        "distortion wavelength must be positive, got {}",
                        layer.wavelength
                    )));
                }
                Ok(())
            }
            Layer::Lesions(layer) => {
                if !(layer.growth_span >= 0.0) {
                    return Err(Error::InvalidDescriptor(format!(
                        "lesion growth span must not be negative, got {}",
                        layer.growth_span
                    )));
                }
                Ok(())
            }
            Layer::VisionLoss(layer) => layer.rim.validate(),
            Layer::Contrast(_) => Ok(()),
        }
    }
}

/// Declarative description of one disease: named thresholds and layers in composition order.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDescriptor {
    pub name: String,
    pub bands: Bands,
    pub layers: Vec<Layer>,
}

impl EffectDescriptor {
    pub fn new<S: Into<String>>(name: S, bands: Bands) -> Self {
        EffectDescriptor {
            name: name.into(),
            bands,
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    ///
    /// Checks every layer and the composition order.
    ///
    /// Blur layers blend a blurred copy of the raw frame and would erase whatever earlier
    /// non-blur layers composited, so they must lead the list.
    ///
    pub fn validate(&self) -> Result<(), Error> {
        let mut composited: Option<Stages> = None;
        for layer in self.layers.iter() {
            layer.validate()?;
            match (layer, composited) {
                (Layer::Blur(_), Some(stage)) => {
                    return Err(Error::InvalidDescriptor(format!(
                        "{}: blur layer after {:?}",
                        self.name, stage
                    )));
                }
                (Layer::Blur(_), None) => {}
                (_, None) => composited = Some(layer.stage()),
                (_, Some(_)) => {}
            }
        }
        Ok(())
    }

    /// Stages whose onset is at or below `severity`.
    pub fn stages(&self, severity: f32) -> Stages {
        let severity = clamp_severity(severity);
        if severity <= IDLE_SEVERITY {
            return Stages::empty();
        }
        self.layers
            .iter()
            .filter(|layer| severity >= layer.onset())
            .fold(Stages::empty(), |stages, layer| stages | layer.stage())
    }
}
