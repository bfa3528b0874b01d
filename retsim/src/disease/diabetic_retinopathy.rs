use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("diabetic_retinopathy_s1", 0.15, 0.0, 1.0, "severity at which microaneurysms appear");
const S2: ParamSpec = ParamSpec::new("diabetic_retinopathy_s2", 0.5, 0.0, 1.0, "severity of proliferative retinopathy");
const LESIONS: ParamSpec = ParamSpec::new("diabetic_retinopathy_lesions", 60.0, 0.0, 400.0, "number of hemorrhages");
const BLUR: ParamSpec = ParamSpec::new("diabetic_retinopathy_blur", 0.5, 0.0, 1.0, "peak weight of the macular-edema blur");
const CONTRAST: ParamSpec = ParamSpec::new("diabetic_retinopathy_contrast", 0.3, 0.0, 1.0, "contrast reduction at full severity");
const SEED: ParamSpec = ParamSpec::new("diabetic_retinopathy_seed", 23.0, 0.0, 4294967295.0, "placement seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, LESIONS, BLUR, CONTRAST, SEED];

/// Scattered hemorrhages over the whole field with mild blur and washed-out contrast.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2]);
    let (s1, s2) = (edge(&bands, 1), edge(&bands, 2));

    Ok(EffectDescriptor::new("diabetic_retinopathy", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.004), (1.0, 0.012)])?,
            strength: ramp(&[(0.0, 0.0), (s2, BLUR.resolve_f32(values))])?,
            region: None,
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: s1,
            layout: SpotLayout {
                seed: SEED.resolve_u64(values),
                count: LESIONS.resolve_usize(values),
                center: Vector2::new(0.5, 0.5),
                region: (0.05, 0.7),
                radius: (0.008, 0.03),
                aspect: (0.6, 1.4),
                thresholds: (s1, 1.0),
                opacity: (0.5, 0.95),
            },
            growth_span: 0.15,
            fill: [75, 15, 15],
        }))
        .with_layer(Layer::Contrast(ContrastLayer {
            onset: s2,
            reduction: ramp(&[(s2, 0.0), (1.0, CONTRAST.resolve_f32(values))])?,
            tint: [1.0, 1.0, 1.0],
            tint_strength: Ramp::constant(0.0),
            dimming: ramp(&[(s2, 0.0), (1.0, 0.15)])?,
        })))
}
