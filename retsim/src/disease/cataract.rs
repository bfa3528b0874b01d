use super::*;

const S1: ParamSpec = ParamSpec::new("cataract_s1", 0.3, 0.0, 1.0, "severity of an immature cataract");
const S2: ParamSpec = ParamSpec::new("cataract_s2", 0.7, 0.0, 1.0, "severity of a mature cataract");
const BLUR: ParamSpec = ParamSpec::new("cataract_blur", 0.025, 0.0, 0.1, "blur radius at full severity (reference lengths)");
const CONTRAST: ParamSpec = ParamSpec::new("cataract_contrast", 0.6, 0.0, 1.0, "contrast reduction at full severity");
const TINT: ParamSpec = ParamSpec::new("cataract_tint", 0.5, 0.0, 1.0, "strength of the yellow-brown tint at full severity");
const DIMMING: ParamSpec = ParamSpec::new("cataract_dimming", 0.3, 0.0, 0.9, "brightness loss at full severity");

pub const PARAMS: &[ParamSpec] = &[S1, S2, BLUR, CONTRAST, TINT, DIMMING];

const BROWNISH: [f32; 3] = [1.0, 0.85, 0.55];

/// Global blur, washed-out contrast and yellowing of a clouding lens.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2]);
    let (s1, s2) = (edge(&bands, 1), edge(&bands, 2));
    let blur = BLUR.resolve_f32(values);
    let contrast = CONTRAST.resolve_f32(values);
    let tint = TINT.resolve_f32(values);
    let dimming = DIMMING.resolve_f32(values);

    Ok(EffectDescriptor::new("cataract", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.0), (s1, 0.3 * blur), (1.0, blur)])?,
            strength: ramp(&[(0.0, 0.0), (s1, 1.0)])?,
            region: None,
        }))
        .with_layer(Layer::Contrast(ContrastLayer {
            onset: 0.0,
            reduction: ramp(&[(0.0, 0.0), (s1, 0.25 * contrast), (s2, 0.7 * contrast), (1.0, contrast)])?,
            tint: BROWNISH,
            tint_strength: ramp(&[(0.0, 0.0), (s2, 0.6 * tint), (1.0, tint)])?,
            dimming: ramp(&[(0.0, 0.0), (s2, 0.5 * dimming), (1.0, dimming)])?,
        })))
}
