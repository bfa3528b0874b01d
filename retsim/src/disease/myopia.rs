use super::*;

const S1: ParamSpec = ParamSpec::new("myopia_s1", 0.2, 0.0, 1.0, "severity at which the blur is fully blended in");
const BLUR: ParamSpec = ParamSpec::new("myopia_blur", 0.04, 0.0, 0.1, "blur radius at full severity (reference lengths)");

pub const PARAMS: &[ParamSpec] = &[S1, BLUR];

/// Uniform defocus.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1]);
    let s1 = edge(&bands, 1);
    Ok(EffectDescriptor::new("myopia", bands).with_layer(Layer::Blur(BlurLayer {
        onset: 0.0,
        radius: ramp(&[(0.0, 0.0), (1.0, BLUR.resolve_f32(values))])?,
        strength: ramp(&[(0.0, 0.0), (s1, 1.0)])?,
        region: None,
    })))
}
