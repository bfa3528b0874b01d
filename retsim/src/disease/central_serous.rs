use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("central_serous_s1", 0.3, 0.0, 1.0, "severity at which the central veil appears");
const DISTORTION: ParamSpec = ParamSpec::new("central_serous_distortion", 0.008, 0.0, 0.05, "peak displacement (reference lengths)");
const WAVELENGTH: ParamSpec = ParamSpec::new("central_serous_wavelength", 0.2, 0.02, 1.0, "period of the distortion (reference lengths)");
const RADIUS: ParamSpec = ParamSpec::new("central_serous_radius", 0.25, 0.05, 0.8, "radius of the serous detachment");
const VEIL: ParamSpec = ParamSpec::new("central_serous_veil", 0.5, 0.0, 1.0, "opacity of the central veil at full severity");

pub const PARAMS: &[ParamSpec] = &[S1, DISTORTION, WAVELENGTH, RADIUS, VEIL];

/// A central blister: local warp and blur, then a brownish translucent veil.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1]);
    let s1 = edge(&bands, 1);
    let radius = RADIUS.resolve_f32(values);
    let center = Vector2::new(0.5, 0.5);

    Ok(EffectDescriptor::new("central_serous", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.003), (1.0, 0.01)])?,
            strength: ramp(&[(0.0, 0.0), (1.0, 0.6)])?,
            region: Some(RimSpec::central(ramp(&[(0.0, 0.3 * radius), (1.0, radius)])?).with_fade(Ramp::constant(0.1))),
        }))
        .with_layer(Layer::Distortion(DistortionLayer {
            onset: 0.0,
            amplitude: ramp(&[(0.0, 0.0), (1.0, DISTORTION.resolve_f32(values))])?,
            wavelength: WAVELENGTH.resolve_f32(values),
            gate: Some(DistortionGate { center, radius }),
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s1,
            rim: RimSpec::central(ramp(&[(s1, 0.3 * radius), (1.0, 0.8 * radius)])?)
                .with_irregularity(ramp(&[(s1, 0.0), (1.0, 0.03)])?)
                .with_fade(Ramp::constant(0.1)),
            convention: Convention::Occlusion,
            fill: [110, 90, 60],
            strength: ramp(&[(s1, 0.0), (1.0, VEIL.resolve_f32(values))])?,
        })))
}
