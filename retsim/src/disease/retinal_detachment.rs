use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("retinal_detachment_s1", 0.15, 0.0, 1.0, "severity at which the curtain descends");
const S2: ParamSpec = ParamSpec::new("retinal_detachment_s2", 0.6, 0.0, 1.0, "severity at which the macula is involved");
const EXTENT: ParamSpec = ParamSpec::new("retinal_detachment_extent", 1.0, 0.1, 2.0, "depth of the curtain at full severity (reference lengths)");
const ORIGIN_X: ParamSpec = ParamSpec::new("retinal_detachment_origin_x", 0.5, -2.0, 3.0, "horizontal origin of the curtain");
const ORIGIN_Y: ParamSpec = ParamSpec::new("retinal_detachment_origin_y", -0.6, -2.0, 3.0, "vertical origin of the curtain, negative is above the frame");
const FADE: ParamSpec = ParamSpec::new("retinal_detachment_fade", 0.15, 0.01, 0.5, "width of the curtain edge");
const IRREGULARITY: ParamSpec = ParamSpec::new("retinal_detachment_irregularity", 0.08, 0.0, 0.3, "noise displacement of the edge");
const FLOATERS: ParamSpec = ParamSpec::new("retinal_detachment_floaters", 12.0, 0.0, 100.0, "number of floaters");
const SEED: ParamSpec = ParamSpec::new("retinal_detachment_seed", 3.0, 0.0, 4294967295.0, "placement and noise seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, EXTENT, ORIGIN_X, ORIGIN_Y, FADE, IRREGULARITY, FLOATERS, SEED];

/// Floaters, a blurred band ahead of the curtain, then a dark curtain advancing from one
/// side of the field.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2]);
    let (s1, s2) = (edge(&bands, 1), edge(&bands, 2));
    let extent = EXTENT.resolve_f32(values);
    let origin = Vector2::new(ORIGIN_X.resolve_f32(values), ORIGIN_Y.resolve_f32(values));
    let seed = SEED.resolve_u64(values);
    let noise = NoiseSpec::with_seed(seed);
    let depth = ramp(&[(s1, 0.0), (s2, 0.5 * extent), (1.0, extent)])?;
    let irregularity = ramp(&[(s1, 0.0), (s2, IRREGULARITY.resolve_f32(values).min(0.5 * extent))])?;

    Ok(EffectDescriptor::new("retinal_detachment", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: s1,
            radius: ramp(&[(s1, 0.006), (1.0, 0.015)])?,
            strength: ramp(&[(s1, 0.4), (1.0, 0.8)])?,
            region: Some(
                RimSpec::central(ramp(&[(s1, 0.15), (s2, 0.5 * extent + 0.15), (1.0, extent + 0.15)])?)
                    .with_center(origin)
                    .with_irregularity(irregularity.clone())
                    .with_fade(Ramp::constant(0.2))
                    .with_noise(noise),
            ),
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: 0.0,
            layout: SpotLayout {
                seed,
                count: FLOATERS.resolve_usize(values),
                center: Vector2::new(0.5, 0.5),
                region: (0.0, 0.5),
                radius: (0.004, 0.012),
                aspect: (0.5, 3.0),
                thresholds: (0.0, s1),
                opacity: (0.25, 0.5),
            },
            growth_span: 0.1,
            fill: [30, 30, 30],
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s1,
            rim: RimSpec::central(depth)
                .with_center(origin)
                .with_irregularity(irregularity)
                .with_fade(Ramp::constant(FADE.resolve_f32(values)))
                .with_noise(noise),
            convention: Convention::Occlusion,
            fill: [25, 25, 30],
            strength: ramp(&[(s1, 0.85), (1.0, 1.0)])?,
        })))
}
