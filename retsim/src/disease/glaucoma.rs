use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("glaucoma_s1", 0.2, 0.0, 1.0, "severity at which peripheral loss begins");
const S2: ParamSpec = ParamSpec::new("glaucoma_s2", 0.6, 0.0, 1.0, "severity of moderate loss");
const S3: ParamSpec = ParamSpec::new("glaucoma_s3", 0.9, 0.0, 1.0, "severity at which the tunnel is fully formed");
const RIM_FRACTION: ParamSpec = ParamSpec::new(
    "glaucoma_rim_fraction",
    0.2,
    0.05,
    0.9,
    "radius of the remaining visible disk at full severity (reference lengths)",
);
const FADE: ParamSpec = ParamSpec::new("glaucoma_fade", 0.12, 0.01, 0.5, "width of the soft rim");
const IRREGULARITY: ParamSpec = ParamSpec::new("glaucoma_irregularity", 0.05, 0.0, 0.2, "noise displacement of the rim");
const BLUR: ParamSpec = ParamSpec::new("glaucoma_blur", 0.4, 0.0, 1.0, "peak weight of the blur ahead of the rim");
const CENTER_X: ParamSpec = ParamSpec::new("glaucoma_center_x", 0.5, 0.0, 1.0, "horizontal fixation point");
const CENTER_Y: ParamSpec = ParamSpec::new("glaucoma_center_y", 0.5, 0.0, 1.0, "vertical fixation point");
const SEED: ParamSpec = ParamSpec::new("glaucoma_seed", 1.0, 0.0, 4294967295.0, "noise seed of the rim");

pub const PARAMS: &[ParamSpec] = &[
    S1,
    S2,
    S3,
    RIM_FRACTION,
    FADE,
    IRREGULARITY,
    BLUR,
    CENTER_X,
    CENTER_Y,
    SEED,
];

/// Peripheral blur followed by a tunnel closing in on the fixation point.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2, S3]);
    let (s1, s2, s3) = (edge(&bands, 1), edge(&bands, 2), edge(&bands, 3));
    let kept = RIM_FRACTION.resolve_f32(values);
    let lost = 1.0 - kept;
    let fade = FADE.resolve_f32(values);
    let irregularity = IRREGULARITY.resolve_f32(values);
    let center = Vector2::new(CENTER_X.resolve_f32(values), CENTER_Y.resolve_f32(values));
    let noise = NoiseSpec::with_seed(SEED.resolve_u64(values));

    let loss = ramp(&[(s1, 0.0), (s2, 0.4 * lost), (s3, lost)])?;
    let halo = ramp(&[(s1, 0.2), (s2, 0.4 * lost + 0.2), (s3, lost + 0.2)])?;
    let jitter = ramp(&[(s1, 0.0), (s2, irregularity.min(0.4 * lost))])?;

    Ok(EffectDescriptor::new("glaucoma", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.005), (s3, 0.02)])?,
            strength: ramp(&[(0.0, 0.0), (s3, BLUR.resolve_f32(values))])?,
            region: Some(
                RimSpec::peripheral(halo)
                    .with_center(center)
                    .with_irregularity(jitter.clone())
                    .with_fade(Ramp::constant(0.2))
                    .with_noise(noise),
            ),
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s1,
            rim: RimSpec::peripheral(loss)
                .with_center(center)
                .with_irregularity(jitter)
                .with_fade(Ramp::constant(fade))
                .with_noise(noise),
            convention: Convention::Occlusion,
            fill: [0, 0, 0],
            strength: ramp(&[(s1, 0.7), (s2, 1.0)])?,
        })))
}
