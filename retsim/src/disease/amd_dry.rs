use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("amd_dry_s1", 0.15, 0.0, 1.0, "severity at which drusen appear");
const S2: ParamSpec = ParamSpec::new("amd_dry_s2", 0.5, 0.0, 1.0, "severity at which the central scotoma opens");
const S3: ParamSpec = ParamSpec::new("amd_dry_s3", 0.85, 0.0, 1.0, "severity of geographic atrophy");
const SCOTOMA: ParamSpec = ParamSpec::new("amd_dry_scotoma", 0.25, 0.02, 0.8, "scotoma radius at full severity");
const FADE: ParamSpec = ParamSpec::new("amd_dry_fade", 0.08, 0.01, 0.5, "width of the scotoma rim");
const IRREGULARITY: ParamSpec = ParamSpec::new("amd_dry_irregularity", 0.04, 0.0, 0.2, "noise displacement of the rim");
const BLUR: ParamSpec = ParamSpec::new("amd_dry_blur", 0.6, 0.0, 1.0, "peak weight of the central blur");
const DRUSEN: ParamSpec = ParamSpec::new("amd_dry_drusen", 40.0, 0.0, 400.0, "number of drusen");
const SEED: ParamSpec = ParamSpec::new("amd_dry_seed", 7.0, 0.0, 4294967295.0, "placement and noise seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, S3, SCOTOMA, FADE, IRREGULARITY, BLUR, DRUSEN, SEED];

/// Central blur, drusen flecks, then a slowly widening central scotoma.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2, S3]);
    let (s1, s2, s3) = (edge(&bands, 1), edge(&bands, 2), edge(&bands, 3));
    let scotoma = SCOTOMA.resolve_f32(values);
    let seed = SEED.resolve_u64(values);
    let noise = NoiseSpec::with_seed(seed);
    let irregularity = IRREGULARITY.resolve_f32(values).min(scotoma);

    Ok(EffectDescriptor::new("amd_dry", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.004), (s3, 0.015)])?,
            strength: ramp(&[(0.0, 0.0), (s2, BLUR.resolve_f32(values))])?,
            region: Some(
                RimSpec::central(ramp(&[(0.0, 0.05), (s3, scotoma + 0.15)])?)
                    .with_fade(Ramp::constant(0.15))
                    .with_noise(noise),
            ),
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: s1,
            layout: SpotLayout {
                seed,
                count: DRUSEN.resolve_usize(values),
                center: Vector2::new(0.5, 0.5),
                region: (0.0, 0.3),
                radius: (0.005, 0.02),
                aspect: (0.8, 1.2),
                thresholds: (s1, s3),
                opacity: (0.35, 0.7),
            },
            growth_span: 0.15,
            fill: [205, 190, 120],
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s2,
            rim: RimSpec::central(ramp(&[(s2, 0.0), (s3, scotoma)])?)
                .with_irregularity(ramp(&[(s2, 0.0), (s3, irregularity)])?)
                .with_fade(Ramp::constant(FADE.resolve_f32(values)))
                .with_noise(noise),
            convention: Convention::Occlusion,
            fill: [20, 20, 20],
            strength: ramp(&[(s2, 0.8), (s3, 1.0)])?,
        })))
}
