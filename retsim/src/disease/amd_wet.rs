use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("amd_wet_s1", 0.1, 0.0, 1.0, "severity at which central distortion becomes noticeable");
const S2: ParamSpec = ParamSpec::new("amd_wet_s2", 0.35, 0.0, 1.0, "severity at which hemorrhages and the scotoma appear");
const S3: ParamSpec = ParamSpec::new("amd_wet_s3", 0.75, 0.0, 1.0, "severity of disciform scarring");
const DISTORTION: ParamSpec = ParamSpec::new("amd_wet_distortion", 0.012, 0.0, 0.05, "peak displacement (reference lengths)");
const WAVELENGTH: ParamSpec = ParamSpec::new("amd_wet_wavelength", 0.12, 0.02, 1.0, "period of the distortion (reference lengths)");
const SCOTOMA: ParamSpec = ParamSpec::new("amd_wet_scotoma", 0.35, 0.02, 0.8, "scotoma radius at full severity");
const FADE: ParamSpec = ParamSpec::new("amd_wet_fade", 0.06, 0.01, 0.5, "width of the scotoma rim");
const HEMORRHAGES: ParamSpec = ParamSpec::new("amd_wet_hemorrhages", 8.0, 0.0, 100.0, "number of hemorrhages");
const SEED: ParamSpec = ParamSpec::new("amd_wet_seed", 11.0, 0.0, 4294967295.0, "placement and noise seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, S3, DISTORTION, WAVELENGTH, SCOTOMA, FADE, HEMORRHAGES, SEED];

/// Central metamorphopsia, dark hemorrhages and a fast-growing dense scotoma.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2, S3]);
    let (s1, s2, s3) = (edge(&bands, 1), edge(&bands, 2), edge(&bands, 3));
    let scotoma = SCOTOMA.resolve_f32(values);
    let seed = SEED.resolve_u64(values);
    let noise = NoiseSpec::with_seed(seed);
    let center = Vector2::new(0.5, 0.5);

    Ok(EffectDescriptor::new("amd_wet", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.003), (s3, 0.012)])?,
            strength: ramp(&[(0.0, 0.0), (s2, 0.5)])?,
            region: Some(
                RimSpec::central(ramp(&[(0.0, 0.1), (s3, scotoma + 0.15)])?)
                    .with_fade(Ramp::constant(0.15))
                    .with_noise(noise),
            ),
        }))
        .with_layer(Layer::Distortion(DistortionLayer {
            onset: 0.0,
            amplitude: ramp(&[(0.0, 0.0), (s1, 0.3 * DISTORTION.resolve_f32(values)), (s2, DISTORTION.resolve_f32(values))])?,
            wavelength: WAVELENGTH.resolve_f32(values),
            gate: Some(DistortionGate {
                center,
                radius: scotoma + 0.2,
            }),
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: s2,
            layout: SpotLayout {
                seed,
                count: HEMORRHAGES.resolve_usize(values),
                center,
                region: (0.0, 0.25),
                radius: (0.02, 0.05),
                aspect: (0.6, 1.4),
                thresholds: (s2, s3),
                opacity: (0.6, 0.9),
            },
            growth_span: 0.1,
            fill: [70, 12, 10],
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s2,
            rim: RimSpec::central(ramp(&[(s2, 0.0), (s3, scotoma)])?)
                .with_center(center)
                .with_irregularity(ramp(&[(s2, 0.0), (s3, (0.06f32).min(scotoma))])?)
                .with_fade(Ramp::constant(FADE.resolve_f32(values)))
                .with_noise(noise),
            convention: Convention::Occlusion,
            fill: [10, 8, 8],
            strength: ramp(&[(s2, 0.9), (s3, 1.0)])?,
        })))
}
