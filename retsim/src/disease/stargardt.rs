use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("stargardt_s1", 0.1, 0.0, 1.0, "severity at which flecks appear");
const S2: ParamSpec = ParamSpec::new("stargardt_s2", 0.4, 0.0, 1.0, "severity at which the central scotoma opens");
const SCOTOMA: ParamSpec = ParamSpec::new("stargardt_scotoma", 0.2, 0.02, 0.8, "scotoma radius at full severity");
const FADE: ParamSpec = ParamSpec::new("stargardt_fade", 0.1, 0.01, 0.5, "width of the scotoma rim");
const FLECKS: ParamSpec = ParamSpec::new("stargardt_flecks", 30.0, 0.0, 400.0, "number of yellow flecks");
const SEED: ParamSpec = ParamSpec::new("stargardt_seed", 13.0, 0.0, 4294967295.0, "placement and noise seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, SCOTOMA, FADE, FLECKS, SEED];

/// Juvenile macular dystrophy: yellow flecks around the macula and a central gray scotoma.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2]);
    let (s1, s2) = (edge(&bands, 1), edge(&bands, 2));
    let scotoma = SCOTOMA.resolve_f32(values);
    let seed = SEED.resolve_u64(values);
    let noise = NoiseSpec::with_seed(seed);

    Ok(EffectDescriptor::new("stargardt", bands)
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: ramp(&[(0.0, 0.004), (1.0, 0.012)])?,
            strength: ramp(&[(0.0, 0.0), (s2, 0.7)])?,
            region: Some(
                RimSpec::central(ramp(&[(0.0, 0.05), (1.0, scotoma + 0.12)])?)
                    .with_fade(Ramp::constant(0.12))
                    .with_noise(noise),
            ),
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: s1,
            layout: SpotLayout {
                seed,
                count: FLECKS.resolve_usize(values),
                center: Vector2::new(0.5, 0.5),
                region: (0.05, 0.35),
                radius: (0.006, 0.016),
                aspect: (0.4, 1.6),
                thresholds: (s1, s2),
                opacity: (0.3, 0.6),
            },
            growth_span: 0.15,
            fill: [215, 195, 90],
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s2,
            rim: RimSpec::central(ramp(&[(s2, 0.0), (1.0, scotoma)])?)
                .with_irregularity(ramp(&[(s2, 0.0), (1.0, (0.03f32).min(scotoma))])?)
                .with_fade(Ramp::constant(FADE.resolve_f32(values)))
                .with_noise(noise),
            convention: Convention::Occlusion,
            fill: [60, 60, 60],
            strength: ramp(&[(s2, 0.7), (1.0, 0.95)])?,
        })))
}
