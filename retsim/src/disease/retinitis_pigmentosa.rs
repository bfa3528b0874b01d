use cgmath::Vector2;

use super::*;

const S1: ParamSpec = ParamSpec::new("retinitis_pigmentosa_s1", 0.1, 0.0, 1.0, "severity at which the field starts to constrict");
const S2: ParamSpec = ParamSpec::new("retinitis_pigmentosa_s2", 0.5, 0.0, 1.0, "severity at which pigment deposits are widespread");
const RIM_FRACTION: ParamSpec = ParamSpec::new(
    "retinitis_pigmentosa_rim_fraction",
    0.1,
    0.02,
    0.9,
    "radius of the remaining visible disk at full severity (reference lengths)",
);
const FADE: ParamSpec = ParamSpec::new("retinitis_pigmentosa_fade", 0.08, 0.01, 0.5, "width of the soft rim");
const IRREGULARITY: ParamSpec = ParamSpec::new("retinitis_pigmentosa_irregularity", 0.06, 0.0, 0.2, "noise displacement of the rim");
const NIGHT: ParamSpec = ParamSpec::new("retinitis_pigmentosa_night", 0.35, 0.0, 0.9, "dimming from night blindness at full severity");
const SPICULES: ParamSpec = ParamSpec::new("retinitis_pigmentosa_spicules", 50.0, 0.0, 400.0, "number of pigment deposits");
const SEED: ParamSpec = ParamSpec::new("retinitis_pigmentosa_seed", 5.0, 0.0, 4294967295.0, "placement and noise seed");

pub const PARAMS: &[ParamSpec] = &[S1, S2, RIM_FRACTION, FADE, IRREGULARITY, NIGHT, SPICULES, SEED];

/// Night-blind dimming, mid-peripheral pigment deposits and a tunnel that closes to a
/// small central island.
pub fn descriptor(values: &ValueMap) -> Result<EffectDescriptor, Error> {
    let bands = bands(values, &[S1, S2]);
    let (s1, s2) = (edge(&bands, 1), edge(&bands, 2));
    let lost = 1.0 - RIM_FRACTION.resolve_f32(values);
    let seed = SEED.resolve_u64(values);
    let night = NIGHT.resolve_f32(values);

    // contrast leads so the lost field is not lifted toward the mean
    Ok(EffectDescriptor::new("retinitis_pigmentosa", bands)
        .with_layer(Layer::Contrast(ContrastLayer {
            onset: 0.0,
            reduction: ramp(&[(0.0, 0.0), (1.0, 0.2)])?,
            tint: [1.0, 1.0, 1.0],
            tint_strength: Ramp::constant(0.0),
            dimming: ramp(&[(0.0, 0.0), (s1, 0.4 * night), (1.0, night)])?,
        }))
        .with_layer(Layer::Lesions(LesionLayer {
            onset: s1,
            layout: SpotLayout {
                seed,
                count: SPICULES.resolve_usize(values),
                center: Vector2::new(0.5, 0.5),
                region: (0.35, 0.75),
                radius: (0.006, 0.018),
                aspect: (0.3, 2.5),
                thresholds: (s1, s2),
                opacity: (0.6, 1.0),
            },
            growth_span: 0.2,
            fill: [25, 18, 12],
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: s1,
            rim: RimSpec::peripheral(ramp(&[(s1, 0.0), (1.0, lost)])?)
                .with_irregularity(ramp(&[(s1, 0.0), (1.0, IRREGULARITY.resolve_f32(values).min(lost))])?)
                .with_fade(Ramp::constant(FADE.resolve_f32(values)))
                .with_noise(NoiseSpec::with_seed(seed)),
            convention: Convention::Occlusion,
            fill: [0, 0, 0],
            strength: Ramp::constant(1.0),
        })))
}
