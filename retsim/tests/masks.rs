use cgmath::Vector2;
use proptest::prelude::*;

use retsim::*;

fn rim_mask(spec: &RimSpec, severity: f32, convention: Convention, width: u32, height: u32) -> Grid {
    let distance = DistanceField::generate(width, height, spec.center).unwrap();
    let noise = NoiseField::generate(width, height, spec.noise).unwrap();
    let mut mask = Grid::new(width, height).unwrap();
    build_rim(
        spec,
        severity,
        &distance,
        &noise,
        convention,
        &mut BoxBlur::new(),
        &mut mask,
    )
    .unwrap();
    mask
}

fn spot(threshold: f32, max_opacity: f32) -> Spot {
    Spot {
        center: Vector2::new(0.5, 0.5),
        radius_x: 0.1,
        radius_y: 0.1,
        threshold,
        max_opacity,
    }
}

#[test]
fn test_band_edges_are_lower_inclusive() {
    let bands = Bands::new(vec![0.2, 0.6]).unwrap();
    assert_eq!(bands.band(0.0), 0);
    assert_eq!(bands.band(0.1999), 0);
    assert_eq!(bands.band(0.2), 1);
    assert_eq!(bands.band(0.5999), 1);
    assert_eq!(bands.band(0.6), 2);
    assert_eq!(bands.band(1.0), 2);
    assert_eq!(bands.threshold(1), Some(0.2));
    assert_eq!(bands.threshold(3), None);
    assert!(Bands::new(vec![0.6, 0.2]).is_err());
}

#[test]
fn test_rim_without_depth_loses_nothing() {
    for anchor_spec in [
        RimSpec::central(Ramp::constant(0.0)),
        RimSpec::peripheral(Ramp::constant(0.0)),
    ]
    .iter()
    {
        let spec = anchor_spec.clone().with_irregularity(Ramp::constant(0.1));
        let occlusion = rim_mask(&spec, 0.7, Convention::Occlusion, 40, 30);
        assert!(occlusion.as_slice().iter().all(|v| *v == 0.0));
        let visible = rim_mask(&spec, 0.7, Convention::Visible, 40, 30);
        assert!(visible.as_slice().iter().all(|v| *v == 1.0));
    }
}

#[test]
fn test_peripheral_rim_keeps_center() {
    let spec = RimSpec::peripheral(Ramp::constant(0.8)).with_fade(Ramp::constant(0.1));
    let mask = rim_mask(&spec, 1.0, Convention::Occlusion, 101, 101);
    assert!(mask.get(50, 50) < 0.01);
    assert!(mask.get(0, 0) > 0.99);
    assert!(mask.get(100, 50) > 0.99);
}

#[test]
fn test_central_rim_grows_from_center() {
    let spec = RimSpec::central(Ramp::linear((0.0, 0.0), (1.0, 0.5))).with_fade(Ramp::constant(0.05));
    let early = rim_mask(&spec, 0.2, Convention::Occlusion, 101, 101);
    let late = rim_mask(&spec, 0.8, Convention::Occlusion, 101, 101);
    assert!(early.get(50, 50) > 0.99);
    assert!(early.get(50, 35) < 0.01);
    assert!(late.get(50, 35) > 0.99);
    assert!(late.get(0, 0) < 0.01);
}

#[test]
fn test_decreasing_rim_is_rejected() {
    let spec = RimSpec::central(Ramp::linear((0.0, 0.5), (1.0, 0.1)));
    assert!(spec.validate().is_err());
    let descriptor = EffectDescriptor::new("shrinking", Bands::none()).with_layer(Layer::VisionLoss(VisionLossLayer {
        onset: 0.0,
        rim: spec,
        convention: Convention::Occlusion,
        fill: [0, 0, 0],
        strength: Ramp::constant(1.0),
    }));
    assert!(Effect::new(descriptor).is_err());
}

#[test]
fn test_spot_growth_window() {
    let spots = [spot(0.5, 0.8)];
    let mut mask = Grid::new(41, 41).unwrap();

    build_lesions(&spots, 0.15, 0.30, &mut mask);
    assert!(mask.as_slice().iter().all(|v| *v == 0.0));

    build_lesions(&spots, 0.15, 0.50, &mut mask);
    assert!(mask.as_slice().iter().all(|v| *v == 0.0));

    let half = spots[0].extent(0.575, 0.15);
    assert!(half.0 > 0.0 && half.0 < 0.1);

    assert_eq!(spots[0].extent(0.65, 0.15), (0.1, 0.1));
    assert_eq!(spots[0].opacity(0.65, 0.15), 0.8);
    build_lesions(&spots, 0.15, 0.65, &mut mask);
    assert!((mask.get(20, 20) - 0.8).abs() < 1e-6);
    assert_eq!(mask.get(0, 0), 0.0);

    // fully grown spots stay fully grown
    assert_eq!(spots[0].extent(0.9, 0.15), (0.1, 0.1));
}

#[test]
fn test_spot_size_never_shrinks() {
    let spot = spot(0.3, 1.0);
    let mut previous = 0.0;
    for i in 0..=100 {
        let (rx, _) = spot.extent(i as f32 / 100.0, 0.2);
        assert!(rx >= previous);
        previous = rx;
    }
}

#[test]
fn test_overlapping_spots_combine_by_maximum() {
    let spots = [spot(0.0, 0.5), spot(0.0, 0.8)];
    let mut mask = Grid::new(41, 41).unwrap();
    build_lesions(&spots, 0.0, 0.5, &mut mask);
    assert!((mask.get(20, 20) - 0.8).abs() < 1e-6);
}

#[test]
fn test_spot_layout_is_deterministic() {
    let layout = SpotLayout {
        count: 25,
        ..SpotLayout::default()
    };
    let a = layout.generate();
    let b = layout.generate();
    assert_eq!(a, b);
    assert_eq!(a.len(), 25);
    for spot in a.iter() {
        assert!(spot.threshold >= 0.1 && spot.threshold <= 0.9);
        let offset = spot.center - Vector2::new(0.5, 0.5);
        assert!((offset.x * offset.x + offset.y * offset.y).sqrt() <= 0.5 + 1e-5);
    }
    let other = SpotLayout {
        seed: 2,
        ..layout
    };
    assert_ne!(other.generate(), a);
}

#[test]
fn test_progressive_loss_is_monotonic() {
    for disease in [
        Disease::Glaucoma,
        Disease::RetinitisPigmentosa,
        Disease::DryMacularDegeneration,
        Disease::RetinalDetachment,
    ]
    .iter()
    {
        let descriptor = disease.descriptor(&ValueMap::new()).unwrap();
        let index = descriptor
            .layers
            .iter()
            .position(|layer| matches!(layer, Layer::VisionLoss(_)))
            .unwrap();
        let mut effect = Effect::new(descriptor).unwrap();
        let mut previous = vec![0.0f32; 64 * 48];
        for step in 0..=40 {
            let severity = step as f32 / 40.0;
            let mask = match effect.layer_mask(index, 64, 48, severity).unwrap() {
                Some(mask) => mask.as_slice().to_vec(),
                None => vec![0.0; 64 * 48],
            };
            for (i, (now, before)) in mask.iter().zip(previous.iter()).enumerate() {
                assert!(
                    *now + 1e-4 >= *before,
                    "{} shrank at pixel {} between severities: {} -> {}",
                    disease,
                    i,
                    before,
                    now
                );
            }
            previous = mask;
        }
    }
}

proptest! {
    #[test]
    fn rim_masks_stay_in_unit_range(
        width in 1u32..40,
        height in 1u32..40,
        severity in -0.5f32..1.5,
        radius in 0.0f32..1.5,
        irregularity in 0.0f32..0.4,
        fade in 0.0f32..0.5,
        peripheral in any::<bool>(),
        visible in any::<bool>(),
        seed in 0u64..1000,
    ) {
        let radius = Ramp::linear((0.0, 0.0), (1.0, radius));
        let spec = (if peripheral { RimSpec::peripheral(radius) } else { RimSpec::central(radius) })
            .with_irregularity(Ramp::constant(irregularity))
            .with_fade(Ramp::constant(fade))
            .with_noise(NoiseSpec::with_seed(seed));
        let convention = if visible { Convention::Visible } else { Convention::Occlusion };
        let mask = rim_mask(&spec, clamp_severity(severity), convention, width, height);
        prop_assert!(mask.as_slice().iter().all(|v| *v >= 0.0 && *v <= 1.0));
    }

    #[test]
    fn lesion_masks_stay_in_unit_range(
        width in 1u32..48,
        height in 1u32..48,
        severity in 0.0f32..=1.0,
        count in 0usize..40,
        seed in 0u64..1000,
        span in 0.0f32..0.5,
    ) {
        let layout = SpotLayout { seed, count, opacity: (0.2, 1.0), ..SpotLayout::default() };
        let mut mask = Grid::new(width, height).unwrap();
        build_lesions(&layout.generate(), span, severity, &mut mask);
        prop_assert!(mask.as_slice().iter().all(|v| *v >= 0.0 && *v <= 1.0));
    }

    #[test]
    fn disease_masks_stay_in_unit_range(
        which in 0usize..10,
        severity in 0.0f32..=1.0,
        scale in 0.1f32..=1.0,
    ) {
        let disease = Disease::ALL[which];
        let mut effect = Effect::new(disease.descriptor(&ValueMap::new()).unwrap())
            .unwrap()
            .with_work_scale(scale);
        for index in 0..effect.descriptor().layers.len() {
            if let Some(mask) = effect.layer_mask(index, 32, 24, severity).unwrap() {
                prop_assert_eq!(mask.dimensions(), (32, 24));
                prop_assert!(mask.as_slice().iter().all(|v| *v >= 0.0 && *v <= 1.0));
            }
        }
    }
}
