use retsim::*;

fn gray(width: u32, height: u32, level: u8) -> Frame {
    Frame::from_pixel(width, height, image::Rgb([level, level, level]))
}

fn smooth(width: u32, height: u32) -> Frame {
    Frame::from_fn(width, height, |x, y| {
        let u = x as f32 / width as f32 * std::f32::consts::PI * 2.0;
        let v = y as f32 / height as f32 * std::f32::consts::PI * 2.0;
        image::Rgb([
            (128.0 + 60.0 * u.sin()) as u8,
            (128.0 + 60.0 * v.cos()) as u8,
            (128.0 + 40.0 * (u + v).sin()) as u8,
        ])
    })
}

fn effect(disease: Disease, values: &ValueMap) -> Effect {
    Effect::new(disease.descriptor(values).unwrap()).unwrap()
}

fn mean_absolute_error(a: &Frame, b: &Frame) -> f64 {
    let sum: f64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(x, y)| (*x as f64 - *y as f64).abs())
        .sum();
    sum / a.as_raw().len() as f64
}

#[test]
fn test_zero_severity_is_identity_for_every_disease() {
    let frame = smooth(48, 36);
    for disease in Disease::ALL.iter() {
        let mut effect = effect(*disease, &ValueMap::new());
        for severity in [0.0, 1e-4, -0.5, f32::NAN].iter() {
            assert_eq!(effect.process(&frame, *severity).unwrap(), frame, "{}", disease);
            assert_eq!(effect.state(), EffectState::Idle);
            assert!(effect.stages(*severity).is_empty());
        }
    }
}

#[test]
fn test_uniform_gray_at_zero_severity() {
    let frame = gray(100, 100, 128);
    let mut effect = effect(Disease::Glaucoma, &ValueMap::new());
    let output = effect.process(&frame, 0.0).unwrap();
    assert_eq!(output, frame);
}

#[test]
fn test_glaucoma_tunnel() {
    let frame = gray(100, 100, 128);
    let mut values = ValueMap::new();
    values.insert("glaucoma_rim_fraction".to_string(), Value::Number(0.2));
    let mut effect = effect(Disease::Glaucoma, &values);
    let output = effect.process(&frame, 1.0).unwrap();
    assert_eq!(effect.state(), EffectState::Active);

    for &(x, y) in [(50, 50), (49, 49)].iter() {
        let p = output.get_pixel(x, y).0;
        assert!(p.iter().all(|c| (*c as i32 - 128).abs() <= 8), "center pixel {:?}", p);
    }
    for &(x, y) in [(0, 0), (99, 99), (0, 50), (50, 5), (95, 50), (20, 80)].iter() {
        let p = output.get_pixel(x, y).0;
        assert!(p.iter().all(|c| *c <= 3), "pixel ({}, {}) beyond the rim is {:?}", x, y, p);
    }
}

#[test]
fn test_no_hysteresis() {
    let frame = smooth(64, 48);
    for disease in Disease::ALL.iter() {
        let mut effect = effect(*disease, &ValueMap::new());
        let first = effect.process(&frame, 0.55).unwrap();
        effect.process(&frame, 0.95).unwrap();
        effect.process(&frame, 0.1).unwrap();
        let again = effect.process(&frame, 0.55).unwrap();
        assert_eq!(first, again, "{}", disease);

        let mut fresh = Effect::new(disease.descriptor(&ValueMap::new()).unwrap()).unwrap();
        assert_eq!(fresh.process(&frame, 0.55).unwrap(), first, "{}", disease);
    }
}

#[test]
fn test_reduced_resolution_stays_close() {
    let descriptor = EffectDescriptor::new("reduced", Bands::none())
        .with_layer(Layer::Blur(BlurLayer {
            onset: 0.0,
            radius: Ramp::constant(0.02),
            strength: Ramp::constant(1.0),
            region: None,
        }))
        .with_layer(Layer::VisionLoss(VisionLossLayer {
            onset: 0.0,
            rim: RimSpec::peripheral(Ramp::constant(0.5)).with_fade(Ramp::constant(0.1)),
            convention: Convention::Occlusion,
            fill: [0, 0, 0],
            strength: Ramp::constant(1.0),
        }));
    let frame = smooth(128, 96);
    let full = Effect::new(descriptor.clone())
        .unwrap()
        .process(&frame, 0.8)
        .unwrap();
    let mut reduced_effect = Effect::new(descriptor).unwrap().with_work_scale(0.5);
    assert_eq!(reduced_effect.work_scale(), 0.5);
    let reduced = reduced_effect.process(&frame, 0.8).unwrap();
    assert_eq!(reduced.dimensions(), full.dimensions());
    let error = mean_absolute_error(&full, &reduced);
    assert!(error < 5.0, "mean absolute error {}", error);
}

#[test]
fn test_presets_at_reduced_resolution_stay_close() {
    let frame = smooth(96, 72);
    for disease in [Disease::Cataract, Disease::Myopia, Disease::CentralSerous].iter() {
        let full = effect(*disease, &ValueMap::new()).process(&frame, 0.6).unwrap();
        let reduced = effect(*disease, &ValueMap::new())
            .with_work_scale(0.5)
            .process(&frame, 0.6)
            .unwrap();
        let error = mean_absolute_error(&full, &reduced);
        assert!(error < 5.0, "{}: mean absolute error {}", disease, error);
    }
}

#[test]
fn test_onset_is_inclusive() {
    let descriptor = EffectDescriptor::new("onset", Bands::new(vec![0.4]).unwrap())
        .with_layer(Layer::Contrast(ContrastLayer {
            onset: 0.4,
            reduction: Ramp::constant(1.0),
            tint: [1.0, 1.0, 1.0],
            tint_strength: Ramp::constant(0.0),
            dimming: Ramp::constant(0.0),
        }));
    let mut effect = Effect::new(descriptor).unwrap();
    assert!(effect.stages(0.3999).is_empty());
    assert_eq!(effect.stages(0.4), Stages::CONTRAST);

    let frame = smooth(20, 20);
    assert_eq!(effect.process(&frame, 0.3999).unwrap(), frame);
    assert_eq!(effect.state(), EffectState::Active);
    let flat = effect.process(&frame, 0.4).unwrap();
    let first = flat.get_pixel(0, 0);
    assert!(flat.pixels().all(|p| p == first));
}

#[test]
fn test_severity_is_clamped() {
    let frame = smooth(40, 30);
    for disease in [Disease::Glaucoma, Disease::DiabeticRetinopathy].iter() {
        let mut effect = effect(*disease, &ValueMap::new());
        let full = effect.process(&frame, 1.0).unwrap();
        assert_eq!(effect.process(&frame, 7.5).unwrap(), full);
    }
}

#[test]
fn test_parameters_are_clamped() {
    let mut wild = ValueMap::new();
    wild.insert("glaucoma_rim_fraction".to_string(), Value::Number(5.0));
    wild.insert("glaucoma_s1".to_string(), Value::Number(-3.0));
    let mut tame = ValueMap::new();
    tame.insert("glaucoma_rim_fraction".to_string(), Value::Number(0.9));
    tame.insert("glaucoma_s1".to_string(), Value::Number(0.0));
    assert_eq!(
        Disease::Glaucoma.descriptor(&wild).unwrap(),
        Disease::Glaucoma.descriptor(&tame).unwrap()
    );
}

#[test]
fn test_stages_follow_thresholds() {
    let effect = effect(Disease::Glaucoma, &ValueMap::new());
    assert_eq!(effect.stages(0.1), Stages::BLUR);
    assert_eq!(effect.stages(0.2), Stages::BLUR | Stages::VISION_LOSS);
    assert_eq!(effect.stages(1.0), Stages::BLUR | Stages::VISION_LOSS);

    let effect = Effect::new(Disease::WetMacularDegeneration.descriptor(&ValueMap::new()).unwrap()).unwrap();
    assert!(!effect.stages(0.2).contains(Stages::LESIONS));
    assert!(effect.stages(0.35).contains(Stages::LESIONS | Stages::VISION_LOSS | Stages::DISTORTION));
}

#[test]
fn test_every_disease_keeps_frame_size() {
    let frame = smooth(33, 21);
    for disease in Disease::ALL.iter() {
        let mut effect = effect(*disease, &ValueMap::new());
        for severity in [0.25, 0.5, 0.75, 1.0].iter() {
            let output = effect.process(&frame, *severity).unwrap();
            assert_eq!(output.dimensions(), (33, 21), "{}", disease);
        }
        // a frame of another size triggers a rebuild instead of an error
        let other = smooth(20, 40);
        assert_eq!(effect.process(&other, 0.8).unwrap().dimensions(), (20, 40));
    }
}

#[test]
fn test_cataract_washes_out_contrast() {
    let frame = smooth(64, 48);
    let mut effect = effect(Disease::Cataract, &ValueMap::new());
    let output = effect.process(&frame, 1.0).unwrap();
    let spread = |f: &Frame| {
        let (lo, hi) = f
            .pixels()
            .map(|p| p.0[1])
            .fold((255u8, 0u8), |(lo, hi), v| (lo.min(v), hi.max(v)));
        hi - lo
    };
    assert!(spread(&output) < spread(&frame) / 2);
}

#[test]
fn test_spots_are_fixed_at_setup() {
    let effect = effect(Disease::DryMacularDegeneration, &ValueMap::new());
    let index = effect
        .descriptor()
        .layers
        .iter()
        .position(|layer| matches!(layer, Layer::Lesions(_)))
        .unwrap();
    let spots = effect.spots(index).unwrap();
    assert_eq!(spots.len(), 40);
    let again = Effect::new(Disease::DryMacularDegeneration.descriptor(&ValueMap::new()).unwrap()).unwrap();
    assert_eq!(&*again.spots(index).unwrap(), &*spots);
    assert!(effect.spots(0).unwrap().is_empty());
}

fn center_spot(fill: [u8; 3]) -> Layer {
    Layer::Lesions(LesionLayer {
        onset: 0.0,
        layout: SpotLayout {
            seed: 1,
            count: 1,
            center: cgmath::Vector2::new(0.5, 0.5),
            region: (0.0, 0.0),
            radius: (0.1, 0.1),
            aspect: (1.0, 1.0),
            thresholds: (0.0, 0.0),
            opacity: (1.0, 1.0),
        },
        growth_span: 0.1,
        fill,
    })
}

fn uniform_blur() -> Layer {
    Layer::Blur(BlurLayer {
        onset: 0.0,
        radius: Ramp::constant(0.05),
        strength: Ramp::constant(1.0),
        region: None,
    })
}

#[test]
fn test_blur_must_lead_the_composition() {
    let descriptor = EffectDescriptor::new("late_blur", Bands::none())
        .with_layer(center_spot([0, 0, 0]))
        .with_layer(uniform_blur());
    match Effect::new(descriptor) {
        Err(Error::InvalidDescriptor(message)) => assert!(message.contains("late_blur"), "{}", message),
        Err(err) => panic!("unexpected error {}", err),
        Ok(_) => panic!("blur after lesions was accepted"),
    }

    let descriptor = EffectDescriptor::new("early_blur", Bands::none())
        .with_layer(uniform_blur())
        .with_layer(uniform_blur())
        .with_layer(center_spot([0, 0, 0]));
    let mut effect = Effect::new(descriptor).unwrap();
    let output = effect.process(&gray(41, 41, 200), 0.5).unwrap();
    assert_eq!(output.get_pixel(20, 20).0, [0, 0, 0]);
    assert_eq!(output.get_pixel(0, 0).0, [200, 200, 200]);
}

#[test]
fn test_layer_order_changes_the_result() {
    let loss = Layer::VisionLoss(VisionLossLayer {
        onset: 0.0,
        rim: RimSpec::central(Ramp::constant(0.3)).with_fade(Ramp::constant(0.05)),
        convention: Convention::Occlusion,
        fill: [255, 0, 0],
        strength: Ramp::constant(1.0),
    });
    let contrast = Layer::Contrast(ContrastLayer {
        onset: 0.0,
        reduction: Ramp::constant(1.0),
        tint: [1.0, 1.0, 1.0],
        tint_strength: Ramp::constant(0.0),
        dimming: Ramp::constant(0.0),
    });
    let frame = smooth(64, 48);
    let run = |layers: Vec<Layer>| {
        let descriptor = layers
            .into_iter()
            .fold(EffectDescriptor::new("order", Bands::none()), |d, layer| d.with_layer(layer));
        Effect::new(descriptor).unwrap().process(&frame, 0.8).unwrap()
    };

    let flattened = run(vec![loss.clone(), contrast.clone()]);
    let overlaid = run(vec![contrast, loss]);
    assert_ne!(flattened, overlaid);
    let first = flattened.get_pixel(0, 0);
    assert!(flattened.pixels().all(|p| p == first));
    assert_eq!(overlaid.get_pixel(32, 24).0, [255, 0, 0]);
}

#[test]
fn test_floaters_stay_visible_as_curtain_advances() {
    let (width, height) = (200, 200);
    let frame = gray(width, height, 200);
    let mut effect = effect(Disease::RetinalDetachment, &ValueMap::new());
    let layers = &effect.descriptor().layers;
    let lesions = layers.iter().position(|layer| matches!(layer, Layer::Lesions(_))).unwrap();
    let curtain = layers.iter().position(|layer| matches!(layer, Layer::VisionLoss(_))).unwrap();

    // every floater is fully grown from here on
    let grown = 0.26;
    let base_mask = effect.layer_mask(lesions, width, height, grown).unwrap().unwrap();
    let base = effect.process(&frame, grown).unwrap();
    let darkening = |f: &Frame, i: usize| 200 - f.get_pixel(i as u32 % width, i as u32 / width).0[0] as i32;

    let mut checked = 0;
    for &severity in [0.3, 0.5, 0.7, 0.9].iter() {
        let mask = effect.layer_mask(lesions, width, height, severity).unwrap().unwrap();
        let loss = effect.layer_mask(curtain, width, height, severity).unwrap().unwrap();
        let output = effect.process(&frame, severity).unwrap();
        for (i, ((m0, m), c)) in base_mask
            .as_slice()
            .iter()
            .zip(mask.as_slice().iter())
            .zip(loss.as_slice().iter())
            .enumerate()
        {
            if *m0 < 0.05 || (m - m0).abs() > 1e-6 || *c > 0.01 {
                continue;
            }
            let before = darkening(&base, i);
            let after = darkening(&output, i);
            assert!(
                after >= before - 1,
                "floater at {} lost darkening {} -> {} at severity {}",
                i,
                before,
                after,
                severity
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_retinitis_pigmentosa_tunnel_stays_black() {
    let frame = gray(100, 100, 200);
    let mut effect = effect(Disease::RetinitisPigmentosa, &ValueMap::new());
    let output = effect.process(&frame, 1.0).unwrap();
    for &(x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)].iter() {
        let p = output.get_pixel(x, y).0;
        assert!(p.iter().all(|c| *c <= 3), "corner ({}, {}) is {:?}", x, y, p);
    }
    // night-blind dimming still reaches the remaining island
    let center = output.get_pixel(50, 50).0;
    assert!(center.iter().all(|c| (*c as i32 - 130).abs() <= 3), "center {:?}", center);
}
