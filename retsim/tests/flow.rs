use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use retsim::*;

fn solid(level: u8) -> Frame {
    Frame::from_pixel(8, 6, image::Rgb([level, level / 2, 255 - level]))
}

struct PanicNode;

impl Node for PanicNode {
    fn name(&self) -> &str {
        "panic"
    }

    fn process(&mut self, _frame: &Frame, _severity: f32) -> Result<Frame, Error> {
        panic!("node failure")
    }
}

struct FailingNode {
    fatal: bool,
}

impl Node for FailingNode {
    fn name(&self) -> &str {
        "failing"
    }

    fn process(&mut self, _frame: &Frame, _severity: f32) -> Result<Frame, Error> {
        if self.fatal {
            Err(Error::ResourceExhaustion {
                what: "test buffer",
                bytes: usize::MAX,
            })
        } else {
            Err(Error::DimensionMismatch {
                expected: (1, 1),
                actual: (8, 6),
            })
        }
    }
}

/// Blocks inside `process` until released, reporting each start.
struct GateNode {
    started: Sender<()>,
    release: Receiver<()>,
}

impl Node for GateNode {
    fn name(&self) -> &str {
        "gate"
    }

    fn process(&mut self, frame: &Frame, _severity: f32) -> Result<Frame, Error> {
        let _ = self.started.send(());
        let _ = self.release.recv();
        Ok(frame.clone())
    }
}

fn tick(flow: &mut Flow, source: &mut SequenceSource, sink: &mut MemorySink, severity: f32) -> TickOutcome {
    let mut severity = FixedSeverity(severity);
    let mut ctx = Context {
        source,
        severity: &mut severity,
        sink,
    };
    flow.tick(&mut ctx).unwrap()
}

#[test]
fn test_missing_input_skips_or_redisplays() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(Passthrough));
    let mut source = SequenceSource::new(Vec::new());
    source.push_gap();
    source.push(solid(10));
    source.push_gap();
    let mut sink = MemorySink::new();

    assert_eq!(tick(&mut flow, &mut source, &mut sink, 0.5), TickOutcome::Skipped);
    assert!(sink.is_empty());
    assert_eq!(tick(&mut flow, &mut source, &mut sink, 0.5), TickOutcome::Presented);
    assert_eq!(tick(&mut flow, &mut source, &mut sink, 0.5), TickOutcome::Redisplayed);
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.last(), Some(&solid(10)));

    // exhausted sources behave like gaps
    assert!(source.is_finished());
    assert_eq!(tick(&mut flow, &mut source, &mut sink, 0.5), TickOutcome::Redisplayed);

    let stats = flow.stats();
    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.presented, 1);
    assert_eq!(stats.skipped, 3);
}

#[test]
fn test_panicking_node_passes_frame_through() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(PanicNode));
    let mut source = SequenceSource::new(vec![solid(40)]);
    let mut sink = MemorySink::new();
    assert_eq!(
        tick(&mut flow, &mut source, &mut sink, 1.0),
        TickOutcome::PassedThrough
    );
    assert_eq!(sink.last(), Some(&solid(40)));
    assert_eq!(flow.stats().failures, 1);
}

#[test]
fn test_recoverable_error_passes_frame_through() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(FailingNode { fatal: false }));
    let (output, outcome) = flow.render(&solid(90), 0.5).unwrap();
    assert_eq!(outcome, TickOutcome::PassedThrough);
    assert_eq!(output, solid(90));
}

#[test]
fn test_fatal_error_is_propagated() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(FailingNode { fatal: true }));
    let mut source = SequenceSource::new(vec![solid(90)]);
    let mut sink = MemorySink::new();
    let mut severity = FixedSeverity(0.5);
    let mut ctx = Context {
        source: &mut source,
        severity: &mut severity,
        sink: &mut sink,
    };
    match flow.tick(&mut ctx) {
        Err(err) => assert!(err.is_fatal()),
        other => panic!("unexpected {:?}", other),
    }
    assert!(sink.is_empty());
}

#[test]
fn test_replace_node_checks_the_index() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(Passthrough));
    assert!(flow.render(&solid(90), 0.5).is_ok());

    let previous = flow.replace_node(0, Box::new(FailingNode { fatal: false })).ok().unwrap();
    assert_eq!(previous.name(), "passthrough");
    assert_eq!(flow.render(&solid(90), 0.5).unwrap().1, TickOutcome::PassedThrough);

    let rejected = flow.replace_node(3, Box::new(PanicNode)).err().unwrap();
    assert_eq!(rejected.name(), "panic");
    assert_eq!(flow.nodes_len(), 1);
}

#[test]
fn test_zero_severity_tick_presents_input() {
    let frame = Frame::from_fn(32, 24, |x, y| image::Rgb([(x * 7) as u8, (y * 9) as u8, 77]));
    let mut flow = Flow::new();
    for disease in Disease::ALL.iter() {
        flow.add_node(Box::new(DiseaseNode::new(*disease, &ValueMap::new()).unwrap()));
    }
    let mut source = StillSource::new(frame.clone());
    let mut severity = FixedSeverity(0.0);
    let mut sink = MemorySink::new();
    let mut ctx = Context {
        source: &mut source,
        severity: &mut severity,
        sink: &mut sink,
    };
    assert_eq!(flow.tick(&mut ctx).unwrap(), TickOutcome::Presented);
    assert_eq!(flow.tick(&mut ctx).unwrap(), TickOutcome::Presented);
    assert_eq!(sink.frames(), &[frame.clone(), frame][..]);
}

#[test]
fn test_scripted_severity_drives_ticks() {
    let frame = Frame::from_fn(40, 30, |x, y| image::Rgb([(x * 5) as u8, (y * 8) as u8, 128]));
    let mut flow = Flow::new();
    flow.add_node(Box::new(DiseaseNode::new(Disease::Glaucoma, &ValueMap::new()).unwrap()));
    let mut source = StillSource::new(frame.clone());
    let mut severity = ScriptedSeverity::sweep(0.0, 1.0, 3);
    let mut sink = MemorySink::new();
    let mut ctx = Context {
        source: &mut source,
        severity: &mut severity,
        sink: &mut sink,
    };
    for _ in 0..3 {
        flow.tick(&mut ctx).unwrap();
    }
    assert_eq!(sink.len(), 3);
    assert_eq!(sink.frames()[0], frame);
    assert_ne!(sink.frames()[2], frame);
}

#[test]
fn test_updated_values_change_output() {
    let frame = Frame::from_pixel(50, 50, image::Rgb([200, 200, 200]));
    let mut node = DiseaseNode::new(Disease::Glaucoma, &ValueMap::new()).unwrap();
    let before = node.process(&frame, 1.0).unwrap();

    let mut unrelated = ValueMap::new();
    unrelated.insert("cataract_blur".to_string(), Value::Number(0.05));
    node.update_values(&unrelated).unwrap();
    assert_eq!(node.process(&frame, 1.0).unwrap(), before);

    let mut values = ValueMap::new();
    values.insert("glaucoma_rim_fraction".to_string(), Value::Number(0.8));
    node.update_values(&values).unwrap();
    let after = node.process(&frame, 1.0).unwrap();
    assert_ne!(after, before);
    // a wider visible rim keeps more of the frame bright
    let bright = |f: &Frame| f.pixels().filter(|p| p.0[0] > 100).count();
    assert!(bright(&after) > bright(&before));
}

#[test]
fn test_worker_composites_in_background() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(DiseaseNode::new(Disease::Cataract, &ValueMap::new()).unwrap()));
    let worker = Worker::spawn(flow).unwrap();
    let frame = Frame::from_fn(24, 16, |x, y| image::Rgb([(x * 10) as u8, (y * 15) as u8, 30]));
    assert!(worker.submit(frame.clone(), 0.0));
    worker.wait_idle();
    assert_eq!(worker.latest(), Some(frame));
    assert_eq!(worker.stats().processed, 1);
    assert!(!worker.is_stopped());
}

#[test]
fn test_worker_drops_stale_frames() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let mut flow = Flow::new();
    flow.add_node(Box::new(GateNode {
        started: started_tx,
        release: release_rx,
    }));
    let worker = Worker::spawn(flow).unwrap();
    let timeout = Duration::from_secs(10);

    worker.submit(solid(1), 0.5);
    started_rx.recv_timeout(timeout).unwrap();
    // the worker is busy with the first frame; the second is replaced by the third
    worker.submit(solid(2), 0.5);
    worker.submit(solid(3), 0.5);
    release_tx.send(()).unwrap();
    started_rx.recv_timeout(timeout).unwrap();
    release_tx.send(()).unwrap();
    worker.wait_idle();

    let stats = worker.stats();
    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.dropped, 1);
    assert_eq!(worker.latest(), Some(solid(3)));
}

#[test]
fn test_worker_stops_after_fatal_error() {
    let mut flow = Flow::new();
    flow.add_node(Box::new(FailingNode { fatal: true }));
    let worker = Worker::spawn(flow).unwrap();
    assert!(worker.submit(solid(5), 0.5));
    worker.wait_idle();
    assert!(worker.is_stopped());
    assert!(worker.take_failure().map_or(false, |err| err.is_fatal()));
    assert!(!worker.submit(solid(6), 0.5));
    assert_eq!(worker.latest(), None);
}

#[test]
fn test_worker_applies_parameters_before_next_frame() {
    let frame = Frame::from_pixel(40, 40, image::Rgb([180, 180, 180]));
    let mut values = ValueMap::new();
    values.insert("glaucoma_rim_fraction".to_string(), Value::Number(0.7));
    let mut expected = DiseaseNode::new(Disease::Glaucoma, &values).unwrap();
    let expected = expected.process(&frame, 0.9).unwrap();

    let mut flow = Flow::new();
    flow.add_node(Box::new(DiseaseNode::new(Disease::Glaucoma, &ValueMap::new()).unwrap()));
    let worker = Worker::spawn(flow).unwrap();
    worker.update_values(values);
    worker.submit(frame, 0.9);
    worker.wait_idle();
    assert_eq!(worker.take_latest(), Some((expected, 0.9)));
    assert_eq!(worker.latest(), None);
}
