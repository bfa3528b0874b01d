mod cmd;
mod devices;
mod remote;

use std::thread;
use std::time::{Duration, Instant};

use log::LevelFilter;
use retsim::*;

use crate::cmd::*;
use crate::devices::*;
use crate::remote::*;

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Frame interval while driven by a remote, which has no natural end.
const REMOTE_FRAME_INTERVAL: Duration = Duration::from_millis(33);

enum InputSource {
    Still(StillSource),
    Video(Box<VideoSource>),
}

impl InputSource {
    fn open(input: &str) -> Result<Self, Error> {
        if has_video_extension(input) {
            Ok(InputSource::Video(Box::new(VideoSource::open(input)?)))
        } else {
            Ok(InputSource::Still(StillSource::new(load_frame(input)?)))
        }
    }

    fn is_video(&self) -> bool {
        matches!(self, InputSource::Video(_))
    }

    fn is_finished(&self) -> bool {
        match self {
            InputSource::Still(_) => false,
            InputSource::Video(video) => video.is_finished(),
        }
    }
}

impl FrameSource for InputSource {
    fn next_frame(&mut self) -> Result<Frame, Error> {
        match self {
            InputSource::Still(still) => still.next_frame(),
            InputSource::Video(video) => video.next_frame(),
        }
    }
}

/// Forwards presented frames to the output files and the remote clients.
struct Presenter<'a> {
    file: Option<FileSink>,
    remote: Option<&'a Remote>,
    presented: usize,
}

impl<'a> Presenter<'a> {
    fn set_severity(&mut self, severity: f32) {
        if let Some(file) = &mut self.file {
            file.set_severity(severity);
        }
    }
}

impl<'a> PresentationSink for Presenter<'a> {
    fn present(&mut self, frame: &Frame) -> Result<(), Error> {
        if let Some(file) = &mut self.file {
            file.present(frame)?;
        }
        if let Some(remote) = self.remote {
            remote.publish(frame);
        }
        self.presented += 1;
        Ok(())
    }
}

fn log_level(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn build_flow(config: &Config) -> Result<Flow, Error> {
    let mut flow = Flow::new();
    for disease in config.diseases.iter() {
        let node = DiseaseNode::new(*disease, &config.parameters)?.with_work_scale(config.scale);
        flow.add_node(Box::new(node));
    }
    Ok(flow)
}

fn severity_controller(config: &Config, shared: &SharedSeverity, remote: bool) -> Box<dyn SeverityController> {
    if remote {
        return Box::new(shared.clone());
    }
    match config.severity {
        SeverityMode::Fixed(value) => Box::new(FixedSeverity(value)),
        SeverityMode::Sweep { from, to, steps } => Box::new(ScriptedSeverity::sweep(from, to, steps)),
    }
}

/// Number of frames to produce for one input, unbounded if `None`.
fn frame_budget(config: &Config, source: &InputSource, remote: bool) -> Option<usize> {
    if config.frames.is_some() {
        config.frames
    } else if remote || source.is_video() {
        None
    } else {
        match config.severity {
            SeverityMode::Fixed(_) => Some(1),
            SeverityMode::Sweep { steps, .. } => Some(steps.max(1)),
        }
    }
}

fn run_sync(
    config: &Config,
    source: &mut InputSource,
    presenter: &mut Presenter,
    severity: &mut dyn SeverityController,
    remote: Option<&Remote>,
) -> BoxResult<()> {
    let mut flow = build_flow(config)?;
    let budget = frame_budget(config, source, remote.is_some());
    let mut tick = 0;
    while budget.map_or(true, |budget| tick < budget) {
        let start = Instant::now();
        if let Some(values) = remote.and_then(|remote| remote.take_values()) {
            flow.update_values(&values)?;
        }
        let value = severity.read_severity();
        presenter.set_severity(value);
        let mut fixed = FixedSeverity(value);
        let mut ctx = Context {
            source: &mut *source,
            severity: &mut fixed,
            sink: &mut *presenter,
        };
        let outcome = flow.tick(&mut ctx)?;
        log::debug!("[main] tick {}: {:?} at severity {:.3}", tick, outcome, value);
        if source.is_finished() {
            break;
        }
        tick += 1;
        if remote.is_some() {
            thread::sleep(REMOTE_FRAME_INTERVAL.saturating_sub(start.elapsed()));
        }
    }

    if config.track_perf {
        let stats = flow.stats();
        println!(
            "[perf] {} frames composited, {} skipped, {} failed, {:?} on average",
            stats.presented,
            stats.skipped,
            stats.failures,
            stats.average()
        );
    }
    Ok(())
}

fn run_async(
    config: &Config,
    source: &mut InputSource,
    presenter: &mut Presenter,
    severity: &mut dyn SeverityController,
    remote: Option<&Remote>,
) -> BoxResult<()> {
    let worker = Worker::spawn(build_flow(config)?)?;
    let budget = frame_budget(config, source, remote.is_some());
    let mut tick = 0;
    while budget.map_or(true, |budget| tick < budget) {
        let start = Instant::now();
        if let Some(values) = remote.and_then(|remote| remote.take_values()) {
            worker.update_values(values);
        }
        match source.next_frame() {
            Ok(frame) => {
                if !worker.submit(frame, severity.read_severity()) {
                    break;
                }
            }
            Err(Error::InputUnavailable) => {
                if source.is_finished() {
                    break;
                }
            }
            Err(err) => return Err(err.into()),
        }
        if let Some((output, value)) = worker.take_latest() {
            presenter.set_severity(value);
            presenter.present(&output)?;
        }
        tick += 1;
        if remote.is_some() {
            thread::sleep(REMOTE_FRAME_INTERVAL.saturating_sub(start.elapsed()));
        }
    }
    worker.wait_idle();
    if let Some((output, value)) = worker.take_latest() {
        presenter.set_severity(value);
        presenter.present(&output)?;
    }
    if let Some(err) = worker.take_failure() {
        return Err(err.into());
    }

    if config.track_perf {
        let stats = worker.stats();
        println!(
            "[perf] {} frames composited, {} dropped, {:?} on average",
            stats.processed,
            stats.dropped,
            stats.average()
        );
    }
    Ok(())
}

fn run(config: &Config) -> BoxResult<()> {
    if config.list {
        print!("{}", parameter_listing());
        return Ok(());
    }

    let initial = match config.severity {
        SeverityMode::Fixed(value) => value,
        SeverityMode::Sweep { from, .. } => from,
    };
    let shared = SharedSeverity::new(initial);
    let remote = match config.port {
        Some(port) => Some(Remote::new(port, shared.clone())?),
        None => None,
    };

    let label = config
        .diseases
        .iter()
        .map(|disease| disease.key())
        .collect::<Vec<_>>()
        .join("+");

    for input in config.inputs.iter() {
        log::info!("[main] processing {}", input);
        let mut source = InputSource::open(input)?;
        let mut presenter = Presenter {
            file: config
                .output
                .clone()
                .map(|template| FileSink::new(template, InputInfo::new(input, &label))),
            remote: remote.as_ref(),
            presented: 0,
        };
        let mut severity = severity_controller(config, &shared, remote.is_some());
        if config.asynchronous {
            run_async(config, &mut source, &mut presenter, severity.as_mut(), remote.as_ref())?;
        } else {
            run_sync(config, &mut source, &mut presenter, severity.as_mut(), remote.as_ref())?;
        }
        log::info!("[main] presented {} frames for {}", presenter.presented, input);
    }
    Ok(())
}

pub fn main() {
    let config = match cmd_parse() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(2);
        }
    };
    simple_logging::log_to_stderr(log_level(config.verbosity));

    if let Err(err) = run(&config) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
