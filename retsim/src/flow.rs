use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::*;

/// The collaborators a [Flow] talks to on every tick.
pub struct Context<'a> {
    pub source: &'a mut dyn FrameSource,
    pub severity: &'a mut dyn SeverityController,
    pub sink: &'a mut dyn PresentationSink,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A freshly composited frame was presented.
    Presented,
    /// No input; the previous output was presented again.
    Redisplayed,
    /// No input and nothing to redisplay.
    Skipped,
    /// A node failed; the unmodified input was presented.
    PassedThrough,
}

/// Counters and timing over the lifetime of a flow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowStats {
    pub ticks: u64,
    pub presented: u64,
    pub skipped: u64,
    pub failures: u64,
    pub busy: Duration,
}

impl FlowStats {
    /// Mean compositing time of the successfully composited frames.
    pub fn average(&self) -> Duration {
        if self.presented == 0 {
            Duration::from_secs(0)
        } else {
            self.busy / self.presented as u32
        }
    }
}

/// A flow encapsulates simulation nodes, i.e., all simulation and compositing.
#[derive(Default)]
pub struct Flow {
    nodes: Vec<Box<dyn Node>>,
    last_output: Option<Frame>,
    stats: FlowStats,
}

impl Flow {
    pub fn new() -> Self {
        Flow::default()
    }

    pub fn add_node(&mut self, node: Box<dyn Node>) {
        self.nodes.push(node);
    }

    /// Swaps in `node` at `index` and returns the node it replaced. Out of range, the flow
    /// is left unchanged and `node` is handed back as the error.
    pub fn replace_node(&mut self, index: usize, node: Box<dyn Node>) -> Result<Box<dyn Node>, Box<dyn Node>> {
        match self.nodes.get_mut(index) {
            Some(slot) => {
                self.last_output = None;
                Ok(std::mem::replace(slot, node))
            }
            None => Err(node),
        }
    }

    pub fn nodes_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    pub fn last_output(&self) -> Option<&Frame> {
        self.last_output.as_ref()
    }

    /// Propagates parameters to all nodes.
    pub fn update_values(&mut self, values: &ValueMap) -> Result<(), Error> {
        for node in self.nodes.iter_mut() {
            node.update_values(values)?;
        }
        Ok(())
    }

    /// Drops the cached state of every node and the remembered output.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut() {
            node.reset();
        }
        self.last_output = None;
    }

    ///
    /// Runs all nodes on one frame.
    ///
    /// A panic inside a node is caught here: the node is reset and the unmodified frame is
    /// returned. Fatal errors are propagated; other errors also degrade to the input frame.
    ///
    pub fn render(&mut self, frame: &Frame, severity: f32) -> Result<(Frame, TickOutcome), Error> {
        let start = Instant::now();
        let mut current = frame.clone();
        for node in self.nodes.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| node.process(&current, severity)));
            match result {
                Ok(Ok(output)) => current = output,
                Ok(Err(err)) if err.is_fatal() => {
                    log::error!("[{}] {}", node.name(), err);
                    self.stats.failures += 1;
                    return Err(err);
                }
                Ok(Err(err)) => {
                    log::warn!("[{}] passing frame through: {}", node.name(), err);
                    node.reset();
                    self.stats.failures += 1;
                    return Ok((frame.clone(), TickOutcome::PassedThrough));
                }
                Err(_) => {
                    log::warn!("[{}] panicked, passing frame through", node.name());
                    node.reset();
                    self.stats.failures += 1;
                    return Ok((frame.clone(), TickOutcome::PassedThrough));
                }
            }
        }
        let elapsed = start.elapsed();
        self.stats.busy += elapsed;
        self.stats.presented += 1;
        log::trace!("[flow] composited in {:?}", elapsed);
        Ok((current, TickOutcome::Presented))
    }

    /// Pulls one frame and one severity reading from `ctx` and presents the result.
    pub fn tick(&mut self, ctx: &mut Context) -> Result<TickOutcome, Error> {
        self.stats.ticks += 1;
        let frame = match ctx.source.next_frame() {
            Ok(frame) => frame,
            Err(Error::InputUnavailable) => {
                self.stats.skipped += 1;
                return Ok(match &self.last_output {
                    Some(previous) => {
                        log::debug!("[flow] no input, redisplaying previous frame");
                        ctx.sink.present(previous)?;
                        TickOutcome::Redisplayed
                    }
                    None => {
                        log::debug!("[flow] no input, skipping tick");
                        TickOutcome::Skipped
                    }
                });
            }
            Err(err) => return Err(err),
        };
        let severity = ctx.severity.read_severity();
        let (output, outcome) = self.render(&frame, severity)?;
        ctx.sink.present(&output)?;
        self.last_output = Some(output);
        Ok(outcome)
    }
}
