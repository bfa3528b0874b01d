use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::*;

/// Counters of a [Worker].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub submitted: u64,
    pub processed: u64,
    /// Frames replaced by a newer frame before the worker picked them up.
    pub dropped: u64,
    pub busy: Duration,
}

impl WorkerStats {
    /// Mean compositing time per processed frame.
    pub fn average(&self) -> Duration {
        if self.processed == 0 {
            Duration::from_secs(0)
        } else {
            self.busy / self.processed as u32
        }
    }
}

#[derive(Default)]
struct Mailbox {
    pending: Option<(Frame, f32)>,
    values: Option<ValueMap>,
    busy: bool,
    shutdown: bool,
    stopped: bool,
    latest: Option<(Frame, f32)>,
    failure: Option<Error>,
    stats: WorkerStats,
}

#[derive(Default)]
struct Shared {
    mailbox: Mutex<Mailbox>,
    wake: Condvar,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

///
/// Composites frames on a background thread.
///
/// The producer hands frames over with [submit](Worker::submit) and never waits for
/// compositing. At most one frame is pending: a frame submitted while another is still
/// pending replaces it. The consumer shows [latest](Worker::latest) meanwhile.
///
pub struct Worker {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(mut flow: Flow) -> Result<Self, Error> {
        let shared = Arc::new(Shared::default());
        let inner = shared.clone();
        let thread = thread::Builder::new()
            .name("retsim-worker".to_string())
            .spawn(move || {
                log::info!("[worker] started");
                loop {
                    let (frame, severity, values) = {
                        let mut mailbox = inner.lock();
                        while mailbox.pending.is_none() && !mailbox.shutdown {
                            mailbox = inner.wake.wait(mailbox).unwrap_or_else(PoisonError::into_inner);
                        }
                        match mailbox.pending.take() {
                            Some((frame, severity)) => {
                                mailbox.busy = true;
                                (frame, severity, mailbox.values.take())
                            }
                            None => break,
                        }
                    };

                    if let Some(values) = values {
                        if let Err(err) = flow.update_values(&values) {
                            log::warn!("[worker] rejected parameters: {}", err);
                        }
                    }
                    let start = Instant::now();
                    let result = flow.render(&frame, severity);
                    let elapsed = start.elapsed();

                    let mut mailbox = inner.lock();
                    mailbox.busy = false;
                    let fatal = match result {
                        Ok((output, _)) => {
                            mailbox.latest = Some((output, severity));
                            mailbox.stats.processed += 1;
                            mailbox.stats.busy += elapsed;
                            false
                        }
                        Err(err) => {
                            log::error!("[worker] stopping: {}", err);
                            mailbox.failure = Some(err);
                            mailbox.stopped = true;
                            mailbox.pending = None;
                            true
                        }
                    };
                    inner.idle.notify_all();
                    if fatal || mailbox.shutdown {
                        break;
                    }
                }
                log::info!("[worker] stopped");
            })?;
        Ok(Worker {
            shared,
            thread: Some(thread),
        })
    }

    /// Hands a frame to the worker. Returns false if the frame was not accepted because
    /// the worker stopped after a fatal error.
    pub fn submit(&self, frame: Frame, severity: f32) -> bool {
        let mut mailbox = self.shared.lock();
        if mailbox.stopped {
            mailbox.stats.dropped += 1;
            return false;
        }
        mailbox.stats.submitted += 1;
        if mailbox.pending.replace((frame, severity)).is_some() {
            mailbox.stats.dropped += 1;
            log::trace!("[worker] replaced a pending frame");
        }
        self.shared.wake.notify_one();
        true
    }

    /// Hands parameters to the worker; they apply from the next composited frame on.
    pub fn update_values(&self, values: ValueMap) {
        let mut mailbox = self.shared.lock();
        mailbox
            .values
            .get_or_insert_with(ValueMap::new)
            .extend(values);
    }

    /// The most recently composited frame.
    pub fn latest(&self) -> Option<Frame> {
        self.shared.lock().latest.as_ref().map(|(frame, _)| frame.clone())
    }

    /// Takes the most recently composited frame along with its severity.
    pub fn take_latest(&self) -> Option<(Frame, f32)> {
        self.shared.lock().latest.take()
    }

    pub fn stats(&self) -> WorkerStats {
        self.shared.lock().stats
    }

    /// The fatal error that stopped the worker, if any.
    pub fn take_failure(&self) -> Option<Error> {
        self.shared.lock().failure.take()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    /// Blocks until nothing is pending or being composited.
    pub fn wait_idle(&self) {
        let mut mailbox = self.shared.lock();
        while (mailbox.pending.is_some() || mailbox.busy) && !mailbox.stopped {
            mailbox = self
                .shared
                .idle
                .wait(mailbox)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        {
            let mut mailbox = self.shared.lock();
            mailbox.shutdown = true;
            mailbox.pending = None;
        }
        self.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[worker] thread panicked");
            }
        }
    }
}
