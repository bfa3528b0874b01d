//!
//! Interfaces to the collaborators around the pipeline and simple in-memory implementations.
//!
mod frame_source;
mod memory_sink;
mod severity_control;

pub use self::frame_source::*;
pub use self::memory_sink::*;
pub use self::severity_control::*;

use crate::*;

/// Delivers the raw frame of each tick.
pub trait FrameSource {
    /// Returns [Error::InputUnavailable] when there is nothing to deliver this tick.
    fn next_frame(&mut self) -> Result<Frame, Error>;
}

/// Reports the current severity.
pub trait SeverityController {
    /// A reading in `[0,1]`; it may change arbitrarily between ticks.
    fn read_severity(&mut self) -> f32;
}

/// Receives one composited frame per presented tick.
pub trait PresentationSink {
    fn present(&mut self, frame: &Frame) -> Result<(), Error>;
}
