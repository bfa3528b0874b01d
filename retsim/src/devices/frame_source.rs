use std::collections::VecDeque;

use super::*;

/// Repeats one frame forever.
#[derive(Debug, Clone)]
pub struct StillSource {
    frame: Frame,
}

impl StillSource {
    pub fn new(frame: Frame) -> Self {
        StillSource { frame }
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<Frame, Error> {
        Ok(self.frame.clone())
    }
}

/// Yields a list of frames once; `None` entries model dropped camera frames.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    frames: VecDeque<Option<Frame>>,
}

impl SequenceSource {
    pub fn new<I: IntoIterator<Item = Frame>>(frames: I) -> Self {
        SequenceSource {
            frames: frames.into_iter().map(Some).collect(),
        }
    }

    /// Appends a tick without input.
    pub fn push_gap(&mut self) {
        self.frames.push_back(None);
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(Some(frame));
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for SequenceSource {
    fn next_frame(&mut self) -> Result<Frame, Error> {
        self.frames
            .pop_front()
            .flatten()
            .ok_or(Error::InputUnavailable)
    }
}
