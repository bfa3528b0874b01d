use super::*;

/// Keeps presented frames in memory, optionally only the most recent ones.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Vec<Frame>,
    capacity: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MemorySink {
            frames: Vec::new(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PresentationSink for MemorySink {
    fn present(&mut self, frame: &Frame) -> Result<(), Error> {
        if let Some(capacity) = self.capacity {
            if self.frames.len() >= capacity {
                self.frames.remove(0);
            }
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}
