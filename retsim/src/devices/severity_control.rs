use std::sync::{Arc, RwLock};

use super::*;

/// A constant severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSeverity(pub f32);

impl SeverityController for FixedSeverity {
    fn read_severity(&mut self) -> f32 {
        clamp_severity(self.0)
    }
}

/// Plays back a list of severities, one per reading, holding the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedSeverity {
    steps: Vec<f32>,
    position: usize,
}

impl ScriptedSeverity {
    pub fn new(steps: Vec<f32>) -> Self {
        ScriptedSeverity { steps, position: 0 }
    }

    /// A linear sweep from `from` to `to` (both included) over `steps` readings.
    pub fn sweep(from: f32, to: f32, steps: usize) -> Self {
        let steps = match steps {
            0 => Vec::new(),
            1 => vec![from],
            n => (0..n)
                .map(|i| from + (to - from) * i as f32 / (n - 1) as f32)
                .collect(),
        };
        ScriptedSeverity::new(steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True once every step has been read.
    pub fn is_finished(&self) -> bool {
        self.position >= self.steps.len()
    }
}

impl SeverityController for ScriptedSeverity {
    fn read_severity(&mut self) -> f32 {
        let value = match self.steps.get(self.position) {
            Some(value) => *value,
            None => self.steps.last().copied().unwrap_or(0.0),
        };
        self.position = (self.position + 1).min(self.steps.len());
        clamp_severity(value)
    }
}

/// A severity shared between threads, e.g. set by a remote control.
#[derive(Debug, Clone, Default)]
pub struct SharedSeverity {
    value: Arc<RwLock<f32>>,
}

impl SharedSeverity {
    pub fn new(value: f32) -> Self {
        SharedSeverity {
            value: Arc::new(RwLock::new(clamp_severity(value))),
        }
    }

    pub fn set(&self, value: f32) {
        match self.value.write() {
            Ok(mut guard) => *guard = clamp_severity(value),
            Err(poisoned) => *poisoned.into_inner() = clamp_severity(value),
        }
    }

    pub fn get(&self) -> f32 {
        match self.value.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl SeverityController for SharedSeverity {
    fn read_severity(&mut self) -> f32 {
        self.get()
    }
}
