//!
//! This module contains several [Nodes](Node) that can be chained to form a [Flow].
//!
mod disease_node;
mod passthrough;

pub use self::disease_node::*;
pub use self::passthrough::*;

use super::*;

/// An executable function that implements an aspect of the simulation.
pub trait Node: Send {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Set new parameters for this effect.
    #[allow(unused_variables)]
    fn update_values(&mut self, values: &ValueMap) -> Result<(), Error> {
        Ok(())
    }

    /// Transforms one frame at the given severity.
    fn process(&mut self, frame: &Frame, severity: f32) -> Result<Frame, Error>;

    /// Drops cached state, e.g. after the node failed mid-frame.
    fn reset(&mut self) {}
}

impl Node for Effect {
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn process(&mut self, frame: &Frame, severity: f32) -> Result<Frame, Error> {
        Effect::process(self, frame, severity)
    }

    fn reset(&mut self) {
        Effect::reset(self)
    }
}
