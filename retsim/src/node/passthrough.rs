use super::*;

/// A node that does not alter anything.
#[derive(Debug, Default)]
pub struct Passthrough;

impl Node for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn process(&mut self, frame: &Frame, _severity: f32) -> Result<Frame, Error> {
        Ok(frame.clone())
    }
}
