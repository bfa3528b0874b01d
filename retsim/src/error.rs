use thiserror::Error;

/// Errors raised by the simulation pipeline.
///
/// Out-of-range severities and parameters are never reported here; they are clamped where
/// they are read.
#[derive(Debug, Error)]
pub enum Error {
    /// The frame source had nothing to deliver this tick.
    #[error("no frame available")]
    InputUnavailable,

    /// A cached grid was used with a frame of different size.
    #[error("cached grid is {expected:?} but the frame is {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// A buffer could not be allocated. Fatal for the effect instance.
    #[error("unable to allocate {bytes} bytes for {what}")]
    ResourceExhaustion { what: &'static str, bytes: usize },

    #[error("invalid effect descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("unknown disease '{0}'")]
    UnknownDisease(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors after which the effect instance must be stopped or rebuilt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ResourceExhaustion { .. })
    }
}
