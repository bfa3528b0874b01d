//!
//! Severity-driven simulation of progressive retinal diseases.
//!
//! A single severity value in `[0,1]` drives procedurally generated masks (blur strength,
//! vision-loss rims, growing lesions, distortion fields) that are composited onto every
//! incoming frame. Diseases are declarative [EffectDescriptor]s run by one [Effect] engine;
//! several effects can be chained in a [Flow].
//!
#[macro_use]
extern crate bitflags;

mod blur;
mod compositor;
mod devices;
mod disease;
mod distortion;
mod effect;
mod error;
mod field;
mod flow;
mod mask;
mod node;
mod utils;
mod value;
mod worker;

pub use self::blur::*;
pub use self::compositor::*;
pub use self::devices::*;
pub use self::disease::*;
pub use self::distortion::*;
pub use self::effect::*;
pub use self::error::*;
pub use self::field::*;
pub use self::flow::*;
pub use self::mask::*;
pub use self::node::*;
pub use self::utils::*;
pub use self::value::*;
pub use self::worker::*;

/// An 8-bit RGB raster, replaced every tick.
pub type Frame = image::RgbImage;
