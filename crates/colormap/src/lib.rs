//! # Proxfield Colormap
//!
//! Color ramps and rendering for proximity percentage fields.
//!
//! Provides a small set of continuous ramps (green coverage ramp by
//! default), a multi-stop interpolation engine, a 256-entry discrete ramp
//! for 8-bit palette export, and [`field_to_rgba`] which converts a
//! percentage raster into an RGBA pixel buffer.

mod render;
mod scheme;

pub use render::{field_to_rgba, ColormapParams};
pub use scheme::{discrete_ramp, evaluate, ColorScheme, ColorStop, Rgb};
