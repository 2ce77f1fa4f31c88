//! # Proxfield Algorithms
//!
//! Neighborhood-prevalence computation over classified rasters.
//!
//! ## Modules
//!
//! - **kernel**: Distance-weighted kernel built from a textual decay expression
//! - **convolve**: FFT-based 2D convolution ("same" output size)
//! - **proximity**: Weighted target masking and percentage-field computation
//! - **mosaic**: Bounding-box extraction and stitching across raster sources
//!
//! The usual flow: [`mosaic::extract`] stitches sources over a region,
//! [`kernel::build_kernel`] turns a physical radius and pixel resolution into
//! a weight kernel, and [`proximity::compute_proximity`] produces the
//! per-cell percentage field.

pub mod convolve;
pub mod kernel;
pub mod mosaic;
pub mod proximity;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::kernel::{build_kernel, DecayExpr, KernelParams};
    pub use crate::mosaic::{extract, InMemorySource, Mosaic, RasterSource};
    pub use crate::proximity::{
        compute_proximity, resolve_value_map, DefaultValueMapProvider, ProximityParams, ValueMap,
    };
    pub use proxfield_core::prelude::*;
}
