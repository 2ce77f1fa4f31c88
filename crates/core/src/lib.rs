//! # Proxfield Core
//!
//! Core types and I/O for the proxfield proximity-field library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `BoundingPolygon`: Geographic region of interest
//! - `Resolution`: Isotropic or anisotropic pixel scale
//! - GeoTIFF I/O without a GDAL dependency

pub mod crs;
pub mod error;
pub mod io;
pub mod meta;
pub mod raster;
pub mod region;
pub mod resolution;

pub use crs::Crs;
pub use error::{Error, Result};
pub use meta::RasterMeta;
pub use raster::{GeoTransform, Raster, RasterElement};
pub use region::BoundingPolygon;
pub use resolution::Resolution;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::meta::RasterMeta;
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::region::BoundingPolygon;
    pub use crate::resolution::Resolution;
}
