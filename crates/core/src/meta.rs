//! Raster metadata passed alongside extracted arrays

use crate::crs::Crs;
use crate::raster::GeoTransform;
use serde::{Deserialize, Serialize};

/// Metadata describing an extracted or exported raster.
///
/// Mirrors what a GeoTIFF writer needs: driver, band count, sample type and
/// dimensions, all kept consistent with the array they accompany.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMeta {
    /// Output driver name (always "GTiff" for now)
    pub driver: String,
    /// Number of bands
    pub count: usize,
    /// Sample type name ("f64", "u8", ...)
    pub dtype: String,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Affine transform of the array
    pub transform: GeoTransform,
    /// Coordinate reference system, if known
    pub crs: Option<Crs>,
}

impl RasterMeta {
    /// Metadata for a single-band f64 array of the given shape
    pub fn single_band(rows: usize, cols: usize, transform: GeoTransform) -> Self {
        Self {
            driver: "GTiff".to_string(),
            count: 1,
            dtype: "f64".to_string(),
            width: cols,
            height: rows,
            transform,
            crs: None,
        }
    }

    /// Check that the metadata matches an array shape (rows, cols)
    pub fn matches_shape(&self, rows: usize, cols: usize) -> bool {
        self.height == rows && self.width == cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_band() {
        let meta = RasterMeta::single_band(20, 30, GeoTransform::default());
        assert_eq!(meta.count, 1);
        assert!(meta.matches_shape(20, 30));
        assert!(!meta.matches_shape(30, 20));
    }
}
