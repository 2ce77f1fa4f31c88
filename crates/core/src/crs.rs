//! Coordinate Reference System tagging
//!
//! Rasters carry their CRS as opaque metadata; proxfield never reprojects.
//! All sources combined in one mosaic are expected to share a frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// EPSG code (e.g. 4326 for WGS84 geographic)
    Epsg(u32),
    /// WKT definition for systems without a known EPSG code
    Wkt(String),
}

impl Crs {
    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Crs::Epsg(4326)
    }

    /// EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Wkt(_) => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Wkt(wkt) => write!(f, "{}", wkt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Crs::wgs84().to_string(), "EPSG:4326");
        assert_eq!(Crs::wgs84().epsg(), Some(4326));
    }
}
