//! Render a percentage field to an RGBA byte buffer.

use proxfield_core::{Raster, Result};

use crate::scheme::{evaluate, ColorScheme};

/// Parameters for rendering a field to RGBA.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub scheme: ColorScheme,
    /// Field value mapped to the bottom of the ramp.
    pub min: f64,
    /// Field value mapped to the top of the ramp.
    pub max: f64,
}

impl Default for ColormapParams {
    fn default() -> Self {
        // Proximity fields are percentages.
        Self {
            scheme: ColorScheme::default(),
            min: 0.0,
            max: 100.0,
        }
    }
}

/// Render a field to an RGBA buffer (row-major, 4 bytes per pixel).
///
/// Values are normalized into `[params.min, params.max]` and clamped;
/// nodata cells come out fully transparent.
pub fn field_to_rgba(field: &Raster<f64>, params: &ColormapParams) -> Result<Vec<u8>> {
    let (rows, cols) = field.data().dim();
    let span = params.max - params.min;
    let mut out = Vec::with_capacity(rows * cols * 4);
    for value in field.data().iter() {
        if field.is_nodata(*value) {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let t = if span > 0.0 {
            ((value - params.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let c = evaluate(params.scheme, t);
        out.extend_from_slice(&[c.r, c.g, c.b, 255]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proxfield_core::{Crs, GeoTransform, Raster};

    fn test_field(data: ndarray::Array2<f64>) -> Raster<f64> {
        let mut field = Raster::from_array(data);
        field.set_transform(GeoTransform::new(0.0, 100.0, 10.0, -10.0));
        field.set_crs(Some(Crs::Epsg(32719)));
        field
    }

    #[test]
    fn test_green_ramp_on_percentages() {
        let field = test_field(array![[0.0, 50.0], [100.0, 25.0]]);
        let rgba = field_to_rgba(&field, &ColormapParams::default()).unwrap();
        assert_eq!(rgba.len(), 16);
        // 0% -> black, 100% -> full green, all opaque.
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[0, 128, 0, 255]);
        assert_eq!(&rgba[8..12], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_nodata_is_transparent() {
        let mut field = test_field(array![[0.0, 100.0]]);
        field.set_nodata(Some(-9999.0));
        field.set(0, 0, -9999.0).unwrap();
        let rgba = field_to_rgba(&field, &ColormapParams::default()).unwrap();
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
        assert_eq!(&rgba[4..8], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_values_clamp_to_range() {
        let field = test_field(array![[-5.0, 120.0]]);
        let rgba = field_to_rgba(&field, &ColormapParams::default()).unwrap();
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_degenerate_range() {
        let field = test_field(array![[42.0]]);
        let params = ColormapParams {
            min: 42.0,
            max: 42.0,
            ..Default::default()
        };
        let rgba = field_to_rgba(&field, &params).unwrap();
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
    }
}
