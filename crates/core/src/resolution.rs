//! Pixel resolution, isotropic or anisotropic

use crate::error::{Error, Result};

/// Physical scale of a raster pixel, in the source's linear unit per pixel.
///
/// Either one scalar (square pixels) or an x/y pair. Kernel construction and
/// window extraction branch on which shape they received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Same scale on both axes
    Isotropic(f64),
    /// Distinct x (column) and y (row) scales
    Anisotropic { x: f64, y: f64 },
}

impl Resolution {
    /// Isotropic resolution; fails on non-positive or non-finite scales
    pub fn isotropic(scale: f64) -> Result<Self> {
        check_scale(scale)?;
        Ok(Resolution::Isotropic(scale))
    }

    /// Anisotropic resolution; fails on non-positive or non-finite scales
    pub fn anisotropic(x: f64, y: f64) -> Result<Self> {
        check_scale(x)?;
        check_scale(y)?;
        Ok(Resolution::Anisotropic { x, y })
    }

    /// Build from a slice: one element is isotropic, two are an x/y pair.
    /// Any other arity is an unsupported resolution shape.
    pub fn from_slice(scales: &[f64]) -> Result<Self> {
        match *scales {
            [s] => Self::isotropic(s),
            [x, y] => Self::anisotropic(x, y),
            _ => Err(Error::UnsupportedResolution(format!(
                "expected a scalar or an x/y pair, got {} values",
                scales.len()
            ))),
        }
    }

    /// Re-check both scales. The variants are public, so values built
    /// without the checked constructors may carry non-positive scales.
    pub fn validate(&self) -> Result<()> {
        check_scale(self.x())?;
        check_scale(self.y())
    }

    /// Scale along the x (column) axis
    pub fn x(&self) -> f64 {
        match *self {
            Resolution::Isotropic(s) => s,
            Resolution::Anisotropic { x, .. } => x,
        }
    }

    /// Scale along the y (row) axis
    pub fn y(&self) -> f64 {
        match *self {
            Resolution::Isotropic(s) => s,
            Resolution::Anisotropic { y, .. } => y,
        }
    }
}

fn check_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::UnsupportedResolution(format!(
            "scale must be a positive finite number, got {}",
            scale
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_shapes() {
        assert_eq!(
            Resolution::from_slice(&[10.0]).unwrap(),
            Resolution::Isotropic(10.0)
        );
        assert_eq!(
            Resolution::from_slice(&[10.0, 20.0]).unwrap(),
            Resolution::Anisotropic { x: 10.0, y: 20.0 }
        );
        assert!(Resolution::from_slice(&[]).is_err());
        assert!(Resolution::from_slice(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(Resolution::isotropic(0.0).is_err());
        assert!(Resolution::isotropic(-5.0).is_err());
        assert!(Resolution::anisotropic(10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_validate_literal_variants() {
        assert!(Resolution::Isotropic(-10.0).validate().is_err());
        assert!(Resolution::Anisotropic { x: 10.0, y: 0.0 }.validate().is_err());
        assert!(Resolution::Isotropic(10.0).validate().is_ok());
    }

    #[test]
    fn test_axis_accessors() {
        let r = Resolution::Anisotropic { x: 10.0, y: 20.0 };
        assert_eq!(r.x(), 10.0);
        assert_eq!(r.y(), 20.0);

        let iso = Resolution::Isotropic(5.0);
        assert_eq!(iso.x(), 5.0);
        assert_eq!(iso.y(), 5.0);
    }
}
