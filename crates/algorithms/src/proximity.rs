//! Proximity-field computation
//!
//! Turns a classified raster into a per-cell percentage of kernel-weighted
//! neighborhood matches: a weighted target mask and an all-ones eligibility
//! mask are each convolved with the kernel, and their ratio (scaled to 100)
//! is the field. The eligibility convolution bounds the denominator near
//! raster edges, where the kernel footprint is truncated.

use crate::convolve::fft_convolve_same;
use crate::kernel::{DecayExpr, KernelParams};
use ndarray::{Array2, Zip};
use proxfield_core::{Error, Raster, RasterElement, Resolution, Result};
use rayon::prelude::*;

/// Mapping from discrete cell values to contribution weights in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueMap<T: RasterElement> {
    /// Binary membership: matching cells weigh 1, everything else 0
    Single(T),
    /// Per-value weights; cells matching no entry weigh 0
    Weighted(Vec<(T, f64)>),
}

impl<T: RasterElement> ValueMap<T> {
    /// Validate that every weight lies in [0,1]
    pub fn validate(&self) -> Result<()> {
        if let ValueMap::Weighted(entries) = self {
            for (value, weight) in entries {
                if !(0.0..=1.0).contains(weight) {
                    return Err(Error::InvalidParameter {
                        name: "value_map",
                        value: format!("{:?} -> {}", value, weight),
                        reason: "weights must lie in [0,1]".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Weight assigned to a cell value
    fn weight_of(&self, value: T) -> f64 {
        match self {
            ValueMap::Single(target) => {
                if value == *target {
                    1.0
                } else {
                    0.0
                }
            }
            ValueMap::Weighted(entries) => entries
                .iter()
                .find(|(key, _)| value == *key)
                .map(|(_, w)| *w)
                .unwrap_or(0.0),
        }
    }
}

/// Capability trait for classified-raster providers that carry a default
/// value→weight map (e.g. a land-cover product knowing its tree classes).
pub trait DefaultValueMapProvider<T: RasterElement> {
    /// The provider's default value map
    fn default_value_map(&self) -> ValueMap<T>;
}

/// Resolve the value map to use: an explicit map wins, otherwise the
/// provider's default, otherwise [`Error::MissingValueMap`].
///
/// `provider_name` only feeds the error message.
pub fn resolve_value_map<T: RasterElement>(
    explicit: Option<ValueMap<T>>,
    provider: Option<&dyn DefaultValueMapProvider<T>>,
    provider_name: &str,
) -> Result<ValueMap<T>> {
    let map = match (explicit, provider) {
        (Some(map), _) => map,
        (None, Some(p)) => p.default_value_map(),
        (None, None) => return Err(Error::MissingValueMap(provider_name.to_string())),
    };
    map.validate()?;
    Ok(map)
}

/// Full parameter set for the proximity pipeline (kernel + value map).
#[derive(Debug, Clone)]
pub struct ProximityParams<T: RasterElement> {
    /// Kernel radius, shape exponent and decay expression
    pub kernel: KernelParams,
    /// Explicit value→weight map; `None` defers to a provider default
    pub value_map: Option<ValueMap<T>>,
}

impl<T: RasterElement> Default for ProximityParams<T> {
    fn default() -> Self {
        Self {
            kernel: KernelParams::default(),
            value_map: None,
        }
    }
}

/// Compute the proximity field for a classified raster.
///
/// Steps, in causal order: weighted target mask, all-ones eligibility mask,
/// two same-size FFT convolutions with the shared kernel, safe ratio scaled
/// to [0,100]. Cells with zero coverage density (possible only with an
/// all-zero kernel) are defined as 0 rather than an error.
///
/// The output field inherits the input's transform and CRS.
pub fn compute_proximity<T: RasterElement>(
    classified: &Raster<T>,
    kernel: &Array2<f64>,
    value_map: &ValueMap<T>,
) -> Result<Raster<f64>> {
    value_map.validate()?;

    let (rows, cols) = classified.shape();

    // Weighted target mask, built row-parallel.
    let target: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|row| {
            let data = classified.data();
            (0..cols).map(move |col| value_map.weight_of(data[(row, col)]))
        })
        .collect();
    let target = Array2::from_shape_vec((rows, cols), target)
        .map_err(|e| Error::Other(e.to_string()))?;

    // Every cell exists and is eligible.
    let ones = Array2::from_elem((rows, cols), 1.0);

    let occurrence = fft_convolve_same(&target, kernel);
    let coverage = fft_convolve_same(&ones, kernel);

    // Safe ratio: zero coverage yields 0, never a division error. The FFT
    // round trip leaves tiny negative residue near 0, hence the clamp.
    let mut field = Array2::zeros((rows, cols));
    Zip::from(&mut field)
        .and(&occurrence)
        .and(&coverage)
        .for_each(|out, &occ, &cov| {
            *out = if cov > 0.0 {
                (100.0 * occ / cov).clamp(0.0, 100.0)
            } else {
                0.0
            };
        });

    Ok(classified.with_same_meta(field))
}

/// Convenience wrapper: build the kernel from `params` for `resolution`,
/// resolve the value map against an optional provider, and compute the field.
pub fn proximity_field<T: RasterElement>(
    classified: &Raster<T>,
    resolution: Resolution,
    params: &ProximityParams<T>,
    provider: Option<&dyn DefaultValueMapProvider<T>>,
) -> Result<Raster<f64>> {
    let expr = DecayExpr::parse(&params.kernel.expression)?;
    let kernel = crate::kernel::build_kernel(
        params.kernel.radius,
        resolution,
        &expr,
        params.kernel.omega,
    )?;
    let value_map = resolve_value_map(params.value_map.clone(), provider, "classified raster")?;
    compute_proximity(classified, &kernel, &value_map)
}

/// Quantize a percentage field to 8-bit samples (0..=255) for export.
pub fn field_to_u8(field: &Raster<f64>) -> Raster<u8> {
    let data = field
        .data()
        .mapv(|v| (v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8);
    field.with_same_meta(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::build_kernel;
    use proxfield_core::GeoTransform;

    fn kernel_5x5() -> Array2<f64> {
        build_kernel(
            20.0,
            Resolution::Isotropic(10.0),
            &DecayExpr::default_expr(),
            1.0,
        )
        .unwrap()
    }

    fn classified(size: usize, value: u8) -> Raster<u8> {
        let mut r = Raster::filled(size, size, value);
        r.set_transform(GeoTransform::new(0.0, size as f64 * 10.0, 10.0, -10.0));
        r
    }

    #[test]
    fn test_all_match_is_100() {
        let raster = classified(12, 7);
        let field =
            compute_proximity(&raster, &kernel_5x5(), &ValueMap::Single(7)).unwrap();
        for &v in field.data().iter() {
            assert!((v - 100.0).abs() < 1e-6, "expected 100, got {}", v);
        }
    }

    #[test]
    fn test_no_match_is_0() {
        let raster = classified(12, 3);
        let field =
            compute_proximity(&raster, &kernel_5x5(), &ValueMap::Single(7)).unwrap();
        for &v in field.data().iter() {
            assert!(v.abs() < 1e-6, "expected 0, got {}", v);
        }
    }

    #[test]
    fn test_field_bounds_and_gradient() {
        // Left half target, right half background: the field must stay in
        // [0,100] and decrease left to right across the boundary.
        let mut raster = classified(16, 0);
        for row in 0..16 {
            for col in 0..8 {
                raster.set(row, col, 7).unwrap();
            }
        }
        let field =
            compute_proximity(&raster, &kernel_5x5(), &ValueMap::Single(7)).unwrap();

        for &v in field.data().iter() {
            assert!((0.0..=100.0).contains(&v));
        }
        let row = 8;
        assert!(field.get(row, 2).unwrap() > field.get(row, 8).unwrap());
        assert!(field.get(row, 8).unwrap() > field.get(row, 13).unwrap());
    }

    #[test]
    fn test_weighted_map() {
        // Uniform raster of a value weighted 0.5: ratio is 50 everywhere.
        let raster = classified(10, 4);
        let map = ValueMap::Weighted(vec![(4, 0.5), (9, 1.0)]);
        let field = compute_proximity(&raster, &kernel_5x5(), &map).unwrap();
        for &v in field.data().iter() {
            assert!((v - 50.0).abs() < 1e-6, "expected 50, got {}", v);
        }
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let raster = classified(4, 1);
        let map = ValueMap::Weighted(vec![(1, 1.5)]);
        assert!(compute_proximity(&raster, &kernel_5x5(), &map).is_err());
    }

    #[test]
    fn test_zero_kernel_degenerate_coverage() {
        // An all-zero kernel drives coverage density to 0 everywhere; the
        // convention is a zero field, not an error.
        let raster = classified(6, 7);
        let zero_kernel = Array2::zeros((3, 3));
        let field =
            compute_proximity(&raster, &zero_kernel, &ValueMap::Single(7)).unwrap();
        for &v in field.data().iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_resolve_value_map() {
        struct Provider;
        impl DefaultValueMapProvider<u8> for Provider {
            fn default_value_map(&self) -> ValueMap<u8> {
                ValueMap::Single(10)
            }
        }

        // Explicit map wins.
        let map =
            resolve_value_map(Some(ValueMap::Single(3u8)), Some(&Provider), "p").unwrap();
        assert_eq!(map, ValueMap::Single(3));

        // Provider default kicks in.
        let map = resolve_value_map(None, Some(&Provider), "p").unwrap();
        assert_eq!(map, ValueMap::Single(10));

        // Neither: configuration error.
        let err = resolve_value_map::<u8>(None, None, "worldcover").unwrap_err();
        assert!(matches!(err, Error::MissingValueMap(name) if name == "worldcover"));
    }

    #[test]
    fn test_field_inherits_transform() {
        let raster = classified(8, 7);
        let field =
            compute_proximity(&raster, &kernel_5x5(), &ValueMap::Single(7)).unwrap();
        assert_eq!(field.transform(), raster.transform());
        assert_eq!(field.shape(), raster.shape());
    }

    #[test]
    fn test_field_to_u8() {
        let mut field: Raster<f64> = Raster::new(1, 3);
        field.set(0, 0, 0.0).unwrap();
        field.set(0, 1, 50.0).unwrap();
        field.set(0, 2, 100.0).unwrap();

        let quantized = field_to_u8(&field);
        assert_eq!(quantized.get(0, 0).unwrap(), 0);
        assert_eq!(quantized.get(0, 1).unwrap(), 128);
        assert_eq!(quantized.get(0, 2).unwrap(), 255);
    }
}
