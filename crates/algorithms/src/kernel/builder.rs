//! Distance-kernel construction
//!
//! Builds the 2D weight grid used by the proximity engine: pixel offsets are
//! scaled back into physical units per axis, the decay expression is
//! evaluated at each cell's true distance, and weights are clipped to [0,1].

use crate::kernel::expr::{DecayExpr, DEFAULT_DECAY_EXPR};
use ndarray::Array2;
use proxfield_core::{Error, Resolution, Result};

/// Default shape exponent (linear falloff)
pub const DEFAULT_OMEGA: f64 = 1.0;

/// Parameters for kernel construction
#[derive(Debug, Clone)]
pub struct KernelParams {
    /// Physical radius in the raster's linear unit (e.g. meters)
    pub radius: f64,
    /// Shape exponent passed to the decay expression as `o`
    pub omega: f64,
    /// Decay expression over `x`, `r`, `o`
    pub expression: String,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            radius: 50.0,
            omega: DEFAULT_OMEGA,
            expression: DEFAULT_DECAY_EXPR.to_string(),
        }
    }
}

impl KernelParams {
    /// Parse the configured expression and build the kernel for a resolution.
    pub fn build(&self, resolution: Resolution) -> Result<Array2<f64>> {
        let expr = DecayExpr::parse(&self.expression)?;
        build_kernel(self.radius, resolution, &expr, self.omega)
    }
}

/// Build a distance-weighted kernel.
///
/// The kernel spans `[-radius_px, +radius_px]` integer pixel offsets on each
/// axis (`radius_px = radius / resolution` per axis, floored), so it is
/// always odd-dimensioned and centered at the origin. Each cell's weight is
/// the decay expression evaluated at the cell's *physical* distance from the
/// center; the per-axis scaling is what keeps the kernel a true physical
/// disk when x/y resolutions differ. Results are clipped to [0,1].
///
/// # Arguments
/// * `radius` - Physical radius, must be positive
/// * `resolution` - Pixel scale, isotropic or anisotropic
/// * `expr` - Parsed decay expression
/// * `omega` - Shape exponent passed as `o`
pub fn build_kernel(
    radius: f64,
    resolution: Resolution,
    expr: &DecayExpr,
    omega: f64,
) -> Result<Array2<f64>> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: radius.to_string(),
            reason: "kernel radius must be a positive finite number".to_string(),
        });
    }
    // Literal enum values can side-step the checked constructors; a negative
    // scale here would wrap the half-width into a huge shape.
    resolution.validate()?;

    let (res_x, res_y) = (resolution.x(), resolution.y());
    let half_x = (radius / res_x).floor() as isize;
    let half_y = (radius / res_y).floor() as isize;

    let rows = (2 * half_y + 1) as usize;
    let cols = (2 * half_x + 1) as usize;

    let kernel = Array2::from_shape_fn((rows, cols), |(i, j)| {
        let dy = (i as isize - half_y) as f64 * res_y;
        let dx = (j as isize - half_x) as f64 * res_x;
        let distance = (dx * dx + dy * dy).sqrt();
        expr.eval(distance, radius, omega).clamp(0.0, 1.0)
    });

    Ok(kernel)
}
