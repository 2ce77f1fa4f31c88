//! Frequency-domain 2D convolution
//!
//! Linear convolution via zero-padded FFTs with "same" output extraction:
//! the result has the input's shape with the kernel centered on each output
//! cell. Row passes run first, then column passes over a transposed
//! contiguous copy, so every 1D FFT sees a contiguous slice.

use ndarray::{Array2, Axis};
use num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

/// Convolve `input` with `kernel`, returning an array of `input`'s shape.
///
/// Both operands are treated as real-valued; the imaginary residue of the
/// inverse transform is discarded. The kernel may be larger than the input
/// on either axis.
pub fn fft_convolve_same(input: &Array2<f64>, kernel: &Array2<f64>) -> Array2<f64> {
    let (in_rows, in_cols) = input.dim();
    let (k_rows, k_cols) = kernel.dim();
    if in_rows == 0 || in_cols == 0 || k_rows == 0 || k_cols == 0 {
        return Array2::zeros((in_rows, in_cols));
    }

    // Full linear convolution size.
    let rows = in_rows + k_rows - 1;
    let cols = in_cols + k_cols - 1;

    let mut planner = FftPlanner::new();

    let mut a = pad_complex(input, rows, cols);
    let mut b = pad_complex(kernel, rows, cols);
    fft2_in_place(&mut planner, &mut a, FftDirection::Forward);
    fft2_in_place(&mut planner, &mut b, FftDirection::Forward);

    // Pointwise product in the frequency domain.
    a.zip_mut_with(&b, |x, &y| *x *= y);

    fft2_in_place(&mut planner, &mut a, FftDirection::Inverse);

    // rustfft does not normalize; the round trip gains a factor of N.
    let norm = 1.0 / (rows * cols) as f64;

    // "Same" extraction: drop the kernel's half-width margin.
    let (off_r, off_c) = (k_rows / 2, k_cols / 2);
    Array2::from_shape_fn((in_rows, in_cols), |(i, j)| {
        a[(i + off_r, j + off_c)].re * norm
    })
}

fn pad_complex(data: &Array2<f64>, rows: usize, cols: usize) -> Array2<Complex<f64>> {
    let mut out = Array2::zeros((rows, cols));
    for ((i, j), &v) in data.indexed_iter() {
        out[(i, j)] = Complex::new(v, 0.0);
    }
    out
}

/// 2D FFT over rows then columns.
fn fft2_in_place(
    planner: &mut FftPlanner<f64>,
    data: &mut Array2<Complex<f64>>,
    direction: FftDirection,
) {
    let (rows, cols) = data.dim();

    let row_fft = planner.plan_fft(cols, direction);
    for mut row in data.axis_iter_mut(Axis(0)) {
        row_fft.process(row.as_slice_mut().expect("row-major layout"));
    }

    // Transpose into a contiguous buffer for the column pass.
    let mut transposed = data.t().as_standard_layout().to_owned();
    let col_fft = planner.plan_fft(rows, direction);
    for mut row in transposed.axis_iter_mut(Axis(0)) {
        col_fft.process(row.as_slice_mut().expect("row-major layout"));
    }
    *data = transposed.t().as_standard_layout().to_owned();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.dim(), expected.dim());
        for ((i, j), &v) in expected.indexed_iter() {
            assert!(
                (actual[(i, j)] - v).abs() < 1e-9,
                "mismatch at ({}, {}): got {}, want {}",
                i,
                j,
                actual[(i, j)],
                v
            );
        }
    }

    #[test]
    fn test_identity_kernel() {
        let input = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let kernel = array![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let out = fft_convolve_same(&input, &kernel);
        assert_close(&out, &input);
    }

    #[test]
    fn test_box_sum_counts_neighbors() {
        // A 3x3 ones kernel over a ones raster counts neighbors, which is
        // 9 in the interior and fewer along edges and corners.
        let input = Array2::from_elem((5, 5), 1.0);
        let kernel = Array2::from_elem((3, 3), 1.0);
        let out = fft_convolve_same(&input, &kernel);

        assert!((out[(2, 2)] - 9.0).abs() < 1e-9);
        assert!((out[(0, 2)] - 6.0).abs() < 1e-9);
        assert!((out[(0, 0)] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_matches_direct_convolution() {
        let input = array![
            [0.0, 1.0, 2.0, 0.5],
            [3.0, 0.0, 1.0, 1.5],
            [0.0, 2.0, 0.0, 1.0],
        ];
        let kernel = array![[0.25, 0.5, 0.25], [0.5, 1.0, 0.5], [0.25, 0.5, 0.25]];

        let (rows, cols) = input.dim();
        let (kr, kc) = kernel.dim();
        let mut expected = Array2::zeros((rows, cols));
        for i in 0..rows as isize {
            for j in 0..cols as isize {
                let mut acc = 0.0;
                for ki in 0..kr as isize {
                    for kj in 0..kc as isize {
                        let r = i + ki - (kr as isize / 2);
                        let c = j + kj - (kc as isize / 2);
                        if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols {
                            // Convolution flips the kernel; symmetric kernels
                            // hide the distinction, so flip explicitly here.
                            acc += input[(r as usize, c as usize)]
                                * kernel[((kr - 1 - ki as usize), (kc - 1 - kj as usize))];
                        }
                    }
                }
                expected[(i as usize, j as usize)] = acc;
            }
        }

        let out = fft_convolve_same(&input, &kernel);
        assert_close(&out, &expected);
    }

    #[test]
    fn test_single_cell_kernel() {
        let input = array![[1.0, 2.0], [3.0, 4.0]];
        let kernel = array![[0.5]];
        let out = fft_convolve_same(&input, &kernel);
        assert_close(&out, &input.mapv(|v| v * 0.5));
    }

    #[test]
    fn test_empty_input() {
        let input = Array2::<f64>::zeros((0, 0));
        let kernel = Array2::from_elem((3, 3), 1.0);
        let out = fft_convolve_same(&input, &kernel);
        assert_eq!(out.dim(), (0, 0));
    }
}
