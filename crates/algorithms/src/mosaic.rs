//! Bounding-box extraction and mosaicking across raster sources
//!
//! Each source contributes only the pixel window intersecting the requested
//! region; windows are read individually (never the whole tile) and stitched
//! into one georeferenced array. Overlap policy is explicit last-write-wins
//! in source order, so callers supplying sources deterministically get
//! deterministic mosaics.

use ndarray::{s, Array3};
use proxfield_core::{
    BoundingPolygon, Crs, Error, GeoTransform, Raster, RasterMeta, Resolution, Result,
};

/// A pixel window within a source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub cols: usize,
    pub rows: usize,
}

/// What the mosaic extractor expects from an already-resolved raster source.
///
/// Acquisition (downloads, caching, authentication) is a collaborator's job;
/// a source here is open and readable.
pub trait RasterSource {
    /// Affine transform of the full source
    fn transform(&self) -> GeoTransform;

    /// Full source dimensions as (rows, cols)
    fn shape(&self) -> (usize, usize);

    /// Number of bands
    fn band_count(&self) -> usize;

    /// Physical pixel scale
    fn resolution(&self) -> Resolution;

    /// Coordinate reference system, if known
    fn crs(&self) -> Option<Crs> {
        None
    }

    /// Read a pixel window as (band, row, col) samples.
    ///
    /// Implementations must read only the requested window.
    fn read_window(&self, window: &PixelWindow) -> Result<Array3<f64>>;
}

/// Compute the pixel window of `bounds` (min_x, min_y, max_x, max_y) under a
/// source's transform, clamped to the source shape.
///
/// Returns `None` when the region does not intersect the source extent;
/// callers treat that as "no contribution", not a failure.
pub fn window_for_bounds(
    transform: &GeoTransform,
    shape: (usize, usize),
    bounds: (f64, f64, f64, f64),
) -> Option<PixelWindow> {
    let (rows, cols) = shape;
    let (min_x, min_y, max_x, max_y) = bounds;

    // For north-up images min_y maps to max_row and max_y to min_row, so
    // take both corners and sort.
    let (col_a, row_a) = transform.geo_to_pixel(min_x, max_y);
    let (col_b, row_b) = transform.geo_to_pixel(max_x, min_y);

    let min_col = col_a.min(col_b).floor() as isize;
    let max_col = col_a.max(col_b).ceil() as isize;
    let min_row = row_a.min(row_b).floor() as isize;
    let max_row = row_a.max(row_b).ceil() as isize;

    // Clamp to the source extent.
    let min_col = (min_col.max(0) as usize).min(cols);
    let max_col = (max_col.max(0) as usize).min(cols);
    let min_row = (min_row.max(0) as usize).min(rows);
    let max_row = (max_row.max(0) as usize).min(rows);

    if min_col >= max_col || min_row >= max_row {
        return None;
    }

    Some(PixelWindow {
        col_off: min_col,
        row_off: min_row,
        cols: max_col - min_col,
        rows: max_row - min_row,
    })
}

/// A stitched, georeferenced extraction result.
#[derive(Debug, Clone)]
pub struct Mosaic {
    /// Samples as (band, row, col)
    pub data: Array3<f64>,
    /// Transform of the stitched array
    pub transform: GeoTransform,
    /// Metadata consistent with `data`'s shape
    pub meta: RasterMeta,
}

impl Mosaic {
    /// Dimensions as (bands, rows, cols)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Extract one band as a georeferenced raster
    pub fn band(&self, index: usize) -> Result<Raster<f64>> {
        let (bands, _, _) = self.data.dim();
        if index >= bands {
            return Err(Error::InvalidParameter {
                name: "band",
                value: index.to_string(),
                reason: format!("mosaic has {} band(s)", bands),
            });
        }
        let mut raster = Raster::from_array(self.data.slice(s![index, .., ..]).to_owned());
        raster.set_transform(self.transform);
        raster.set_crs(self.meta.crs.clone());
        Ok(raster)
    }
}

/// Extract the region from an ordered sequence of raster sources.
///
/// The output grid is anchored at the first intersecting source's window
/// (its shape and re-derived window transform); subsequent sources are
/// placed by geographic position and overwrite overlapping pixels in order.
/// Sources the region misses entirely contribute nothing; if the region
/// intersects none of the sources the whole extraction fails with
/// [`Error::EmptyExtraction`].
pub fn extract(sources: &[&dyn RasterSource], region: &BoundingPolygon) -> Result<Mosaic> {
    let bounds = region.bounds();

    // Anchor the target grid on the first source the region touches.
    let anchor_idx = sources
        .iter()
        .position(|s| window_for_bounds(&s.transform(), s.shape(), bounds).is_some())
        .ok_or(Error::EmptyExtraction)?;

    let anchor_source = sources[anchor_idx];
    let bands = anchor_source.band_count();

    // The target covers the whole region at the anchor's scale; its pixel
    // window under the anchor transform may extend past the anchor tile,
    // so offsets are unclamped here.
    let at = anchor_source.transform();
    let (min_x, min_y, max_x, max_y) = bounds;
    let (col_a, row_a) = at.geo_to_pixel(min_x, max_y);
    let (col_b, row_b) = at.geo_to_pixel(max_x, min_y);
    let min_col = col_a.min(col_b).floor();
    let min_row = row_a.min(row_b).floor();
    let cols = (col_a.max(col_b).ceil() - min_col) as usize;
    let rows = (row_a.max(row_b).ceil() - min_row) as usize;

    let transform = GeoTransform {
        origin_x: at.origin_x + min_col * at.pixel_width + min_row * at.row_rotation,
        origin_y: at.origin_y + min_col * at.col_rotation + min_row * at.pixel_height,
        ..at
    };

    let mut data = Array3::<f64>::zeros((bands, rows, cols));

    for source in sources.iter().skip(anchor_idx) {
        // Cheap extent check before any pixel math.
        let (src_rows, src_cols) = source.shape();
        if !region.intersects_bounds(source.transform().bounds(src_cols, src_rows)) {
            continue;
        }
        let Some(window) = window_for_bounds(&source.transform(), source.shape(), bounds) else {
            continue;
        };

        let subset = source.read_window(&window)?;
        let (sub_bands, sub_rows, sub_cols) = subset.dim();
        if (sub_rows, sub_cols) != (window.rows, window.cols) {
            return Err(Error::SizeMismatch {
                er: window.rows,
                ec: window.cols,
                ar: sub_rows,
                ac: sub_cols,
            });
        }

        // Place the window by geographic position on the target grid.
        let window_transform = source.transform().window(window.col_off, window.row_off);
        let (origin_x, origin_y) = (window_transform.origin_x, window_transform.origin_y);
        let (col_f, row_f) = transform.geo_to_pixel(origin_x, origin_y);
        let col_shift = col_f.round() as isize;
        let row_shift = row_f.round() as isize;

        for band in 0..bands.min(sub_bands) {
            for r in 0..sub_rows {
                let tr = r as isize + row_shift;
                if tr < 0 || tr as usize >= rows {
                    continue;
                }
                for c in 0..sub_cols {
                    let tc = c as isize + col_shift;
                    if tc < 0 || tc as usize >= cols {
                        continue;
                    }
                    // Last write wins in source order.
                    data[(band, tr as usize, tc as usize)] = subset[(band, r, c)];
                }
            }
        }
    }

    let meta = RasterMeta {
        driver: "GTiff".to_string(),
        count: bands,
        dtype: "f64".to_string(),
        width: cols,
        height: rows,
        transform,
        crs: anchor_source.crs(),
    };

    Ok(Mosaic {
        data,
        transform,
        meta,
    })
}

/// An in-memory raster source, the test and adapter implementation of
/// [`RasterSource`].
#[derive(Debug, Clone)]
pub struct InMemorySource {
    bands: Array3<f64>,
    transform: GeoTransform,
    crs: Option<Crs>,
}

impl InMemorySource {
    /// Wrap (band, row, col) samples with their transform
    pub fn new(bands: Array3<f64>, transform: GeoTransform) -> Self {
        Self {
            bands,
            transform,
            crs: None,
        }
    }

    /// Wrap a single-band raster
    pub fn from_raster(raster: &Raster<f64>) -> Self {
        let (rows, cols) = raster.shape();
        let mut bands = Array3::zeros((1, rows, cols));
        bands.slice_mut(s![0, .., ..]).assign(raster.data());
        Self {
            bands,
            transform: *raster.transform(),
            crs: raster.crs().cloned(),
        }
    }

    /// Attach a CRS
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }
}

impl RasterSource for InMemorySource {
    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.bands.dim();
        (rows, cols)
    }

    fn band_count(&self) -> usize {
        self.bands.dim().0
    }

    fn resolution(&self) -> Resolution {
        let x = self.transform.pixel_width.abs();
        let y = self.transform.pixel_height.abs();
        if (x - y).abs() < f64::EPSILON {
            Resolution::Isotropic(x)
        } else {
            Resolution::Anisotropic { x, y }
        }
    }

    fn crs(&self) -> Option<Crs> {
        self.crs.clone()
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array3<f64>> {
        let (_, rows, cols) = self.bands.dim();
        if window.row_off + window.rows > rows || window.col_off + window.cols > cols {
            return Err(Error::IndexOutOfBounds {
                row: window.row_off + window.rows,
                col: window.col_off + window.cols,
                rows,
                cols,
            });
        }
        Ok(self
            .bands
            .slice(s![
                ..,
                window.row_off..window.row_off + window.rows,
                window.col_off..window.col_off + window.cols
            ])
            .to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10-unit pixels, origin at (x0, y0) as the top-left corner.
    fn source(x0: f64, y0: f64, rows: usize, cols: usize, fill: f64) -> InMemorySource {
        let bands = Array3::from_elem((1, rows, cols), fill);
        InMemorySource::new(bands, GeoTransform::new(x0, y0, 10.0, -10.0))
    }

    #[test]
    fn test_window_for_bounds_inside() {
        let gt = GeoTransform::new(0.0, 1000.0, 10.0, -10.0);
        let window = window_for_bounds(&gt, (100, 100), (100.0, 700.0, 300.0, 900.0)).unwrap();

        // x 100..300 -> cols 10..30; y 700..900 -> rows 10..30.
        assert_eq!(window.col_off, 10);
        assert_eq!(window.row_off, 10);
        assert_eq!(window.cols, 20);
        assert_eq!(window.rows, 20);
    }

    #[test]
    fn test_window_for_bounds_outside() {
        let gt = GeoTransform::new(0.0, 1000.0, 10.0, -10.0);
        assert!(window_for_bounds(&gt, (100, 100), (2000.0, 2000.0, 3000.0, 3000.0)).is_none());
    }

    #[test]
    fn test_single_source_extraction() {
        let src = source(0.0, 1000.0, 100, 100, 5.0);
        let region = BoundingPolygon::from_corners((100.0, 700.0), (300.0, 900.0));

        let mosaic = extract(&[&src], &region).unwrap();
        assert_eq!(mosaic.shape(), (1, 20, 20));
        assert_eq!(mosaic.transform.origin_x, 100.0);
        assert_eq!(mosaic.transform.origin_y, 900.0);
        assert!(mosaic.meta.matches_shape(20, 20));
        assert_eq!(mosaic.meta.count, 1);

        let band = mosaic.band(0).unwrap();
        assert_eq!(band.get(0, 0).unwrap(), 5.0);
        assert_eq!(band.transform(), &mosaic.transform);
    }

    #[test]
    fn test_empty_extraction() {
        let src = source(0.0, 1000.0, 100, 100, 5.0);
        let region = BoundingPolygon::from_corners((5000.0, 5000.0), (6000.0, 6000.0));
        assert!(matches!(
            extract(&[&src], &region),
            Err(Error::EmptyExtraction)
        ));
    }

    #[test]
    fn test_non_intersecting_source_contributes_nothing() {
        let near = source(0.0, 1000.0, 100, 100, 5.0);
        let far = source(50_000.0, 1000.0, 100, 100, 9.0);
        let region = BoundingPolygon::from_corners((100.0, 700.0), (300.0, 900.0));

        let mosaic = extract(&[&near, &far], &region).unwrap();
        let band = mosaic.band(0).unwrap();
        for &v in band.data().iter() {
            assert_eq!(v, 5.0);
        }
    }

    #[test]
    fn test_last_write_wins_overlap() {
        // Two co-registered tiles; the second overlaps the right half of
        // the region and must overwrite the first there.
        let whole = source(0.0, 1000.0, 100, 100, 1.0);
        let right = source(200.0, 1000.0, 100, 80, 2.0);
        let region = BoundingPolygon::from_corners((100.0, 700.0), (300.0, 900.0));

        let mosaic = extract(&[&whole, &right], &region).unwrap();
        let band = mosaic.band(0).unwrap();

        // Left of x=200 only the first tile contributes.
        assert_eq!(band.get(5, 0).unwrap(), 1.0);
        // Right of x=200 the second tile wrote last.
        assert_eq!(band.get(5, 15).unwrap(), 2.0);
    }

    #[test]
    fn test_band_index_out_of_range() {
        let src = source(0.0, 1000.0, 50, 50, 1.0);
        let region = BoundingPolygon::from_corners((0.0, 0.0), (500.0, 1000.0));
        let mosaic = extract(&[&src], &region).unwrap();
        assert!(mosaic.band(1).is_err());
    }

    #[test]
    fn test_in_memory_resolution() {
        let src = source(0.0, 1000.0, 10, 10, 0.0);
        assert_eq!(src.resolution(), Resolution::Isotropic(10.0));

        let aniso = InMemorySource::new(
            Array3::zeros((1, 4, 4)),
            GeoTransform::new(0.0, 0.0, 10.0, -20.0),
        );
        assert_eq!(
            aniso.resolution(),
            Resolution::Anisotropic { x: 10.0, y: 20.0 }
        );
    }
}
