//! Native GeoTIFF reading/writing (without a GDAL dependency)
//!
//! Uses the `tiff` crate for TIFF I/O. Georeferencing is carried through the
//! ModelPixelScale and ModelTiepoint tags; projections beyond a bare GeoKey
//! directory are out of scope.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray8, Gray32Float, RGBA8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

/// Read a single-band GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    decode_geotiff(File::open(path.as_ref())?)
}

/// Read a single-band GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data))
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let (rows, cols) = (height as usize, width as usize);

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    fn cast_all<S: Copy, T: RasterElement>(buf: &[S]) -> Vec<T>
    where
        S: num_traits::NumCast,
    {
        buf.iter()
            .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
            .collect()
    }

    let data: Vec<T> = match image {
        DecodingResult::U8(buf) => cast_all(&buf),
        DecodingResult::U16(buf) => cast_all(&buf),
        DecodingResult::U32(buf) => cast_all(&buf),
        DecodingResult::I8(buf) => cast_all(&buf),
        DecodingResult::I16(buf) => cast_all(&buf),
        DecodingResult::I32(buf) => cast_all(&buf),
        DecodingResult::F32(buf) => cast_all(&buf),
        DecodingResult::F64(buf) => cast_all(&buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

/// Attempt to read a GeoTransform from the GeoTIFF tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    // The `tiff` crate reads these tags as the named variants, not `Unknown`.
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Other("Cannot determine geotransform".into()));
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Write a Raster to a GeoTIFF file as 32-bit float samples
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    encode_f32(raster, File::create(path.as_ref())?)
}

/// Write a Raster to an in-memory GeoTIFF buffer as 32-bit float samples
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_f32(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write the ModelPixelScale, ModelTiepoint and minimal GeoKey directory
/// tags. Macro so the `tiff` image encoder's type stays inferred.
macro_rules! write_geo_tags {
    ($image:expr, $gt:expr) => {{
        let gt: &GeoTransform = $gt;
        let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
        $image
            .encoder()
            .write_tag(Tag::Unknown(TAG_MODEL_PIXEL_SCALE), &scale[..])
            .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

        // tiepoint: [I, J, K, X, Y, Z]
        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        $image
            .encoder()
            .write_tag(Tag::Unknown(TAG_MODEL_TIEPOINT), &tiepoint[..])
            .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

        // Minimal GeoKey directory: GTModelTypeGeoKey=Projected,
        // GTRasterTypeGeoKey=RasterPixelIsArea.
        let geokeys: [u16; 12] = [
            1, 1, 0, 2, //
            1024, 0, 1, 1, //
            1025, 0, 1, 1, //
        ];
        $image
            .encoder()
            .write_tag(Tag::Unknown(TAG_GEO_KEY_DIRECTORY), &geokeys[..])
            .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;
    }};
}

/// Write a u8 raster to a GeoTIFF file with 8-bit samples.
///
/// Export path for percentage fields already quantized to 0..=255.
pub fn write_geotiff_from_u8<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let writer = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<u8> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray8>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;
    write_geo_tags!(image, raster.transform());
    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Write an RGBA pixel buffer (row-major, 4 bytes per pixel) to a
/// georeferenced TIFF file.
///
/// Export path for colormapped renderings of a field.
pub fn write_rgba_geotiff<P: AsRef<Path>>(
    rgba: &[u8],
    rows: usize,
    cols: usize,
    transform: &GeoTransform,
    path: P,
) -> Result<()> {
    if rgba.len() != rows * cols * 4 {
        return Err(Error::InvalidParameter {
            name: "rgba",
            value: rgba.len().to_string(),
            reason: format!("buffer must hold {} bytes ({}x{}x4)", rows * cols * 4, rows, cols),
        });
    }

    let writer = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let mut image = encoder
        .new_image::<RGBA8>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;
    write_geo_tags!(image, transform);
    image
        .write_data(rgba)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

fn encode_f32<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;
    write_geo_tags!(image, raster.transform());
    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_buffer() {
        let mut raster: Raster<f64> = Raster::new(4, 6);
        raster.set_transform(GeoTransform::new(500.0, 1000.0, 10.0, -10.0));
        raster.set(1, 2, 42.5).unwrap();

        let buf = write_geotiff_to_buffer(&raster).unwrap();
        let decoded: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(decoded.shape(), (4, 6));
        assert!((decoded.get(1, 2).unwrap() - 42.5).abs() < 1e-6);
        assert_eq!(decoded.transform().origin_x, 500.0);
        assert_eq!(decoded.transform().origin_y, 1000.0);
        assert_eq!(decoded.transform().pixel_width, 10.0);
        assert_eq!(decoded.transform().pixel_height, -10.0);
    }
}
