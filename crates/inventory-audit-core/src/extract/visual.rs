use crate::storage::models::{SatelliteRecord, VisualMeta};
use std::path::Path;

pub fn extract(path: &Path) -> Option<SatelliteRecord> {
    Some(SatelliteRecord::Visual(extract_visual(path)))
}

#[cfg(not(feature = "images"))]
pub fn extract_visual(_path: &Path) -> VisualMeta {
    VisualMeta::default()
}

/// Dimensions and colour mode from the decoder header, GPS from EXIF when
/// present. A header that will not decode yields the zeroed default.
#[cfg(feature = "images")]
pub fn extract_visual(path: &Path) -> VisualMeta {
    let mut meta = VisualMeta::default();

    match decoder::read_header(path) {
        Ok((width, height, mode)) => {
            meta.width = width as i64;
            meta.height = height as i64;
            meta.color_space = mode.to_string();
        }
        Err(e) => {
            tracing::trace!("Image decode failed for {}: {}", path.display(), e);
            return meta;
        }
    }

    if let Some((latitude, longitude)) = gps::read_coordinates(path) {
        meta.gps_latitude = Some(latitude);
        meta.gps_longitude = Some(longitude);
    }

    meta
}

#[cfg(feature = "images")]
mod decoder {
    use image::{ColorType, ImageDecoder, ImageReader, ImageResult};
    use std::path::Path;

    pub fn read_header(path: &Path) -> ImageResult<(u32, u32, &'static str)> {
        let decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        Ok((width, height, color_mode(decoder.color_type())))
    }

    /// Short mode labels in the style photo tooling reports them.
    pub fn color_mode(color: ColorType) -> &'static str {
        match color {
            ColorType::L8 => "L",
            ColorType::La8 => "LA",
            ColorType::Rgb8 => "RGB",
            ColorType::Rgba8 => "RGBA",
            ColorType::L16 => "I;16",
            ColorType::La16 => "LA;16",
            ColorType::Rgb16 => "RGB;16",
            ColorType::Rgba16 => "RGBA;16",
            ColorType::Rgb32F => "RGB;F",
            ColorType::Rgba32F => "RGBA;F",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(feature = "images")]
mod gps {
    use exif::{In, Tag, Value};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    pub fn read_coordinates(path: &Path) -> Option<(f64, f64)> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

        let latitude = coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
        let longitude = coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
        Some((latitude, longitude))
    }

    /// Degrees/minutes/seconds rationals to signed decimal degrees.
    fn coordinate(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
        let field = exif.get_field(value_tag, In::PRIMARY)?;
        let reference = exif.get_field(ref_tag, In::PRIMARY)?;

        let dms = match &field.value {
            Value::Rational(r) if r.len() >= 3 => r,
            _ => return None,
        };

        let decimal = dms[0].to_f64() + dms[1].to_f64() / 60.0 + dms[2].to_f64() / 3600.0;
        let hemisphere = reference.display_value().to_string();
        if hemisphere == "S" || hemisphere == "W" {
            Some(-decimal)
        } else {
            Some(decimal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_garbage_image_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let meta = extract_visual(&path);
        assert_eq!(meta, VisualMeta::default());
        assert_eq!(meta.color_space, "UNKNOWN");
    }

    #[cfg(feature = "images")]
    #[test]
    fn test_png_dimensions_and_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("facade.png");
        image::RgbImage::new(4, 3).save(&path).unwrap();

        let meta = extract_visual(&path);
        assert_eq!(meta.width, 4);
        assert_eq!(meta.height, 3);
        assert_eq!(meta.color_space, "RGB");
        assert!(meta.gps_latitude.is_none());
    }

    #[cfg(feature = "images")]
    #[test]
    fn test_grayscale_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");
        image::GrayImage::new(2, 2).save(&path).unwrap();

        assert_eq!(extract_visual(&path).color_space, "L");
    }
}
