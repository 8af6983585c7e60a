mod format;

pub use format::{format_capture_datetime, format_shutter_speed};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Tag, Value};
use log::debug;

use crate::error::SiftError;

/// Placeholder for EXIF fields the file does not carry.
pub const UNKNOWN: &str = "Unknown";

/// Display-ready EXIF summary for one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureSummary {
    pub camera: String,
    pub lens: String,
    pub aperture: String,
    pub iso: String,
    pub shutter: String,
    pub captured: String,
}

impl Default for CaptureSummary {
    fn default() -> Self {
        Self {
            camera: UNKNOWN.to_string(),
            lens: UNKNOWN.to_string(),
            aperture: UNKNOWN.to_string(),
            iso: UNKNOWN.to_string(),
            shutter: UNKNOWN.to_string(),
            captured: UNKNOWN.to_string(),
        }
    }
}

/// Read the summary fields for one image. Files without readable EXIF get
/// the all-"Unknown" summary; that is an expected case, not an error.
pub fn read_summary(path: &Path) -> CaptureSummary {
    match read_container(path) {
        Ok(exif) => summarize(&exif),
        Err(e) => {
            debug!("No EXIF in {}: {}", path.display(), e);
            CaptureSummary::default()
        }
    }
}

/// Every primary-IFD tag in the file as (name, rendered value) pairs, for
/// the full-info window.
pub fn read_all_fields(path: &Path) -> Result<Vec<(String, String)>, SiftError> {
    let exif = read_container(path)?;
    Ok(exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .map(|f| {
            (
                f.tag.to_string(),
                f.display_value().with_unit(&exif).to_string(),
            )
        })
        .collect())
}

fn read_container(path: &Path) -> Result<Exif, SiftError> {
    let file = File::open(path).map_err(|e| SiftError::ExifRead {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let mut reader = BufReader::new(file);
    exif::Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| SiftError::ExifRead {
            path: path.to_path_buf(),
            source: e,
        })
}

fn summarize(exif: &Exif) -> CaptureSummary {
    let mut summary = CaptureSummary::default();

    if let Some(camera) = text_field(exif, Tag::Model) {
        summary.camera = camera;
    }

    // Lens is model and make joined; either half may be missing
    let lens_model = text_field(exif, Tag::LensModel).unwrap_or_default();
    let lens_make = text_field(exif, Tag::LensMake).unwrap_or_default();
    let lens = format!("{} {}", lens_model, lens_make).trim().to_string();
    if !lens.is_empty() {
        summary.lens = lens;
    }

    if let Some(f_number) = rational_field(exif, Tag::FNumber) {
        summary.aperture = format!("f/{:.1}", f_number);
    }

    if let Some(iso) = text_field(exif, Tag::PhotographicSensitivity) {
        summary.iso = iso;
    }

    if let Some(secs) = rational_field(exif, Tag::ExposureTime) {
        summary.shutter = format_shutter_speed(&secs.to_string());
    }

    if let Some(taken) = text_field(exif, Tag::DateTimeOriginal) {
        summary.captured = format_capture_datetime(&taken);
    }

    summary
}

/// Rendered field text with the quoting kamadak puts around ASCII values
/// stripped off.
fn text_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let text = field
        .display_value()
        .to_string()
        .trim_matches('"')
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn rational_field(exif: &Exif, tag: Tag) -> Option<f64> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_summary_defaults_to_unknown() {
        let summary = CaptureSummary::default();
        assert_eq!(summary.camera, UNKNOWN);
        assert_eq!(summary.lens, UNKNOWN);
        assert_eq!(summary.aperture, UNKNOWN);
        assert_eq!(summary.iso, UNKNOWN);
        assert_eq!(summary.shutter, UNKNOWN);
        assert_eq!(summary.captured, UNKNOWN);
    }

    #[test]
    fn test_plain_jpeg_without_exif_reads_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        let img = RgbImage::from_pixel(8, 8, Rgb([120, 80, 40]));
        img.save(&path).unwrap();

        let summary = read_summary(&path);
        assert_eq!(summary, CaptureSummary::default());
    }

    #[test]
    fn test_missing_file_reads_as_unknown() {
        let summary = read_summary(Path::new("/does/not/exist.jpg"));
        assert_eq!(summary, CaptureSummary::default());
    }

    #[test]
    fn test_all_fields_errors_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        assert!(read_all_fields(&path).is_err());
    }
}
