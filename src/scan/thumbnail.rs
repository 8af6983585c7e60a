use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use image::{DynamicImage, ImageReader, RgbaImage, imageops::FilterType};

use crate::error::SiftError;

/// Bounding box for filmstrip previews (width or height).
pub const PREVIEW_SIZE: u32 = 100;

/// Longest side of the texture backing the main viewer.
pub const DISPLAY_SIZE: u32 = 1920;

/// Render the filmstrip preview for one image: fit into the PREVIEW_SIZE
/// box (upscaling small images), then apply the EXIF orientation. The box
/// is square, so rotating after the resize lands on the same dimensions.
pub fn render_preview(path: &Path) -> Result<RgbaImage, SiftError> {
    let img = decode(path)?.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle);
    Ok(apply_orientation(img, read_orientation(path)).into_rgba8())
}

/// Render the viewer-resolution image. Large files are scaled down so the
/// longest side is DISPLAY_SIZE; smaller ones keep their native size.
pub fn render_display(path: &Path) -> Result<RgbaImage, SiftError> {
    let mut img = decode(path)?;
    if img.width() > DISPLAY_SIZE || img.height() > DISPLAY_SIZE {
        img = img.thumbnail(DISPLAY_SIZE, DISPLAY_SIZE);
    }
    Ok(apply_orientation(img, read_orientation(path)).into_rgba8())
}

fn decode(path: &Path) -> Result<DynamicImage, SiftError> {
    ImageReader::open(path)
        .map_err(|e| SiftError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SiftError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })
}

/// EXIF orientation tag (1..=8), defaulting to 1 on any read failure.
/// Only the file header is read; that covers the EXIF segment.
fn read_orientation(path: &Path) -> u32 {
    let Ok(file) = File::open(path) else {
        return 1;
    };

    let mut header = Vec::with_capacity(128 * 1024);
    if file.take(128 * 1024).read_to_end(&mut header).is_err() {
        return 1;
    }

    let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(&header)) else {
        return 1;
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => u32::from(*v.first().unwrap_or(&1)),
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
