// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and saving.
//!
//! All in-memory work happens on RGBA buffers; formats without an alpha
//! channel (JPEG) are converted down on save.

use std::path::Path;

use image::RgbaImage;

use crate::error::FlattenError;

/// Decode the image at `path` into an RGBA buffer.
pub fn load_image(path: &Path) -> Result<RgbaImage, FlattenError> {
    if !path.exists() {
        return Err(FlattenError::MissingFile(path.to_path_buf()));
    }
    let img = image::open(path)?;
    Ok(img.to_rgba8())
}

/// Encode `image` to `path`, choosing the format from the extension.
/// JPEG cannot carry alpha, so those paths are flattened to RGB first.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), FlattenError> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false);

    if is_jpeg {
        let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        rgb.save(path)?;
    } else {
        image.save(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_missing_file() {
        let err = load_image(Path::new("/nonexistent/panel.jpg")).unwrap_err();
        assert!(matches!(err, FlattenError::MissingFile(_)));
    }

    #[test]
    fn test_save_load_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.png");

        let img = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        save_image(&img, &path).unwrap();

        let back = load_image(&path).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_save_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.jpg");

        let img = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 128]));
        save_image(&img, &path).unwrap();

        let back = load_image(&path).unwrap();
        assert_eq!(back.dimensions(), (8, 4));
    }
}
