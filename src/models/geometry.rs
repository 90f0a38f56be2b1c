// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric primitives and coordinate transformations.
//!
//! This module defines the image-space point type and the mapping between
//! screen (canvas) coordinates and source-image pixel coordinates used by
//! the canvas when the image is displayed scaled-to-fit.

use serde::{Deserialize, Serialize};

/// A 2D point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The axis-aligned rectangle a scaled-to-fit image occupies on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    /// Fit an `img_width` x `img_height` image into the available area,
    /// preserving aspect ratio and centering it.
    pub fn fit(
        avail_x: f32,
        avail_y: f32,
        avail_width: f32,
        avail_height: f32,
        img_width: u32,
        img_height: u32,
    ) -> Self {
        let img_aspect = img_width as f32 / img_height as f32;
        let avail_aspect = avail_width / avail_height;

        let (width, height) = if img_aspect > avail_aspect {
            // Image is wider - fit to width
            (avail_width, avail_width / img_aspect)
        } else {
            // Image is taller - fit to height
            (avail_height * img_aspect, avail_height)
        };

        Self {
            min_x: avail_x + (avail_width - width) / 2.0,
            min_y: avail_y + (avail_height - height) / 2.0,
            width,
            height,
        }
    }

    /// Convert a screen position to image pixel coordinates.
    /// Returns `None` when the position falls outside the displayed image.
    pub fn screen_to_image(&self, sx: f32, sy: f32, img_width: u32, img_height: u32) -> Option<Point> {
        let rel_x = (sx - self.min_x) / self.width;
        let rel_y = (sy - self.min_y) / self.height;
        if !(0.0..=1.0).contains(&rel_x) || !(0.0..=1.0).contains(&rel_y) {
            return None;
        }
        Some(Point::new(
            rel_x as f64 * img_width as f64,
            rel_y as f64 * img_height as f64,
        ))
    }

    /// Convert image pixel coordinates to a screen position.
    pub fn image_to_screen(&self, point: Point, img_width: u32, img_height: u32) -> (f32, f32) {
        (
            self.min_x + (point.x / img_width as f64) as f32 * self.width,
            self.min_y + (point.y / img_height as f64) as f32 * self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_image() {
        // 2:1 image into a square area fits to width
        let rect = DisplayRect::fit(0.0, 0.0, 100.0, 100.0, 200, 100);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
        assert_eq!(rect.min_y, 25.0);
    }

    #[test]
    fn test_fit_tall_image() {
        let rect = DisplayRect::fit(0.0, 0.0, 100.0, 100.0, 100, 200);
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 100.0);
        assert_eq!(rect.min_x, 25.0);
    }

    #[test]
    fn test_screen_image_roundtrip() {
        let rect = DisplayRect::fit(10.0, 20.0, 640.0, 480.0, 1920, 1080);
        let point = Point::new(960.0, 540.0);

        let (sx, sy) = rect.image_to_screen(point, 1920, 1080);
        let back = rect.screen_to_image(sx, sy, 1920, 1080).unwrap();

        assert!((back.x - point.x).abs() < 0.01);
        assert!((back.y - point.y).abs() < 0.01);
    }

    #[test]
    fn test_click_outside_image_rejected() {
        let rect = DisplayRect::fit(0.0, 0.0, 100.0, 100.0, 200, 100);
        // Above the letterboxed image
        assert!(rect.screen_to_image(50.0, 10.0, 200, 100).is_none());
        // Inside
        assert!(rect.screen_to_image(50.0, 50.0, 200, 100).is_some());
    }
}
