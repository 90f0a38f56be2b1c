// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Four-point perspective correction.
//!
//! Maps the quadrilateral bounded by four clicked corners onto an
//! axis-aligned rectangle whose aspect ratio comes from the panel's
//! physical dimensions. The homography is solved directly from the four
//! point correspondences (8 equations, 8 unknowns, `h33 = 1`) and the
//! output is resampled by inverse mapping with bilinear interpolation;
//! source coordinates outside the image fill with transparent black.
//!
//! Corner order is consumed exactly as clicked: the first corner maps to
//! the output's top-left, then `(w,0)`, `(w,h)`, `(0,h)`. No reordering is
//! attempted, so clicking corners in a non-cyclic order produces a
//! silently mis-warped result. Known limitation.

use image::{Rgba, RgbaImage};

use crate::error::FlattenError;
use crate::models::geometry::Point;
use crate::models::panel::PanelDims;

/// Pivots below this are treated as a singular system.
const PIVOT_EPSILON: f64 = 1e-10;

/// Three corners whose normalized cross product falls below this are
/// considered collinear.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// A 3x3 projective transform.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    m: [[f64; 3]; 3],
}

impl Homography {
    /// Compute the homography mapping the corners of a `width` x `height`
    /// rectangle (top-left, top-right, bottom-right, bottom-left) onto the
    /// four `quad` points, in order.
    ///
    /// This is the inverse-mapping direction used for resampling: output
    /// pixel coordinates go in, source image coordinates come out.
    pub fn rect_to_quad(width: f64, height: f64, quad: &[Point; 4]) -> Result<Self, FlattenError> {
        if quad_is_degenerate(quad) {
            return Err(FlattenError::DegenerateGeometry);
        }

        let rect = [
            (0.0, 0.0),
            (width, 0.0),
            (width, height),
            (0.0, height),
        ];

        // Build the 8x9 augmented system: two rows per correspondence.
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (u, v) = rect[i];
            let (x, y) = (quad[i].x, quad[i].y);

            let r0 = i * 2;
            a[r0][0] = u;
            a[r0][1] = v;
            a[r0][2] = 1.0;
            a[r0][6] = -u * x;
            a[r0][7] = -v * x;
            a[r0][8] = x;

            let r1 = i * 2 + 1;
            a[r1][3] = u;
            a[r1][4] = v;
            a[r1][5] = 1.0;
            a[r1][6] = -u * y;
            a[r1][7] = -v * y;
            a[r1][8] = y;
        }

        // Gaussian elimination with partial pivoting.
        for col in 0..8 {
            let mut max_val = a[col][col].abs();
            let mut max_row = col;
            for row in (col + 1)..8 {
                let v = a[row][col].abs();
                if v > max_val {
                    max_val = v;
                    max_row = row;
                }
            }
            if max_val < PIVOT_EPSILON {
                return Err(FlattenError::DegenerateGeometry);
            }
            if max_row != col {
                a.swap(col, max_row);
            }

            let pivot = a[col][col];
            for row in (col + 1)..8 {
                let factor = a[row][col] / pivot;
                for c in col..9 {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }

        // Back-substitution with h[8] fixed to 1.
        let mut h = [0.0f64; 9];
        h[8] = 1.0;
        for row in (0..8).rev() {
            let mut sum = a[row][8];
            for c in (row + 1)..8 {
                sum -= a[row][c] * h[c];
            }
            h[row] = sum / a[row][row];
        }

        Ok(Self {
            m: [
                [h[0], h[1], h[2]],
                [h[3], h[4], h[5]],
                [h[6], h[7], h[8]],
            ],
        })
    }

    /// Apply the transform to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let xx = m[0][0] * x + m[0][1] * y + m[0][2];
        let yy = m[1][0] * x + m[1][1] * y + m[1][2];
        let ww = m[2][0] * x + m[2][1] * y + m[2][2];
        (xx / ww, yy / ww)
    }
}

/// True when any three of the four corners are (near-)collinear, which
/// includes coincident points.
fn quad_is_degenerate(quad: &[Point; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let (ax, ay) = (quad[j].x - quad[i].x, quad[j].y - quad[i].y);
        let (bx, by) = (quad[k].x - quad[i].x, quad[k].y - quad[i].y);
        let cross = (ax * by - ay * bx).abs();
        let scale = (ax * ax + ay * ay).sqrt() * (bx * bx + by * by).sqrt();
        cross <= COLLINEAR_EPSILON * scale
    })
}

/// Perspective-correct the region bounded by `corners` into a new image of
/// `round(short) x round(long)` pixels.
///
/// Pure function: the source image is only read.
pub fn flatten(
    image: &RgbaImage,
    corners: &[Point; 4],
    dims: PanelDims,
) -> Result<RgbaImage, FlattenError> {
    let (out_width, out_height) = dims.output_size()?;
    let homography = Homography::rect_to_quad(out_width as f64, out_height as f64, corners)?;

    let mut output = RgbaImage::new(out_width, out_height);
    for (px, py, pixel) in output.enumerate_pixels_mut() {
        let (sx, sy) = homography.apply(px as f64, py as f64);
        *pixel = sample_bilinear(image, sx, sy);
    }
    Ok(output)
}

/// Bilinear sample at a real-valued source coordinate. Neighbors outside
/// the image contribute transparent black.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |ix: i64, iy: i64| -> [f64; 4] {
        if ix < 0 || iy < 0 || ix >= image.width() as i64 || iy >= image.height() as i64 {
            return [0.0; 4];
        }
        let p = image.get_pixel(ix as u32, iy as u32).0;
        [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
    };

    let p00 = fetch(x0 as i64, y0 as i64);
    let p10 = fetch(x0 as i64 + 1, y0 as i64);
    let p01 = fetch(x0 as i64, y0 as i64 + 1);
    let p11 = fetch(x0 as i64 + 1, y0 as i64 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(short: f64, long: f64) -> PanelDims {
        PanelDims::new(short, long).unwrap()
    }

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_output_size_matches_rounded_dims() {
        let img = gradient_image(200, 100);
        let corners = [
            Point::new(10.0, 10.0),
            Point::new(110.0, 10.0),
            Point::new(110.0, 60.0),
            Point::new(10.0, 60.0),
        ];
        let flat = flatten(&img, &corners, dims(50.4, 99.7)).unwrap();
        assert_eq!(flat.dimensions(), (50, 100));
    }

    #[test]
    fn test_collinear_corners_rejected() {
        let img = gradient_image(100, 100);
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(100.0, 100.0),
            Point::new(10.0, 90.0),
        ];
        assert!(matches!(
            flatten(&img, &corners, dims(50.0, 100.0)),
            Err(FlattenError::DegenerateGeometry)
        ));
    }

    #[test]
    fn test_coincident_corners_rejected() {
        let img = gradient_image(100, 100);
        let p = Point::new(5.0, 5.0);
        assert!(matches!(
            flatten(&img, &[p, p, p, p], dims(50.0, 100.0)),
            Err(FlattenError::DegenerateGeometry)
        ));
    }

    #[test]
    fn test_identity_roundtrip() {
        // Flattening a flat image by its own corners at its own size must
        // reproduce it exactly.
        let img = gradient_image(60, 40);
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(60.0, 40.0),
            Point::new(0.0, 40.0),
        ];
        let flat = flatten(&img, &corners, dims(60.0, 40.0)).unwrap();
        assert_eq!(flat, img);
    }

    #[test]
    fn test_homography_maps_rect_corners_to_quad() {
        let quad = [
            Point::new(12.0, 20.0),
            Point::new(90.0, 15.0),
            Point::new(95.0, 85.0),
            Point::new(5.0, 90.0),
        ];
        let h = Homography::rect_to_quad(50.0, 100.0, &quad).unwrap();
        let rect = [(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)];
        for i in 0..4 {
            let (x, y) = h.apply(rect[i].0, rect[i].1);
            assert!((x - quad[i].x).abs() < 1e-6, "corner {i}: x={x}");
            assert!((y - quad[i].y).abs() < 1e-6, "corner {i}: y={y}");
        }
    }

    #[test]
    fn test_axis_aligned_crop_picks_region() {
        // An axis-aligned quad at unit scale behaves like a crop.
        let img = gradient_image(200, 100);
        let corners = [
            Point::new(10.0, 20.0),
            Point::new(60.0, 20.0),
            Point::new(60.0, 50.0),
            Point::new(10.0, 50.0),
        ];
        let flat = flatten(&img, &corners, dims(50.0, 30.0)).unwrap();
        assert_eq!(flat.dimensions(), (50, 30));
        // Output origin should sample the source at (10, 20).
        assert_eq!(flat.get_pixel(0, 0), img.get_pixel(10, 20));
    }

    #[test]
    fn test_out_of_bounds_fills_transparent_black() {
        // Quad partly outside the source image.
        let img = gradient_image(50, 50);
        let corners = [
            Point::new(-30.0, -30.0),
            Point::new(20.0, -30.0),
            Point::new(20.0, 20.0),
            Point::new(-30.0, 20.0),
        ];
        let flat = flatten(&img, &corners, dims(50.0, 50.0)).unwrap();
        assert_eq!(flat.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        // Bottom-right of the quad is inside the source.
        assert_eq!(flat.get_pixel(35, 35), img.get_pixel(5, 5));
    }
}
