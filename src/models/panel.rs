// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Physical panel dimensions.
//!
//! The tool assumes solar panels are rectangles; the user supplies the
//! lengths of the shorter and longer edges in centimeters. One centimeter
//! maps to one output pixel.

use crate::error::FlattenError;

/// Validated physical dimensions of a panel, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelDims {
    short_cm: f64,
    long_cm: f64,
}

impl PanelDims {
    /// Create dimensions, rejecting non-positive or non-finite values.
    pub fn new(short_cm: f64, long_cm: f64) -> Result<Self, FlattenError> {
        if !(short_cm.is_finite() && long_cm.is_finite() && short_cm > 0.0 && long_cm > 0.0) {
            return Err(FlattenError::InvalidDimensions {
                short: short_cm,
                long: long_cm,
            });
        }
        Ok(Self { short_cm, long_cm })
    }

    pub fn short_cm(&self) -> f64 {
        self.short_cm
    }

    pub fn long_cm(&self) -> f64 {
        self.long_cm
    }

    /// Output raster size in pixels: `round(short) x round(long)`.
    /// Dimensions that round to zero are rejected.
    pub fn output_size(&self) -> Result<(u32, u32), FlattenError> {
        let width = self.short_cm.round();
        let height = self.long_cm.round();
        if width < 1.0 || height < 1.0 {
            return Err(FlattenError::InvalidDimensions {
                short: self.short_cm,
                long: self.long_cm,
            });
        }
        Ok((width as u32, height as u32))
    }

    /// Manifest representation: `[short, long]`.
    pub fn as_array(&self) -> [f64; 2] {
        [self.short_cm, self.long_cm]
    }
}
