// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for PanelFlat.
//!
//! Domain errors are typed so the UI layer can decide per-variant whether
//! to re-prompt, roll back the annotation, or abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the core and I/O layers.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// A panel dimension was zero, negative or not finite.
    #[error("panel dimensions must be positive, got {short} x {long} cm")]
    InvalidDimensions { short: f64, long: f64 },

    /// The four clicked corners are collinear (or coincident) and do not
    /// define an invertible perspective mapping.
    #[error("clicked corners are collinear or degenerate; re-select the panel corners")]
    DegenerateGeometry,

    /// "Use Last" was requested before any dimensions were entered this run.
    #[error("no previously entered dimensions to reuse")]
    NoPriorDimensions,

    /// A panel hint entry in the input file is not a list of `[x, y]`
    /// integer pairs.
    #[error("malformed panel hints: {0}")]
    HintFormat(String),

    /// The input file is neither a list of image paths nor a mapping of
    /// image path to hint points.
    #[error("malformed input json: {0}")]
    JsonFormat(String),

    /// A listed source image does not exist on disk.
    #[error("source image not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
