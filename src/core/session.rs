// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image annotation state machine.
//!
//! One `AnnotationSession` drives a whole run: it walks the input entries
//! in order and, for each image, cycles through corner collection, the
//! dimension prompt and the flattened result. The sticky dimensions
//! survive reloads and image changes; everything else resets per image.
//!
//! The working image is always exactly one of {original, flattened}: the
//! flattened raster shadows the original until `reload` or the next image
//! drops it.

use image::RgbaImage;

use crate::core::warp;
use crate::error::FlattenError;
use crate::io::input::InputEntry;
use crate::io::media;
use crate::models::geometry::Point;
use crate::models::panel::PanelDims;

/// Where the session is in the per-image cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded yet (run start, or between images).
    Idle,
    /// Accumulating corner clicks, fewer than four so far.
    CollectingCorners,
    /// Four corners recorded; waiting for the dimension prompt.
    AwaitingDimensions,
    /// Working image replaced by the perspective-corrected raster.
    Flattened,
    /// Input list exhausted; terminal.
    Done,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Recorded; more corners still needed.
    Recorded,
    /// This was the fourth corner: the session is now awaiting dimensions
    /// and the caller must prompt for them.
    CornersComplete,
    /// The session is not collecting corners; the click was dropped.
    Ignored,
}

pub struct AnnotationSession {
    entries: Vec<InputEntry>,
    /// Index into `entries`; `None` before the first `advance`.
    position: Option<usize>,
    state: SessionState,
    original: Option<RgbaImage>,
    flattened: Option<RgbaImage>,
    clicks: Vec<Point>,
    last_dims: Option<PanelDims>,
    /// Bumped whenever the working image changes, so the UI knows to
    /// re-upload its texture.
    revision: u64,
}

impl AnnotationSession {
    pub fn new(entries: Vec<InputEntry>) -> Self {
        Self {
            entries,
            position: None,
            state: SessionState::Idle,
            original: None,
            flattened: None,
            clicks: Vec::new(),
            last_dims: None,
            revision: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn clicks(&self) -> &[Point] {
        &self.clicks
    }

    pub fn last_dims(&self) -> Option<PanelDims> {
        self.last_dims
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn current_entry(&self) -> Option<&InputEntry> {
        self.position.and_then(|i| self.entries.get(i))
    }

    /// Hint points for the current image; shown but never clicked.
    pub fn hints(&self) -> &[Point] {
        self.current_entry().map(|e| e.hints.as_slice()).unwrap_or(&[])
    }

    /// The image the user currently sees: flattened when present,
    /// otherwise the original.
    pub fn working_image(&self) -> Option<&RgbaImage> {
        self.flattened.as_ref().or(self.original.as_ref())
    }

    pub fn is_flattened(&self) -> bool {
        self.flattened.is_some()
    }

    /// How far along the run is, as (current 1-based, total).
    pub fn progress(&self) -> (usize, usize) {
        let current = match self.position {
            Some(i) => (i + 1).min(self.entries.len()),
            None => 0,
        };
        (current, self.entries.len())
    }

    /// Step onto the next input entry (or the first). Returns `false` when
    /// the list is exhausted; the session is then terminal.
    pub fn advance(&mut self) -> bool {
        if self.state == SessionState::Done {
            return false;
        }
        let next = match self.position {
            None => 0,
            Some(i) => i + 1,
        };
        self.position = Some(next);
        self.original = None;
        self.flattened = None;
        self.clicks.clear();
        self.revision += 1;

        if next >= self.entries.len() {
            self.state = SessionState::Done;
            false
        } else {
            self.state = SessionState::Idle;
            true
        }
    }

    /// Decode the current entry's image and start collecting corners.
    pub fn load_current(&mut self) -> Result<(), FlattenError> {
        let Some(entry) = self.current_entry() else {
            return Ok(());
        };
        let img = media::load_image(&entry.path)?;
        self.original = Some(img);
        self.flattened = None;
        self.clicks.clear();
        self.state = SessionState::CollectingCorners;
        self.revision += 1;
        Ok(())
    }

    /// Record a corner click. The fourth click eagerly promotes the state;
    /// clicks in any other state are dropped.
    pub fn record_click(&mut self, point: Point) -> ClickOutcome {
        if self.state != SessionState::CollectingCorners || self.clicks.len() >= 4 {
            return ClickOutcome::Ignored;
        }
        self.clicks.push(point);
        if self.clicks.len() == 4 {
            self.state = SessionState::AwaitingDimensions;
            ClickOutcome::CornersComplete
        } else {
            ClickOutcome::Recorded
        }
    }

    /// Accept dimensions and flatten. Records the sticky dimensions, then
    /// warps the clicked quadrilateral.
    ///
    /// `InvalidDimensions` leaves the session awaiting dimensions for a
    /// re-prompt; `DegenerateGeometry` rolls it back to corner collection.
    pub fn supply_dimensions(&mut self, dims: PanelDims) -> Result<(), FlattenError> {
        if self.state != SessionState::AwaitingDimensions {
            log::debug!("supply_dimensions ignored in state {:?}", self.state);
            return Ok(());
        }
        // Reject sub-pixel sizes before making them sticky.
        dims.output_size()?;
        self.last_dims = Some(dims);
        self.flatten_clicked(dims)
    }

    /// Flatten with the sticky dimensions from the last accepted entry.
    pub fn reuse_last_dimensions(&mut self) -> Result<(), FlattenError> {
        if self.state != SessionState::AwaitingDimensions {
            log::debug!("reuse_last_dimensions ignored in state {:?}", self.state);
            return Ok(());
        }
        let dims = self.last_dims.ok_or(FlattenError::NoPriorDimensions)?;
        self.flatten_clicked(dims)
    }

    fn flatten_clicked(&mut self, dims: PanelDims) -> Result<(), FlattenError> {
        debug_assert_eq!(self.clicks.len(), 4);
        let (Some(original), &[a, b, c, d]) = (self.original.as_ref(), self.clicks.as_slice())
        else {
            log::error!("flatten requested without a loaded image and four corners");
            return Ok(());
        };
        let corners = [a, b, c, d];

        match warp::flatten(original, &corners, dims) {
            Ok(flat) => {
                self.flattened = Some(flat);
                self.clicks.clear();
                self.state = SessionState::Flattened;
                self.revision += 1;
                Ok(())
            }
            Err(err @ FlattenError::DegenerateGeometry) => {
                // Annotation retry: back to corner collection.
                self.clicks.clear();
                self.state = SessionState::CollectingCorners;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Abandon the current annotation (or flattened result) and start the
    /// same image over.
    pub fn reload(&mut self) {
        if self.original.is_none() {
            return;
        }
        self.flattened = None;
        self.clicks.clear();
        self.state = SessionState::CollectingCorners;
        self.revision += 1;
    }

    /// Consume the flattened raster on save, returning it and reloading
    /// the original. `None` when nothing is flattened.
    pub fn take_flattened(&mut self) -> Option<RgbaImage> {
        if self.state != SessionState::Flattened {
            return None;
        }
        let flat = self.flattened.take();
        self.reload();
        flat
    }
}
