// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Run orchestration: drives the annotation session across the input
//! list, names and writes output images, and persists the save manifest.
//!
//! The manifest is held in memory for the whole run and flushed exactly
//! once, at `finish`. A crash before that loses manifest entries but not
//! the already-written images. Known limitation, kept as-is.

use std::path::{Path, PathBuf};

use crate::core::session::{AnnotationSession, ClickOutcome, SessionState};
use crate::error::FlattenError;
use crate::io::input::InputSpec;
use crate::io::media;
use crate::models::geometry::Point;
use crate::models::panel::PanelDims;

/// Output-path to panel-dimensions mapping, in save order.
#[derive(Debug, Default)]
pub struct SaveManifest {
    entries: Vec<(PathBuf, PanelDims)>,
}

impl SaveManifest {
    pub fn record(&mut self, path: PathBuf, dims: PanelDims) {
        self.entries.push((path, dims));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(PathBuf, PanelDims)] {
        &self.entries
    }

    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (path, dims) in &self.entries {
            map.insert(
                path.display().to_string(),
                serde_json::json!(dims.as_array()),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), FlattenError> {
        let json = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Drives one [`AnnotationSession`] across the input list and owns the
/// run-wide outputs. The UI layer calls straight through these methods;
/// they mirror its event contract one-to-one.
pub struct PanelFlattener {
    session: AnnotationSession,
    output_dir: PathBuf,
    manifest: SaveManifest,
    /// Saves of the current source image, for the `_flat_<n>` suffix.
    /// Resets on next-image.
    num_saved: usize,
}

impl PanelFlattener {
    pub fn new(input: InputSpec, output_dir: PathBuf) -> Self {
        Self {
            session: AnnotationSession::new(input.entries),
            output_dir,
            manifest: SaveManifest::default(),
            num_saved: 0,
        }
    }

    pub fn session(&self) -> &AnnotationSession {
        &self.session
    }

    pub fn manifest(&self) -> &SaveManifest {
        &self.manifest
    }

    /// Load the first annotatable image.
    pub fn start(&mut self) {
        self.advance_until_loaded();
    }

    /// Canvas click, already mapped to image coordinates.
    pub fn record_click(&mut self, point: Point) -> ClickOutcome {
        self.session.record_click(point)
    }

    /// Dimension prompt accepted with freshly entered values.
    pub fn supply_dimensions(&mut self, short_cm: f64, long_cm: f64) -> Result<(), FlattenError> {
        let dims = PanelDims::new(short_cm, long_cm)?;
        self.session.supply_dimensions(dims)
    }

    /// Dimension prompt accepted with the sticky values.
    pub fn reuse_last_dimensions(&mut self) -> Result<(), FlattenError> {
        self.session.reuse_last_dimensions()
    }

    /// Reload button: abandon the current annotation.
    pub fn reload(&mut self) {
        self.session.reload();
    }

    /// Save button. Writes the flattened image under
    /// `<stem>_flat[_<n>].<ext>`, records the manifest entry and reloads
    /// the source image. A silent no-op unless the image is flattened.
    pub fn save(&mut self) -> Result<Option<PathBuf>, FlattenError> {
        if self.session.state() != SessionState::Flattened {
            log::debug!("save ignored: nothing flattened");
            return Ok(None);
        }
        let Some(dims) = self.session.last_dims() else {
            return Ok(None);
        };
        let out_path = self.next_output_path();

        let Some(flat) = self.session.take_flattened() else {
            return Ok(None);
        };
        std::fs::create_dir_all(&self.output_dir)?;
        media::save_image(&flat, &out_path)?;

        self.manifest.record(out_path.clone(), dims);
        self.num_saved += 1;
        log::info!("saved {}", out_path.display());
        Ok(Some(out_path))
    }

    /// Next button: move on to the following image. The sticky dimensions
    /// and the manifest carry over; the save counter does not.
    pub fn next_image(&mut self) {
        self.num_saved = 0;
        self.advance_until_loaded();
    }

    /// Ensure the output directory exists and flush `result.json`.
    /// Returns the manifest path.
    pub fn finish(&self) -> Result<PathBuf, FlattenError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join("result.json");
        self.manifest.write_json(&path)?;
        Ok(path)
    }

    /// Advance through the input list until an image loads or the list
    /// runs out. Unloadable entries are skipped with a warning.
    fn advance_until_loaded(&mut self) {
        while self.session.advance() {
            let path = self
                .session
                .current_entry()
                .map(|e| e.path.clone())
                .unwrap_or_default();
            match self.session.load_current() {
                Ok(()) => {
                    log::info!("annotating {}", path.display());
                    return;
                }
                Err(err) => {
                    log::warn!("skipping {}: {}", path.display(), err);
                }
            }
        }
        log::info!("all images processed");
    }

    fn next_output_path(&self) -> PathBuf {
        let source = self
            .session
            .current_entry()
            .map(|e| e.path.clone())
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let ext = source
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("png");

        let name = if self.num_saved > 0 {
            format!("{stem}_flat_{}.{ext}", self.num_saved)
        } else {
            format!("{stem}_flat.{ext}")
        };
        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::input::InputEntry;
    use image::{Rgba, RgbaImage};

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        img.save(&path).unwrap();
        path
    }

    fn input_for(paths: Vec<PathBuf>) -> InputSpec {
        InputSpec {
            entries: paths
                .into_iter()
                .map(|path| InputEntry {
                    path,
                    hints: Vec::new(),
                })
                .collect(),
        }
    }

    fn click_square(flattener: &mut PanelFlattener) {
        flattener.record_click(Point::new(10.0, 10.0));
        flattener.record_click(Point::new(110.0, 10.0));
        flattener.record_click(Point::new(110.0, 60.0));
        flattener.record_click(Point::new(10.0, 60.0));
    }

    #[test]
    fn test_end_to_end_two_image_run() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_test_image(dir.path(), "a.png", 200, 100);
        let b = write_test_image(dir.path(), "b.png", 200, 100);
        let out_dir = dir.path().join("out");

        let mut flattener = PanelFlattener::new(input_for(vec![a, b]), out_dir.clone());
        flattener.start();
        assert_eq!(flattener.session().state(), SessionState::CollectingCorners);

        click_square(&mut flattener);
        assert_eq!(flattener.session().state(), SessionState::AwaitingDimensions);
        flattener.supply_dimensions(50.0, 100.0).unwrap();

        let saved = flattener.save().unwrap().unwrap();
        assert_eq!(saved, out_dir.join("a_flat.png"));
        let flat = image::open(&saved).unwrap();
        assert_eq!(flat.width(), 50);
        assert_eq!(flat.height(), 100);

        // Second image gets no clicks; run just ends.
        flattener.next_image();
        assert_eq!(flattener.session().state(), SessionState::CollectingCorners);
        flattener.next_image();
        assert_eq!(flattener.session().state(), SessionState::Done);

        let manifest_path = flattener.finish().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
        let expected_key = out_dir.join("a_flat.png").display().to_string();
        assert_eq!(json[expected_key.as_str()], serde_json::json!([50.0, 100.0]));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_saves_increment_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_test_image(dir.path(), "a.png", 200, 100);
        let out_dir = dir.path().join("out");

        let mut flattener = PanelFlattener::new(input_for(vec![a]), out_dir.clone());
        flattener.start();

        // First flatten-and-save, then annotate the same image again
        // (save reloads it) and save a second panel.
        click_square(&mut flattener);
        flattener.supply_dimensions(50.0, 100.0).unwrap();
        let first = flattener.save().unwrap().unwrap();

        click_square(&mut flattener);
        flattener.reuse_last_dimensions().unwrap();
        let second = flattener.save().unwrap().unwrap();

        assert_eq!(first, out_dir.join("a_flat.png"));
        assert_eq!(second, out_dir.join("a_flat_1.png"));
        assert_eq!(flattener.manifest().len(), 2);
        // Both entries carry the same sticky dimensions.
        for (_, dims) in flattener.manifest().entries() {
            assert_eq!(dims.as_array(), [50.0, 100.0]);
        }
    }

    #[test]
    fn test_suffix_counter_resets_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_test_image(dir.path(), "a.png", 200, 100);
        let b = write_test_image(dir.path(), "b.png", 200, 100);
        let out_dir = dir.path().join("out");

        let mut flattener = PanelFlattener::new(input_for(vec![a, b]), out_dir.clone());
        flattener.start();

        click_square(&mut flattener);
        flattener.supply_dimensions(50.0, 100.0).unwrap();
        flattener.save().unwrap();

        flattener.next_image();
        click_square(&mut flattener);
        flattener.reuse_last_dimensions().unwrap();
        let saved = flattener.save().unwrap().unwrap();
        assert_eq!(saved, out_dir.join("b_flat.png"));
    }

    #[test]
    fn test_save_outside_flattened_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_test_image(dir.path(), "a.png", 200, 100);
        let out_dir = dir.path().join("out");

        let mut flattener = PanelFlattener::new(input_for(vec![a]), out_dir);
        flattener.start();

        assert!(flattener.save().unwrap().is_none());
        flattener.record_click(Point::new(10.0, 10.0));
        assert!(flattener.save().unwrap().is_none());
        assert!(flattener.manifest().is_empty());
    }

    #[test]
    fn test_missing_source_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        let b = write_test_image(dir.path(), "b.png", 200, 100);
        let out_dir = dir.path().join("out");

        let mut flattener = PanelFlattener::new(input_for(vec![missing, b.clone()]), out_dir);
        flattener.start();

        // The missing first entry is skipped and the run lands on b.png.
        assert_eq!(flattener.session().state(), SessionState::CollectingCorners);
        assert_eq!(flattener.session().current_entry().unwrap().path, b);
    }

    #[test]
    fn test_empty_manifest_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");

        let flattener = PanelFlattener::new(InputSpec::default(), out_dir.clone());
        let manifest_path = flattener.finish().unwrap();
        assert_eq!(manifest_path, out_dir.join("result.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
