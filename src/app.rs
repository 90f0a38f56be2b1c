// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Translates UI events (canvas clicks, toolbar buttons, the dimension
//! dialog) into core operations on the [`PanelFlattener`] and keeps the
//! displayed texture in sync with the session's working image. The save
//! manifest is flushed once, when the window closes.

use crate::core::flattener::PanelFlattener;
use crate::core::session::{ClickOutcome, SessionState};
use crate::error::FlattenError;
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::dims_dialog::{DialogAction, DimsDialog};
use crate::ui::toolbar::{self, ToolbarAction};

/// Main application state.
pub struct FlattenerApp {
    flattener: PanelFlattener,

    /// On-screen marker radius for hint and corner dots.
    dot_radius: f32,

    /// Texture of the current working image.
    image_texture: Option<egui::TextureHandle>,

    /// Session revision the texture was built from.
    texture_revision: Option<u64>,

    /// Open dimension prompt, if any.
    dialog: Option<DimsDialog>,

    /// Transient status/error line under the toolbar.
    status: Option<String>,
}

impl FlattenerApp {
    /// Wrap an already-started flattener. `dot_size` is the marker radius
    /// in pixels from the command line.
    pub fn new(flattener: PanelFlattener, dot_size: u32) -> Self {
        Self {
            flattener,
            dot_radius: dot_size as f32,
            image_texture: None,
            texture_revision: None,
            dialog: None,
            status: None,
        }
    }

    /// Re-upload the texture when the working image changed.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let revision = self.flattener.session().revision();
        if self.texture_revision == Some(revision) {
            return;
        }
        self.texture_revision = Some(revision);

        match self.flattener.session().working_image() {
            Some(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                self.image_texture =
                    Some(ctx.load_texture("panel_image", color_image, egui::TextureOptions::LINEAR));
            }
            None => {
                self.image_texture = None;
            }
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Reload => {
                self.flattener.reload();
                self.dialog = None;
                self.status = None;
                log::info!("reloaded current image");
            }
            ToolbarAction::Save => match self.flattener.save() {
                Ok(Some(path)) => {
                    self.status = Some(format!("Saved {}", path.display()));
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("save failed: {err}");
                    self.status = Some(format!("Save failed: {err}"));
                }
            },
            ToolbarAction::Next => {
                self.flattener.next_image();
                self.dialog = None;
                self.status = None;
            }
            ToolbarAction::None => {}
        }
    }

    fn handle_dialog(&mut self, action: DialogAction) {
        let result = match action {
            DialogAction::Submit { short_cm, long_cm } => {
                self.flattener.supply_dimensions(short_cm, long_cm)
            }
            DialogAction::UseLast => self.flattener.reuse_last_dimensions(),
            DialogAction::None => return,
        };

        match result {
            Ok(()) => {
                self.dialog = None;
                self.status = None;
            }
            Err(err @ FlattenError::DegenerateGeometry) => {
                // Session rolled back to corner collection; let the user
                // re-click.
                self.dialog = None;
                self.status = Some(err.to_string());
                log::warn!("{err}");
            }
            Err(err) => {
                // Bad dimensions (or no history): keep prompting.
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.set_error(err.to_string());
                }
            }
        }
    }
}

impl eframe::App for FlattenerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Toolbar
        let saved_total = self.flattener.manifest().len();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                let action = toolbar::show(ui, self.flattener.session(), saved_total);
                if let Some(ref status) = self.status {
                    ui.label(egui::RichText::new(status.as_str()).color(egui::Color32::LIGHT_YELLOW));
                }
                action
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        // Texture follows whatever the toolbar action did to the session
        self.sync_texture(ctx);

        // Main canvas (center)
        let session = self.flattener.session();
        let image_size = session.working_image().map(|img| img.dimensions());
        let hints = if session.is_flattened() {
            // Hints belong to the source image, not the flattened result
            &[][..]
        } else {
            session.hints()
        };
        let accept_clicks =
            session.state() == SessionState::CollectingCorners && self.dialog.is_none();
        let empty_message = if session.state() == SessionState::Done {
            "All images processed - close the window to write result.json"
        } else {
            "Loading images..."
        };

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &self.image_texture,
                    image_size,
                    session.clicks(),
                    hints,
                    self.dot_radius,
                    accept_clicks,
                    empty_message,
                )
            })
            .inner;

        if let CanvasAction::Click(point) = canvas_action {
            match self.flattener.record_click(point) {
                ClickOutcome::CornersComplete => {
                    // The fourth click opens the dimension prompt
                    self.dialog = Some(DimsDialog::new());
                }
                ClickOutcome::Recorded => {
                    log::debug!("corner at ({:.1}, {:.1})", point.x, point.y);
                }
                ClickOutcome::Ignored => {}
            }
        }

        // Modal dimension prompt
        let can_use_last = self.flattener.session().last_dims().is_some();
        let dialog_action = match self.dialog.as_mut() {
            Some(dialog) => dialog.show(ctx, can_use_last),
            None => DialogAction::None,
        };
        self.handle_dialog(dialog_action);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        match self.flattener.finish() {
            Ok(path) => log::info!("wrote manifest to {}", path.display()),
            Err(err) => log::error!("failed to write manifest: {err}"),
        }
    }
}
