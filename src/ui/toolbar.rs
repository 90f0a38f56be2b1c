// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the Reload / Save / Next buttons and a status line.

use crate::core::session::{AnnotationSession, SessionState};

/// Result of a toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Reload,
    Save,
    Next,
}

/// Display the toolbar. `saved_total` is the number of manifest entries
/// so far.
pub fn show(ui: &mut egui::Ui, session: &AnnotationSession, saved_total: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let running = session.state() != SessionState::Done;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(running, egui::Button::new("Reload")).clicked() {
            action = ToolbarAction::Reload;
        }
        let can_save = session.state() == SessionState::Flattened;
        if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
            action = ToolbarAction::Save;
        }
        if ui.add_enabled(running, egui::Button::new("Next")).clicked() {
            action = ToolbarAction::Next;
        }

        ui.separator();

        let (current, total) = session.progress();
        if let Some(entry) = session.current_entry() {
            let name = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.path.display().to_string());
            ui.label(format!("{name}  ({current}/{total})"));
        } else {
            ui.label(format!("({current}/{total})"));
        }

        ui.separator();
        ui.label(format!("{saved_total} saved"));

        ui.separator();
        let state_text = match session.state() {
            SessionState::Idle => "Loading...",
            SessionState::CollectingCorners => "Click the four panel corners in order",
            SessionState::AwaitingDimensions => "Enter the panel dimensions",
            SessionState::Flattened => "Flattened - Save, or Reload to retry",
            SessionState::Done => "All images processed",
        };
        ui.label(egui::RichText::new(state_text).italics().weak());
    });

    action
}
