// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Modal dimension prompt.
//!
//! Opens as soon as the fourth corner is clicked. Parsing happens here so
//! non-numeric input never reaches the core; the prompt stays open until
//! valid dimensions are accepted or the sticky dimensions are reused.

/// What the dialog produced this frame.
pub enum DialogAction {
    None,
    /// Done pressed with two parseable numbers (cm).
    Submit { short_cm: f64, long_cm: f64 },
    /// Use Last pressed.
    UseLast,
}

/// State of the open dimension prompt.
pub struct DimsDialog {
    short_input: String,
    long_input: String,
    error: Option<String>,
}

impl DimsDialog {
    pub fn new() -> Self {
        Self {
            short_input: String::new(),
            long_input: String::new(),
            error: None,
        }
    }

    /// Show a validation error from the core and keep prompting.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Render the dialog. `can_use_last` controls the Use Last button.
    pub fn show(&mut self, ctx: &egui::Context, can_use_last: bool) -> DialogAction {
        let mut action = DialogAction::None;

        egui::Window::new("Need dimensions")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Shorter side (cm)");
                ui.text_edit_singleline(&mut self.short_input);
                ui.label("Longer side (cm)");
                ui.text_edit_singleline(&mut self.long_input);

                if let Some(ref error) = self.error {
                    ui.colored_label(egui::Color32::LIGHT_RED, error.as_str());
                }

                ui.horizontal(|ui| {
                    if ui.button("Done").clicked() {
                        match (
                            self.short_input.trim().parse::<f64>(),
                            self.long_input.trim().parse::<f64>(),
                        ) {
                            (Ok(short_cm), Ok(long_cm)) => {
                                action = DialogAction::Submit { short_cm, long_cm };
                            }
                            _ => {
                                self.error = Some("That's not a number.".to_string());
                            }
                        }
                    }
                    if can_use_last && ui.button("Use Last").clicked() {
                        action = DialogAction::UseLast;
                    }
                });
            });

        action
    }
}

impl Default for DimsDialog {
    fn default() -> Self {
        Self::new()
    }
}
