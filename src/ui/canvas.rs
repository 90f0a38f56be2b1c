// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and corner clicking.
//!
//! Shows the working image scaled-to-fit and centered, overlays hint dots
//! (blue) and clicked corner dots (red), and maps clicks back into source
//! image pixel coordinates.

use crate::models::geometry::{DisplayRect, Point};

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// A click inside the image, in image pixel coordinates.
    Click(Point),
}

/// Display the canvas area and handle mouse interactions.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    image_texture: &Option<egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    clicks: &[Point],
    hints: &[Point],
    dot_radius: f32,
    accept_clicks: bool,
    empty_message: &str,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some((img_width, img_height))) = (image_texture, image_size) else {
            // No image loaded: welcome / completion message
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("PanelFlat")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new(empty_message)
                            .size(14.0)
                            .color(egui::Color32::from_gray(160)),
                    );
                });
            });
            return;
        };

        let available = ui.available_size();
        let min = ui.min_rect().min;
        let display = DisplayRect::fit(
            min.x,
            min.y,
            available.x,
            available.y,
            img_width,
            img_height,
        );
        let image_rect = egui::Rect::from_min_size(
            egui::pos2(display.min_x, display.min_y),
            egui::vec2(display.width, display.height),
        );

        // Draw the image
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Handle corner clicks
        if accept_clicks {
            let response = ui.allocate_rect(image_rect, egui::Sense::click());
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if let Some(point) =
                        display.screen_to_image(pos.x, pos.y, img_width, img_height)
                    {
                        action = CanvasAction::Click(point);
                    }
                }
            }
        }

        // Dots on top of the image: hints in blue, clicked corners in red
        let painter = ui.painter();
        for hint in hints {
            draw_dot(
                painter,
                &display,
                *hint,
                img_width,
                img_height,
                dot_radius,
                egui::Color32::from_rgb(60, 120, 255),
            );
        }
        for click in clicks {
            draw_dot(
                painter,
                &display,
                *click,
                img_width,
                img_height,
                dot_radius,
                egui::Color32::RED,
            );
        }
    });

    action
}

fn draw_dot(
    painter: &egui::Painter,
    display: &DisplayRect,
    point: Point,
    img_width: u32,
    img_height: u32,
    radius: f32,
    color: egui::Color32,
) {
    let (sx, sy) = display.image_to_screen(point, img_width, img_height);
    let center = egui::pos2(sx, sy);
    painter.circle_filled(center, radius, color);
    painter.circle_stroke(center, radius, egui::Stroke::new(1.0, egui::Color32::BLACK));
}
