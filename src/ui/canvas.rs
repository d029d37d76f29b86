// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation canvas.
//!
//! This module draws the current frame fitted to the available space,
//! overlays the ROI and the marked points, and reports pointer events
//! in viewport coordinates for the session to interpret.

use crate::models::annotation::{Category, PointerButton, MARKER_RADIUS};
use crate::models::roi::RoiState;
use crate::models::session::AnnotationSession;
use crate::util::geometry::{ViewTransform, ViewportPoint, ViewportRect};

const ROI_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0xBF, 0xFF);

/// Pointer events on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    Press(PointerButton, ViewportPoint),
    Drag(ViewportPoint),
    Release(PointerButton),
}

const BUTTONS: [(egui::PointerButton, PointerButton); 2] = [
    (egui::PointerButton::Primary, PointerButton::Primary),
    (egui::PointerButton::Secondary, PointerButton::Secondary),
];

/// Display the canvas and collect pointer events.
///
/// Returns the transform used for this pass along with the events, so
/// they are interpreted against the same geometry they were drawn with.
pub fn show(
    ui: &mut egui::Ui,
    session: &AnnotationSession,
    texture: &Option<egui::TextureHandle>,
) -> (Option<ViewTransform>, Vec<CanvasAction>) {
    let mut actions = Vec::new();
    let mut transform = None;

    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(45);
    let available_size = ui.available_size() - egui::vec2(0.0, 24.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        let (response, painter) =
            ui.allocate_painter(available_size.max(egui::Vec2::ZERO), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        // Recomputed every pass, the canvas may have been resized
        let (Some(texture), Some(t)) = (
            texture,
            session.transform((canvas_rect.width(), canvas_rect.height())),
        ) else {
            show_welcome(&painter, canvas_rect);
            return;
        };

        let origin = canvas_rect.min;
        let (display_w, display_h) = t.display_size();
        let image_rect = egui::Rect::from_min_size(
            origin + egui::vec2(t.offset().x, t.offset().y),
            egui::vec2(display_w, display_h),
        );

        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        draw_roi(&painter, session.roi_state(), &t, origin);
        draw_points(&painter, session, &t, origin);

        // Presses only count when they land on the canvas itself, not on a
        // dialog or menu layered above it
        let pointer = ui.input(|i| i.pointer.clone());
        if let Some(pos) = pointer.interact_pos() {
            let on_top = ui
                .ctx()
                .layer_id_at(pos)
                .map_or(true, |layer| layer == ui.layer_id());
            if response.contains_pointer() && on_top {
                for (egui_button, button) in BUTTONS {
                    if pointer.button_pressed(egui_button) {
                        actions.push(CanvasAction::Press(button, to_viewport(pos, origin)));
                    }
                }
            }
        }
        if session.roi_state().is_drawing() {
            if let Some(pos) = pointer.latest_pos() {
                actions.push(CanvasAction::Drag(to_viewport(pos, origin)));
            }
            for (egui_button, button) in BUTTONS {
                if pointer.button_released(egui_button) {
                    actions.push(CanvasAction::Release(button));
                }
            }
        }

        transform = Some(t);
    });

    // Status line
    ui.horizontal(|ui| match (session.image_id(), transform) {
        (Some(image_id), Some(t)) => {
            ui.label(image_id);
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", t.scale() * 100.0));
            ui.separator();
            let hint = match session.roi_state() {
                RoiState::Empty => "Drag with the left button to draw a ROI",
                RoiState::Drawing { .. } => "Release to finish the ROI",
                RoiState::Committed(_) => {
                    "Inside the ROI: left click = remove, right click = keep"
                }
            };
            ui.label(egui::RichText::new(hint).italics().weak());
        }
        _ => {
            ui.label("Waiting for a frame");
        }
    });

    (transform, actions)
}

fn to_viewport(pos: egui::Pos2, origin: egui::Pos2) -> ViewportPoint {
    ViewportPoint::new(pos.x - origin.x, pos.y - origin.y)
}

fn to_screen(point: ViewportPoint, origin: egui::Pos2) -> egui::Pos2 {
    origin + egui::vec2(point.x, point.y)
}

fn screen_rect(rect: ViewportRect, origin: egui::Pos2) -> egui::Rect {
    egui::Rect::from_min_size(
        to_screen(ViewportPoint::new(rect.x, rect.y), origin),
        egui::vec2(rect.w, rect.h),
    )
}

/// Draw the committed ROI solid and the one being dragged dashed.
fn draw_roi(painter: &egui::Painter, state: &RoiState, t: &ViewTransform, origin: egui::Pos2) {
    let stroke = egui::Stroke::new(2.0, ROI_COLOR);
    match state {
        RoiState::Committed(roi) => {
            let rect = screen_rect(t.rect_to_viewport(roi), origin);
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgba_unmultiplied(0, 191, 255, 30));
            painter.rect_stroke(rect, 0.0, stroke);
        }
        RoiState::Drawing { .. } => {
            if let Some(roi) = state.provisional() {
                let rect = screen_rect(t.rect_to_viewport(&roi), origin);
                let corners = [
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                    rect.left_top(),
                ];
                painter.extend(egui::Shape::dashed_line(&corners, stroke, 6.0, 4.0));
            }
        }
        RoiState::Empty => {}
    }
}

fn draw_points(
    painter: &egui::Painter,
    session: &AnnotationSession,
    t: &ViewTransform,
    origin: egui::Pos2,
) {
    let radius = MARKER_RADIUS as f32;
    for point in session.points().points() {
        let center = to_screen(t.to_viewport(point.position), origin);
        let style = point.category.marker_style();
        let [r, g, b] = style.fill;

        painter.circle_filled(center, radius, egui::Color32::from_rgb(r, g, b));
        painter.circle_stroke(center, radius, egui::Stroke::new(2.0, egui::Color32::BLACK));

        let text_color = match point.category {
            Category::Remove => egui::Color32::WHITE,
            Category::Keep => egui::Color32::BLACK,
        };
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            style.glyph_text,
            egui::FontId::proportional(11.0),
            text_color,
        );
    }
}

fn show_welcome(painter: &egui::Painter, rect: egui::Rect) {
    let center = rect.center();
    painter.text(
        center - egui::vec2(0.0, 30.0),
        egui::Align2::CENTER_CENTER,
        "ROI Annotator",
        egui::FontId::proportional(32.0),
        egui::Color32::from_gray(200),
    );
    painter.text(
        center + egui::vec2(0.0, 10.0),
        egui::Align2::CENTER_CENTER,
        "Open an image or a folder of frames to begin annotating",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(180),
    );
    painter.text(
        center + egui::vec2(0.0, 34.0),
        egui::Align2::CENTER_CENTER,
        "File → Open Image... / Open Frame Folder...",
        egui::FontId::proportional(12.0),
        egui::Color32::from_gray(130),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Frame;
    use image::RgbImage;

    const SCREEN: egui::Vec2 = egui::vec2(800.0, 600.0);

    fn loaded_session(ctx: &egui::Context) -> (AnnotationSession, Option<egui::TextureHandle>) {
        let mut session = AnnotationSession::new();
        session.set_image(Frame {
            image: RgbImage::new(400, 300),
            source_video: "clip".to_string(),
            frame_number: 0,
        });
        let texture = ctx.load_texture(
            "frame",
            egui::ColorImage::new([400, 300], egui::Color32::GRAY),
            egui::TextureOptions::default(),
        );
        (session, Some(texture))
    }

    fn button_event(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Click once at `pos` over a few frames, optionally with a modal
    /// window centred over the canvas. Returns the canvas actions and
    /// whether the window's button saw the click.
    fn click(with_dialog: bool, pos: egui::Pos2) -> (Vec<CanvasAction>, bool) {
        let ctx = egui::Context::default();
        let (session, texture) = loaded_session(&ctx);
        let frames = vec![
            vec![],
            vec![egui::Event::PointerMoved(pos)],
            vec![button_event(pos, true)],
            vec![button_event(pos, false)],
            vec![],
        ];

        let mut actions = Vec::new();
        let mut dialog_clicked = false;
        for events in frames {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, SCREEN)),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    let (_, frame_actions) = show(ui, &session, &texture);
                    actions.extend(frame_actions);
                });
                if with_dialog {
                    egui::Window::new("Delete annotation")
                        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                        .collapsible(false)
                        .resizable(false)
                        .show(ctx, |ui| {
                            if ui
                                .add_sized([200.0, 120.0], egui::Button::new("Cancel"))
                                .clicked()
                            {
                                dialog_clicked = true;
                            }
                        });
                }
            });
        }
        (actions, dialog_clicked)
    }

    #[test]
    fn test_press_on_canvas_is_reported() {
        let (actions, _) = click(false, egui::pos2(400.0, 300.0));
        assert!(
            actions
                .iter()
                .any(|a| matches!(a, CanvasAction::Press(PointerButton::Primary, _))),
            "{:?}",
            actions
        );
    }

    #[test]
    fn test_click_on_dialog_does_not_reach_canvas() {
        let (actions, dialog_clicked) = click(true, egui::pos2(400.0, 300.0));
        assert!(dialog_clicked);
        assert!(actions.is_empty(), "{:?}", actions);
    }
}
