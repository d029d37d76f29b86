// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame stepper.
//!
//! This module provides the control for moving through the frames of the
//! open source and sending one of them to the canvas.

/// Result of timeline interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineAction {
    None,
    LoadFrame(usize),
}

/// Display the frame stepper. `cursor` is the frame selected on the slider.
pub fn show(
    ui: &mut egui::Ui,
    label: &str,
    frame_count: usize,
    cursor: &mut usize,
    enabled: bool,
) -> TimelineAction {
    let mut action = TimelineAction::None;
    let last = frame_count.saturating_sub(1);
    *cursor = (*cursor).min(last);

    ui.add_enabled_ui(enabled, |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(label).strong());
            ui.separator();

            if ui.add_enabled(*cursor > 0, egui::Button::new("◀")).clicked() {
                *cursor -= 1;
                action = TimelineAction::LoadFrame(*cursor);
            }

            ui.add(egui::Slider::new(&mut *cursor, 0..=last).text(format!("/ {}", last)));

            if ui.add_enabled(*cursor < last, egui::Button::new("▶")).clicked() {
                *cursor += 1;
                action = TimelineAction::LoadFrame(*cursor);
            }

            if ui.button("Send to canvas").clicked() {
                action = TimelineAction::LoadFrame(*cursor);
            }
        });
    });

    action
}
