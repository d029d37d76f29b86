// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with annotation commands.
//!
//! This module provides the row of buttons for undoing points, resetting
//! the ROI, clearing the frame and saving, plus the point counters.

use crate::models::session::AnnotationSession;

/// Command requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    UndoPoint,
    ResetRoi,
    ClearAll,
    Save,
}

/// Display the toolbar. `busy` disables saving while a save is in flight.
pub fn show(ui: &mut egui::Ui, session: &AnnotationSession, busy: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_frame = session.frame().is_some();
    let has_roi = session.roi().is_some();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui
            .add_enabled(!session.points().is_empty(), egui::Button::new("↶ Undo point"))
            .on_hover_text("Ctrl+Z")
            .clicked()
        {
            action = ToolbarAction::UndoPoint;
        }

        if ui
            .add_enabled(has_frame, egui::Button::new("Redraw ROI"))
            .clicked()
        {
            action = ToolbarAction::ResetRoi;
        }

        if ui
            .add_enabled(has_frame, egui::Button::new("✕ Clear all"))
            .on_hover_text("Esc")
            .clicked()
        {
            action = ToolbarAction::ClearAll;
        }

        ui.separator();

        let save = egui::Button::new(egui::RichText::new("💾 Save annotation").strong())
            .fill(egui::Color32::from_rgb(0x28, 0xA7, 0x45));
        if ui
            .add_enabled(has_frame && has_roi && !busy, save)
            .on_hover_text("Ctrl+S")
            .clicked()
        {
            action = ToolbarAction::Save;
        }

        ui.separator();

        let (remove, keep) = session.counts();
        ui.colored_label(
            egui::Color32::from_rgb(0xFF, 0x44, 0x44),
            format!("Remove: {}", remove),
        );
        ui.colored_label(
            egui::Color32::from_rgb(0x44, 0xFF, 0x44),
            format!("Keep: {}", keep),
        );
    });

    action
}
