// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! This module provides the side panel with the comment for the current
//! frame and a browser for saved annotations, including their metadata
//! and a preview of the marked crop.

use crate::io::serialization::MetadataDocument;

/// Result of properties panel interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    SelectSaved(String),
    DeleteSaved(String),
    Refresh,
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    comment: &mut String,
    saved: &MetadataDocument,
    selected: Option<&str>,
    preview: &Option<egui::TextureHandle>,
    busy: bool,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Comment");
    ui.add(
        egui::TextEdit::multiline(comment)
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .hint_text("Optional note for this annotation..."),
    );

    ui.separator();

    ui.horizontal(|ui| {
        ui.heading("Saved");
        ui.label(format!("({})", saved.len()));
        if ui.small_button("⟳").on_hover_text("Reload").clicked() {
            action = PropertiesAction::Refresh;
        }
    });

    egui::ScrollArea::vertical()
        .id_source("saved_annotations")
        .max_height(220.0)
        .show(ui, |ui| {
            if saved.is_empty() {
                ui.label(egui::RichText::new("No saved annotations").weak());
            }
            for image_id in saved.keys() {
                let is_selected = selected == Some(image_id.as_str());
                if ui.selectable_label(is_selected, image_id).clicked() {
                    action = PropertiesAction::SelectSaved(image_id.clone());
                }
            }
        });

    let Some(record) = selected.and_then(|id| saved.get(id)) else {
        return action;
    };

    ui.separator();
    egui::Grid::new("saved_details")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Source:");
            ui.label(&record.source_video);
            ui.end_row();
            ui.label("Frame:");
            ui.label(record.frame_number.to_string());
            ui.end_row();
            ui.label("ROI:");
            ui.label(format!("{:?}", record.roi_coords));
            ui.end_row();
            ui.label("Points:");
            ui.label(format!(
                "{} remove, {} keep",
                record.remove_count, record.keep_count
            ));
            ui.end_row();
            ui.label("Saved:");
            ui.label(&record.created_at);
            ui.end_row();
            if !record.comment.is_empty() {
                ui.label("Comment:");
                ui.label(&record.comment);
                ui.end_row();
            }
        });

    if let Some(texture) = preview {
        ui.add(
            egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                .max_width(ui.available_width())
                .max_height(240.0),
        );
    }

    if ui
        .add_enabled(!busy, egui::Button::new("🗑 Delete annotation"))
        .clicked()
    {
        action = PropertiesAction::DeleteSaved(record.image_id.clone());
    }

    action
}
