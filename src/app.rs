// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the annotation session, forwards canvas
//! and toolbar events to it, and runs frame decoding and repository
//! writes on background threads.

use crate::config::AppConfig;
use crate::error::AnnotationError;
use crate::io::media::{self, FrameSource, IMAGE_EXTENSIONS};
use crate::io::repository::AnnotationRepository;
use crate::io::serialization::MetadataDocument;
use crate::models::session::{AnnotationSession, Frame, SaveRequest};
use crate::ui::canvas::CanvasAction;
use crate::ui::properties::PropertiesAction;
use crate::ui::timeline::TimelineAction;
use crate::ui::toolbar::ToolbarAction;
use crate::ui::{canvas, properties, timeline, toolbar};
use crate::util::geometry::ViewTransform;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// What a background channel yielded this frame.
enum Polled<T> {
    Pending,
    Ready(T),
    /// The worker went away without sending, e.g. it panicked
    Lost,
}

/// Take the result of a background job, clearing `slot` once the job is
/// finished or its worker is gone.
fn poll_job<T>(slot: &mut Option<Receiver<T>>) -> Polled<T> {
    let Some(receiver) = slot else {
        return Polled::Pending;
    };
    match receiver.try_recv() {
        Ok(value) => {
            *slot = None;
            Polled::Ready(value)
        }
        Err(TryRecvError::Empty) => Polled::Pending,
        Err(TryRecvError::Disconnected) => {
            *slot = None;
            Polled::Lost
        }
    }
}

/// Result of a background repository operation.
enum RepoOutcome {
    Saved(String),
    /// The id already exists; holds the request until the user decides
    Conflict(SaveRequest),
    Deleted(String),
    Failed(AnnotationError),
}

/// Severity of the status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    fn color(&self) -> egui::Color32 {
        match self {
            StatusKind::Info => egui::Color32::from_rgb(0x00, 0x78, 0xD4),
            StatusKind::Success => egui::Color32::from_rgb(0x28, 0xA7, 0x45),
            StatusKind::Warning => egui::Color32::from_rgb(0xFF, 0xC1, 0x07),
            StatusKind::Error => egui::Color32::from_rgb(0xDC, 0x35, 0x45),
        }
    }
}

/// Main application state.
pub struct AnnotatorApp {
    config: AppConfig,
    config_path: PathBuf,

    /// Editing state for the frame on the canvas
    session: AnnotationSession,

    /// Texture of the current frame
    frame_texture: Option<egui::TextureHandle>,

    /// Where frames come from
    source: Option<Arc<dyn FrameSource>>,

    /// Frame selected on the timeline
    frame_cursor: usize,

    /// Annotation storage; `None` if the output directory is unusable
    repository: Option<AnnotationRepository>,

    /// Saved records shown in the properties panel
    saved: MetadataDocument,
    selected_saved: Option<String>,
    preview_texture: Option<egui::TextureHandle>,

    /// Receiver for background frame decoding
    frame_loader: Option<Receiver<Result<Frame, String>>>,

    /// Receiver for the save or delete in flight
    repo_job: Option<Receiver<RepoOutcome>>,

    /// Save waiting for overwrite confirmation
    pending_overwrite: Option<SaveRequest>,

    /// Delete waiting for confirmation
    pending_delete: Option<String>,

    loading_message: Option<String>,
    status: Option<(StatusKind, String)>,
}

impl AnnotatorApp {
    /// Create the application with the given configuration.
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        let repository = match AnnotationRepository::open(&config.output_dir) {
            Ok(repo) => Some(repo),
            Err(e) => {
                log::error!("Cannot use output directory: {}", e);
                None
            }
        };

        let mut app = Self {
            config,
            config_path,
            session: AnnotationSession::new(),
            frame_texture: None,
            source: None,
            frame_cursor: 0,
            repository,
            saved: MetadataDocument::new(),
            selected_saved: None,
            preview_texture: None,
            frame_loader: None,
            repo_job: None,
            pending_overwrite: None,
            pending_delete: None,
            loading_message: None,
            status: None,
        };
        app.refresh_saved();
        app
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some((kind, text.into()));
    }

    /// A save or delete is running or waiting for the user.
    fn repo_busy(&self) -> bool {
        self.repo_job.is_some() || self.pending_overwrite.is_some() || self.pending_delete.is_some()
    }

    fn refresh_saved(&mut self) {
        let Some(ref repo) = self.repository else {
            return;
        };
        match repo.load_all() {
            Ok(saved) => {
                if let Some(ref id) = self.selected_saved {
                    if !saved.contains_key(id) {
                        self.selected_saved = None;
                        self.preview_texture = None;
                    }
                }
                self.saved = saved;
            }
            Err(e) => {
                log::error!("Failed to load annotations: {}", e);
                self.set_status(StatusKind::Error, e.to_string());
            }
        }
    }

    /// Open a file or directory as the frame source and load its first frame.
    fn open_media(&mut self, path: PathBuf) {
        match media::open_source(&path) {
            Ok(source) => {
                log::info!("Opened {} ({} frames)", source.label(), source.frame_count());
                self.source = Some(Arc::from(source));
                self.frame_cursor = 0;

                let dir = if path.is_dir() { Some(path.as_path()) } else { path.parent() };
                if let Some(dir) = dir {
                    self.config.last_media_dir = Some(dir.to_path_buf());
                    self.config.save(&self.config_path);
                }
                self.load_frame(0);
            }
            Err(e) => {
                log::error!("Failed to open {}: {:#}", path.display(), e);
                self.set_status(StatusKind::Error, format!("{:#}", e));
            }
        }
    }

    /// Decode a frame of the current source (asynchronously).
    fn load_frame(&mut self, index: usize) {
        if self.repo_busy() {
            self.set_status(StatusKind::Warning, "Wait for the save to finish");
            return;
        }
        let Some(source) = self.source.clone() else {
            return;
        };

        let (sender, receiver) = channel();
        self.frame_loader = Some(receiver);
        self.loading_message = Some(format!("Loading frame {}...", index));

        std::thread::spawn(move || {
            let result = source.frame(index).map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    fn save(&mut self) {
        if self.repo_busy() {
            return;
        }
        let request = match self
            .session
            .build_save_request(chrono::Local::now().to_rfc3339())
        {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Save refused: {}", e);
                self.set_status(StatusKind::Warning, e.to_string());
                return;
            }
        };
        self.spawn_save(request, false);
    }

    fn spawn_save(&mut self, request: SaveRequest, overwrite: bool) {
        let Some(ref repo) = self.repository else {
            self.set_status(StatusKind::Error, "No usable output directory");
            return;
        };

        let (sender, receiver) = channel();
        self.repo_job = Some(receiver);

        let repo = repo.clone();
        std::thread::spawn(move || {
            let image_id = request.record.image_id.clone();
            let outcome = match repo.save_checked(
                &request.record,
                &request.raw_image,
                &request.marked_image,
                overwrite,
            ) {
                Ok(()) => RepoOutcome::Saved(image_id),
                Err(e) if e.needs_confirmation() => RepoOutcome::Conflict(request),
                Err(e) => RepoOutcome::Failed(e),
            };
            let _ = sender.send(outcome);
        });
    }

    fn spawn_delete(&mut self, image_id: String) {
        let Some(ref repo) = self.repository else {
            return;
        };

        let (sender, receiver) = channel();
        self.repo_job = Some(receiver);

        let repo = repo.clone();
        std::thread::spawn(move || {
            let outcome = match repo.delete(&image_id) {
                Ok(()) => RepoOutcome::Deleted(image_id),
                Err(e) => RepoOutcome::Failed(e),
            };
            let _ = sender.send(outcome);
        });
    }

    fn select_saved(&mut self, image_id: String, ctx: &egui::Context) {
        self.preview_texture = None;
        if let Some(ref repo) = self.repository {
            let (_, marked_path) = repo.artifact_paths(&image_id);
            match media::load_image(&marked_path) {
                Ok(image) => {
                    let size = [image.width() as usize, image.height() as usize];
                    let color_image = egui::ColorImage::from_rgb(size, image.as_raw());
                    self.preview_texture = Some(ctx.load_texture(
                        "saved_preview",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                Err(e) => log::warn!("No preview for {}: {:#}", image_id, e),
            }
        }
        self.selected_saved = Some(image_id);
    }

    /// Collect finished background work.
    fn poll_background(&mut self, ctx: &egui::Context) {
        match poll_job(&mut self.frame_loader) {
            Polled::Ready(result) => {
                self.loading_message = None;

                match result {
                    Ok(frame) => {
                        let (width, height) = frame.size();
                        let color_image = egui::ColorImage::from_rgb(
                            [width as usize, height as usize],
                            frame.image.as_raw(),
                        );
                        self.frame_texture = Some(ctx.load_texture(
                            "frame",
                            color_image,
                            egui::TextureOptions::LINEAR,
                        ));
                        let text = format!(
                            "Annotating {} frame {}",
                            frame.source_video, frame.frame_number
                        );
                        self.session.set_image(frame);
                        self.set_status(StatusKind::Info, text);
                    }
                    Err(e) => {
                        log::error!("Failed to load frame: {}", e);
                        self.set_status(StatusKind::Error, e);
                    }
                }
            }
            Polled::Lost => {
                self.loading_message = None;
                log::error!("Frame loader stopped without a result");
                self.set_status(StatusKind::Error, "Frame loading failed unexpectedly");
            }
            Polled::Pending => {}
        }

        match poll_job(&mut self.repo_job) {
            Polled::Ready(outcome) => {
                match outcome {
                    RepoOutcome::Saved(image_id) => {
                        self.set_status(StatusKind::Success, format!("✓ Saved {}", image_id));
                        self.refresh_saved();
                    }
                    RepoOutcome::Conflict(request) => {
                        log::info!(
                            "{} already exists, asking before overwrite",
                            request.record.image_id
                        );
                        self.pending_overwrite = Some(request);
                    }
                    RepoOutcome::Deleted(image_id) => {
                        self.set_status(StatusKind::Info, format!("Deleted {}", image_id));
                        self.refresh_saved();
                    }
                    RepoOutcome::Failed(e) => {
                        log::error!("Repository operation failed: {}", e);
                        self.set_status(StatusKind::Error, e.to_string());
                        self.refresh_saved();
                    }
                }
            }
            Polled::Lost => {
                log::error!("Repository worker stopped without a result");
                self.set_status(StatusKind::Error, "Save or delete failed unexpectedly");
                self.refresh_saved();
            }
            Polled::Pending => {}
        }
    }

    fn apply_canvas_action(&mut self, transform: &ViewTransform, action: CanvasAction) {
        match action {
            CanvasAction::Press(button, position) => {
                self.session.press(transform, button, position);
            }
            CanvasAction::Drag(position) => {
                self.session.drag(transform, position);
            }
            CanvasAction::Release(button) => {
                self.session.release(button);
            }
        }
    }

    fn apply_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::UndoPoint => {
                self.session.undo_last();
            }
            ToolbarAction::ResetRoi => self.session.reset_roi(),
            ToolbarAction::ClearAll => self.session.clear_all(),
            ToolbarAction::Save => self.save(),
            ToolbarAction::None => {}
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save();
        }

        // Leave keys to the comment field while it has focus
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
            self.session.undo_last();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.session.clear_all();
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(image_id) = self.pending_overwrite.as_ref().map(|r| r.record.image_id.clone()) {
            let mut answer = None;
            egui::Window::new("Annotation exists")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("{} is already saved. Overwrite it?", image_id));
                    ui.horizontal(|ui| {
                        if ui.button("Overwrite").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(false);
                        }
                    });
                });

            if let Some(overwrite) = answer {
                if let Some(request) = self.pending_overwrite.take() {
                    if overwrite {
                        self.spawn_save(request, true);
                    } else {
                        self.set_status(StatusKind::Info, "Save cancelled");
                    }
                }
            }
        }

        if let Some(image_id) = self.pending_delete.clone() {
            let mut answer = None;
            egui::Window::new("Delete annotation")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Delete {}? Both the raw and the marked crop are removed.",
                        image_id
                    ));
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(false);
                        }
                    });
                });

            if let Some(confirmed) = answer {
                self.pending_delete = None;
                if confirmed {
                    self.spawn_delete(image_id);
                }
            }
        }
    }

    fn pick_image(&self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(ref dir) = self.config.last_media_dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    fn pick_folder(&self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new();
        if let Some(ref dir) = self.config.last_media_dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_folder()
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        // Keep polling while background work is pending
        if self.loading_message.is_some() || self.repo_job.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        ui.close_menu();
                        if let Some(path) = self.pick_image() {
                            self.open_media(path);
                        }
                    }
                    if ui.button("Open Frame Folder...").clicked() {
                        ui.close_menu();
                        if let Some(path) = self.pick_folder() {
                            self.open_media(path);
                        }
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_points = !self.session.points().is_empty();
                    if ui
                        .add_enabled(has_points, egui::Button::new("Undo point (Ctrl+Z)"))
                        .clicked()
                    {
                        self.session.undo_last();
                        ui.close_menu();
                    }
                    if ui.button("Redraw ROI").clicked() {
                        self.session.reset_roi();
                        ui.close_menu();
                    }
                    if ui.button("Clear all (Esc)").clicked() {
                        self.session.clear_all();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.session, self.repo_busy()))
            .inner;
        self.apply_toolbar_action(toolbar_action);

        // Status message
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match self.status {
                Some((kind, ref text)) => {
                    ui.colored_label(kind.color(), text);
                }
                None => {
                    ui.label(egui::RichText::new("Ready").weak());
                }
            });
        });

        // Frame stepper
        if let Some(source) = self.source.clone() {
            let enabled = self.frame_loader.is_none() && !self.repo_busy();
            let timeline_action = egui::TopBottomPanel::bottom("timeline")
                .show(ctx, |ui| {
                    timeline::show(
                        ui,
                        source.label(),
                        source.frame_count(),
                        &mut self.frame_cursor,
                        enabled,
                    )
                })
                .inner;
            if let TimelineAction::LoadFrame(index) = timeline_action {
                self.load_frame(index);
            }
        }

        // Properties panel (right side)
        let busy = self.repo_busy();
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    &mut self.session.comment,
                    &self.saved,
                    self.selected_saved.as_deref(),
                    &self.preview_texture,
                    busy,
                )
            })
            .inner;

        match properties_action {
            PropertiesAction::SelectSaved(image_id) => self.select_saved(image_id, ctx),
            PropertiesAction::DeleteSaved(image_id) => self.pending_delete = Some(image_id),
            PropertiesAction::Refresh => self.refresh_saved(),
            PropertiesAction::None => {}
        }

        self.handle_shortcuts(ctx);
        self.show_dialogs(ctx);

        // Main canvas (center)
        let (transform, actions) = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    (None, Vec::new())
                } else {
                    canvas::show(ui, &self.session, &self.frame_texture)
                }
            })
            .inner;

        if let Some(transform) = transform {
            for action in actions {
                self.apply_canvas_action(&transform, action);
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save(&self.config_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_job_takes_result_once() {
        let (sender, receiver) = channel();
        let mut slot = Some(receiver);
        assert!(matches!(poll_job(&mut slot), Polled::Pending));
        assert!(slot.is_some());

        sender.send(7).unwrap();
        assert!(matches!(poll_job(&mut slot), Polled::Ready(7)));
        assert!(slot.is_none());
        assert!(matches!(poll_job(&mut slot), Polled::Pending));
    }

    #[test]
    fn test_poll_job_clears_slot_when_worker_panics() {
        let (sender, receiver) = channel::<RepoOutcome>();
        let mut slot = Some(receiver);
        let worker = std::thread::spawn(move || {
            let _sender = sender;
            panic!("encoder blew up");
        });
        assert!(worker.join().is_err());

        assert!(matches!(poll_job(&mut slot), Polled::Lost));
        assert!(slot.is_none());
    }

    fn app_in(dir: &std::path::Path) -> AnnotatorApp {
        let config = AppConfig {
            output_dir: dir.join("saved_images"),
            ..AppConfig::default()
        };
        AnnotatorApp::new(config, dir.join("roi_annotator.yaml"))
    }

    #[test]
    fn test_lost_repository_worker_unblocks_saving() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let (sender, receiver) = channel();
        app.repo_job = Some(receiver);
        assert!(app.repo_busy());

        drop(sender);
        app.poll_background(&egui::Context::default());

        assert!(!app.repo_busy());
        assert!(matches!(app.status, Some((StatusKind::Error, _))));
    }

    #[test]
    fn test_exit_saves_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.config.last_media_dir = Some(dir.path().join("clips"));

        eframe::App::on_exit(&mut app, None);

        let (saved, warning) = AppConfig::load_or_default(&dir.path().join("roi_annotator.yaml"));
        assert!(warning.is_none());
        assert_eq!(saved.last_media_dir, Some(dir.path().join("clips")));
    }
}
