// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state.
//!
//! The session owns everything being edited for one frame: the image,
//! the ROI state, the marked points and the free-text comment. Pointer
//! events arrive in viewport coordinates together with the transform of
//! the current render pass.

use super::annotation::{Category, ImagePoint, PointerButton, Roi, RoiPoint};
use super::points::PointStore;
use super::record::{self, AnnotationRecord};
use super::roi::{RoiOutcome, RoiState};
use crate::error::AnnotationError;
use crate::io::export;
use crate::util::geometry::{ViewTransform, ViewportPoint};
use image::RgbImage;

/// A frame delivered by a frame source.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Label of the source the frame came from (typically a video name)
    pub source_video: String,
    pub frame_number: u64,
}

impl Frame {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Everything needed to persist one annotation.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub record: AnnotationRecord,
    pub raw_image: RgbImage,
    pub marked_image: RgbImage,
}

/// Editing state for the current frame.
#[derive(Debug, Default)]
pub struct AnnotationSession {
    frame: Option<Frame>,
    roi: RoiState,
    points: PointStore,
    pub comment: String,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the frame. Always discards ROI, points and comment.
    pub fn set_image(&mut self, frame: Frame) {
        log::info!(
            "Annotating {} frame {} ({}x{})",
            frame.source_video,
            frame.frame_number,
            frame.image.width(),
            frame.image.height()
        );
        self.frame = Some(frame);
        self.clear_all();
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn roi_state(&self) -> &RoiState {
        &self.roi
    }

    pub fn roi(&self) -> Option<&Roi> {
        self.roi.committed()
    }

    pub fn points(&self) -> &PointStore {
        &self.points
    }

    /// Transform for a viewport of the given size, if a frame is loaded.
    pub fn transform(&self, viewport_size: (f32, f32)) -> Option<ViewTransform> {
        self.frame
            .as_ref()
            .map(|frame| ViewTransform::fit(frame.size(), viewport_size))
    }

    /// Handle a pointer press. Returns true if the state changed.
    ///
    /// With a committed ROI, presses inside it mark points. A primary press
    /// elsewhere on the image starts a new ROI and drops all points.
    pub fn press(
        &mut self,
        transform: &ViewTransform,
        button: PointerButton,
        position: ViewportPoint,
    ) -> bool {
        if self.frame.is_none() {
            return false;
        }
        let Some(point) = transform.to_image(position) else {
            return false;
        };

        if self.roi.is_point_mode() && self.roi.committed().is_some_and(|roi| roi.contains(point)) {
            return self.add_point_at(transform, button, position);
        }

        match button {
            PointerButton::Primary => {
                self.points.clear();
                self.roi.press(point);
                true
            }
            PointerButton::Secondary => false,
        }
    }

    /// Handle pointer movement. Positions outside the image are ignored
    /// without aborting the drag.
    pub fn drag(&mut self, transform: &ViewTransform, position: ViewportPoint) -> bool {
        if !self.roi.is_drawing() {
            return false;
        }
        match transform.to_image(position) {
            Some(point) => self.roi.drag(point),
            None => false,
        }
    }

    /// Handle a pointer release.
    pub fn release(&mut self, button: PointerButton) -> RoiOutcome {
        if button != PointerButton::Primary {
            return RoiOutcome::Ignored;
        }
        let outcome = self.roi.release();
        match outcome {
            RoiOutcome::Committed(roi) => log::info!("Committed ROI {:?}", roi.to_array()),
            RoiOutcome::Rejected(roi) => {
                log::info!("Discarded ROI {:?}, too small", roi.to_array())
            }
            RoiOutcome::Ignored => {}
        }
        outcome
    }

    /// Mark a point at a viewport position with the category mapped
    /// from `button`.
    pub fn add_point_at(
        &mut self,
        transform: &ViewTransform,
        button: PointerButton,
        position: ViewportPoint,
    ) -> bool {
        match transform.to_image(position) {
            Some(point) => self.add_point(button, point),
            None => false,
        }
    }

    fn add_point(&mut self, button: PointerButton, point: ImagePoint) -> bool {
        let category = Category::from_button(button);
        let added = self.points.add(self.roi.committed(), category, point);
        if added {
            log::debug!("Added {} point at ({}, {})", category.code(), point.x, point.y);
        }
        added
    }

    /// Remove the most recently marked point.
    pub fn undo_last(&mut self) -> bool {
        let undone = self.points.undo_last();
        if undone {
            log::debug!("Undid point, remaining: {}", self.points.len());
        }
        undone
    }

    /// Discard ROI, points and comment.
    pub fn reset_roi(&mut self) {
        self.roi.reset();
        self.points.clear();
        self.comment.clear();
    }

    /// Same transition as [`reset_roi`](Self::reset_roi).
    pub fn clear_all(&mut self) {
        self.reset_roi();
    }

    /// Points inside the committed ROI, relative to its top-left corner.
    pub fn points_in_roi(&self) -> Vec<RoiPoint> {
        self.roi
            .committed()
            .map(|roi| self.points.points_in_roi(roi))
            .unwrap_or_default()
    }

    /// `(remove_count, keep_count)`
    pub fn counts(&self) -> (usize, usize) {
        self.points.counts()
    }

    /// Natural key of the current frame.
    pub fn image_id(&self) -> Option<String> {
        self.frame
            .as_ref()
            .map(|f| record::image_id(&f.source_video, f.frame_number))
    }

    /// Build the record and both artifacts for the current state.
    pub fn build_save_request(&self, created_at: String) -> Result<SaveRequest, AnnotationError> {
        let frame = self.frame.as_ref().ok_or(AnnotationError::NoImageLoaded)?;
        let roi = self.roi.committed().ok_or(AnnotationError::NoRoiDefined)?;

        let points = self.points_in_roi();
        let raw_image = export::export_raw(&frame.image, roi)?;
        let marked_image = export::export_marked(&frame.image, roi, &points)?;
        let record = AnnotationRecord::new(
            &frame.source_video,
            frame.frame_number,
            roi,
            &self.comment,
            &points,
            created_at,
        );

        Ok(SaveRequest {
            record,
            raw_image,
            marked_image,
        })
    }
}
