// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROI lifecycle state machine.
//!
//! A ROI is drawn by pressing, dragging and releasing the primary button.
//! On release the rectangle is committed only if both sides exceed
//! [`MIN_ROI_SIZE`](super::annotation::MIN_ROI_SIZE); otherwise it is
//! discarded and the user must draw again. A committed ROI is never
//! edited in place, only replaced or reset.

use super::annotation::{ImagePoint, Roi};

/// Current ROI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoiState {
    /// No ROI
    #[default]
    Empty,
    /// A ROI is being dragged
    Drawing { start: ImagePoint, end: ImagePoint },
    /// A ROI has been committed; points can be marked inside it
    Committed(Roi),
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiOutcome {
    /// The dragged rectangle became the active ROI
    Committed(Roi),
    /// The dragged rectangle was too small and was discarded
    Rejected(Roi),
    /// Nothing was being drawn
    Ignored,
}

impl RoiState {
    /// Start drawing a new ROI at `point`.
    ///
    /// Valid from `Empty` and `Committed`; a press while already drawing
    /// restarts the drag.
    pub fn press(&mut self, point: ImagePoint) {
        *self = RoiState::Drawing {
            start: point,
            end: point,
        };
    }

    /// Move the free corner of the ROI being drawn. No-op otherwise.
    pub fn drag(&mut self, point: ImagePoint) -> bool {
        match self {
            RoiState::Drawing { end, .. } => {
                *end = point;
                true
            }
            _ => false,
        }
    }

    /// Finish the drag, committing or discarding the rectangle.
    pub fn release(&mut self) -> RoiOutcome {
        let RoiState::Drawing { start, end } = *self else {
            return RoiOutcome::Ignored;
        };

        let rect = Roi::from_corners(start, end);
        if rect.is_committable() {
            *self = RoiState::Committed(rect);
            RoiOutcome::Committed(rect)
        } else {
            *self = RoiState::Empty;
            RoiOutcome::Rejected(rect)
        }
    }

    /// Discard any ROI.
    pub fn reset(&mut self) {
        *self = RoiState::Empty;
    }

    /// The committed ROI, if any.
    pub fn committed(&self) -> Option<&Roi> {
        match self {
            RoiState::Committed(roi) => Some(roi),
            _ => None,
        }
    }

    /// The rectangle currently being dragged, if any.
    pub fn provisional(&self) -> Option<Roi> {
        match self {
            RoiState::Drawing { start, end } => Some(Roi::from_corners(*start, *end)),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, RoiState::Drawing { .. })
    }

    /// Points can be marked exactly when a ROI is committed.
    pub fn is_point_mode(&self) -> bool {
        matches!(self, RoiState::Committed(_))
    }
}
