// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the save and persistence path.
//!
//! Geometry and interaction rejections (a drag that is too small, a point
//! outside the ROI) are not errors; they are reported as `false`/`None`
//! by the components themselves.

use thiserror::Error;

/// Boxed source error for persistence failures.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while exporting or persisting an annotation.
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// Save attempted before any frame was loaded
    #[error("No image loaded")]
    NoImageLoaded,

    /// Save attempted before a ROI was committed
    #[error("No ROI defined")]
    NoRoiDefined,

    /// Cropping produced an empty image
    #[error("Export failed: {reason}")]
    ExportFailure {
        /// What went wrong with the crop
        reason: String,
    },

    /// Writing an artifact or the metadata document failed
    #[error("Persistence failed while {step}: {source}")]
    PersistenceFailure {
        /// The sub-step that failed
        step: String,
        /// Underlying I/O, encoding or serialization error
        #[source]
        source: BoxedSource,
    },

    /// A record with this id already exists and overwrite was not confirmed
    #[error("Annotation '{image_id}' already exists")]
    OverwriteConflict {
        /// Key of the existing record
        image_id: String,
    },

    /// No record with this id exists
    #[error("Annotation '{image_id}' not found")]
    NotFound {
        /// Key that was looked up
        image_id: String,
    },
}

impl AnnotationError {
    /// Wrap a lower-level error as a persistence failure for the given step.
    pub fn persistence(step: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        AnnotationError::PersistenceFailure {
            step: step.into(),
            source: source.into(),
        }
    }

    /// Whether the caller should ask the user before retrying with overwrite.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, AnnotationError::OverwriteConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_message_names_step() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AnnotationError::persistence("writing metadata", io);
        assert_eq!(
            err.to_string(),
            "Persistence failed while writing metadata: denied"
        );
    }

    #[test]
    fn test_only_conflict_needs_confirmation() {
        let conflict = AnnotationError::OverwriteConflict {
            image_id: "clip_frame_3".to_string(),
        };
        assert!(conflict.needs_confirmation());
        assert!(!AnnotationError::NoRoiDefined.needs_confirmation());
    }
}
