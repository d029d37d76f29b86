// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Durable storage for saved annotations.
//!
//! Layout under the output directory:
//!
//! ```text
//! annotations.json          metadata document (image id -> record)
//! Annotation/{id}.png       raw ROI crop
//! Reference/{id}.png        ROI crop with markers
//! ```
//!
//! The metadata document is rewritten in full on every save and delete.
//! Callers must keep at most one save or delete in flight.

use super::serialization::{read_metadata, write_metadata, MetadataDocument};
use crate::error::AnnotationError;
use crate::models::record::AnnotationRecord;
use image::{ImageFormat, RgbImage};
use std::path::PathBuf;

const METADATA_FILE: &str = "annotations.json";
const RAW_DIR: &str = "Annotation";
const MARKED_DIR: &str = "Reference";
const ARTIFACT_EXT: &str = "png";

/// File-backed annotation repository.
#[derive(Debug, Clone)]
pub struct AnnotationRepository {
    root: PathBuf,
}

impl AnnotationRepository {
    /// Open a repository rooted at `root`, creating its directories.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AnnotationError> {
        let repo = Self { root: root.into() };
        for dir in [repo.raw_dir(), repo.marked_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AnnotationError::persistence(format!("creating {}", dir.display()), e)
            })?;
        }
        Ok(repo)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    fn raw_dir(&self) -> PathBuf {
        self.root.join(RAW_DIR)
    }

    fn marked_dir(&self) -> PathBuf {
        self.root.join(MARKED_DIR)
    }

    /// Paths of the raw and marked artifacts for `image_id`.
    pub fn artifact_paths(&self, image_id: &str) -> (PathBuf, PathBuf) {
        let file = format!("{}.{}", image_id, ARTIFACT_EXT);
        (self.raw_dir().join(&file), self.marked_dir().join(file))
    }

    /// Whether a record or a raw artifact already exists for `image_id`.
    pub fn exists(&self, image_id: &str) -> Result<bool, AnnotationError> {
        let (raw_path, _) = self.artifact_paths(image_id);
        if raw_path.exists() {
            return Ok(true);
        }
        Ok(self.load_all()?.contains_key(image_id))
    }

    /// Load every record, keyed by image id.
    pub fn load_all(&self) -> Result<MetadataDocument, AnnotationError> {
        read_metadata(&self.metadata_path())
    }

    /// Save unless an annotation already exists and `overwrite` is false.
    pub fn save_checked(
        &self,
        record: &AnnotationRecord,
        raw: &RgbImage,
        marked: &RgbImage,
        overwrite: bool,
    ) -> Result<(), AnnotationError> {
        if !overwrite && self.exists(&record.image_id)? {
            return Err(AnnotationError::OverwriteConflict {
                image_id: record.image_id.clone(),
            });
        }
        self.save(record, raw, marked)
    }

    /// Write both artifacts and upsert the record.
    ///
    /// The document is read first so an unreadable one fails before any
    /// file is touched. Later failures are not rolled back; the error names
    /// the step that failed so the caller can retry.
    pub fn save(
        &self,
        record: &AnnotationRecord,
        raw: &RgbImage,
        marked: &RgbImage,
    ) -> Result<(), AnnotationError> {
        let mut document = self.load_all()?;
        let (raw_path, marked_path) = self.artifact_paths(&record.image_id);

        raw.save_with_format(&raw_path, ImageFormat::Png)
            .map_err(|e| AnnotationError::persistence("writing raw crop", e))?;
        marked
            .save_with_format(&marked_path, ImageFormat::Png)
            .map_err(|e| AnnotationError::persistence("writing marked crop", e))?;

        let replaced = document
            .insert(record.image_id.clone(), record.clone())
            .is_some();
        write_metadata(&self.metadata_path(), &document)?;

        if replaced {
            log::info!("Overwrote annotation {}", record.image_id);
        } else {
            log::info!("Saved annotation {}, total: {}", record.image_id, document.len());
        }
        Ok(())
    }

    /// Remove a record and both of its artifacts.
    pub fn delete(&self, image_id: &str) -> Result<(), AnnotationError> {
        let mut document = self.load_all()?;
        if !document.contains_key(image_id) {
            return Err(AnnotationError::NotFound {
                image_id: image_id.to_string(),
            });
        }

        let (raw_path, marked_path) = self.artifact_paths(image_id);
        for path in [raw_path, marked_path] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        document.remove(image_id);
        write_metadata(&self.metadata_path(), &document)?;
        log::info!("Deleted annotation {}, total: {}", image_id, document.len());
        Ok(())
    }
}
