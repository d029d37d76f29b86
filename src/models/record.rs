// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted annotation record.
//!
//! One record is stored per annotated frame, keyed by its image id in the
//! metadata document. The key itself is not repeated inside the value.

use super::annotation::{Category, Roi, RoiPoint};
use serde::{Deserialize, Serialize};

/// Build the natural key of a frame.
pub fn image_id(source_video: &str, frame_number: u64) -> String {
    format!("{}_frame_{}", source_video, frame_number)
}

/// A marked point in persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPoint {
    #[serde(rename = "type")]
    pub category: Category,
    pub label: String,
    /// Position relative to the ROI's top-left corner
    pub pos: [i32; 2],
}

impl From<&RoiPoint> for PersistedPoint {
    fn from(point: &RoiPoint) -> Self {
        Self {
            category: point.category,
            label: point.category.label().to_string(),
            pos: [point.position.x, point.position.y],
        }
    }
}

/// Metadata for one saved annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Filled from the document key on load
    #[serde(skip)]
    pub image_id: String,
    pub source_video: String,
    pub frame_number: u64,
    /// `[x, y, w, h]` in image coordinates
    pub roi_coords: [i32; 4],
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub points: Vec<PersistedPoint>,
    pub remove_count: usize,
    pub keep_count: usize,
    /// RFC 3339 timestamp of the save
    pub created_at: String,
}

impl AnnotationRecord {
    /// Create a record for the given frame, ROI and ROI-relative points.
    pub fn new(
        source_video: &str,
        frame_number: u64,
        roi: &Roi,
        comment: &str,
        points: &[RoiPoint],
        created_at: String,
    ) -> Self {
        let points: Vec<PersistedPoint> = points.iter().map(PersistedPoint::from).collect();
        let remove_count = points
            .iter()
            .filter(|p| p.category == Category::Remove)
            .count();
        let keep_count = points.len() - remove_count;

        Self {
            image_id: image_id(source_video, frame_number),
            source_video: source_video.to_string(),
            frame_number,
            roi_coords: roi.to_array(),
            comment: comment.to_string(),
            points,
            remove_count,
            keep_count,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::ImagePoint;

    fn sample_points() -> Vec<RoiPoint> {
        vec![
            RoiPoint {
                position: ImagePoint::new(10, 10),
                category: Category::Remove,
            },
            RoiPoint {
                position: ImagePoint::new(3, 4),
                category: Category::Keep,
            },
            RoiPoint {
                position: ImagePoint::new(0, 7),
                category: Category::Remove,
            },
        ]
    }

    #[test]
    fn test_image_id_format() {
        assert_eq!(image_id("orchard_03", 1520), "orchard_03_frame_1520");
    }

    #[test]
    fn test_record_counts_and_key() {
        let record = AnnotationRecord::new(
            "orchard_03",
            42,
            &Roi::new(50, 50, 50, 50),
            "dense cluster",
            &sample_points(),
            "2025-06-01T12:00:00+00:00".to_string(),
        );
        assert_eq!(record.image_id, "orchard_03_frame_42");
        assert_eq!(record.roi_coords, [50, 50, 50, 50]);
        assert_eq!(record.remove_count, 2);
        assert_eq!(record.keep_count, 1);
        assert_eq!(record.points[1].pos, [3, 4]);
    }

    #[test]
    fn test_persisted_point_shape() {
        let record = AnnotationRecord::new(
            "clip",
            1,
            &Roi::new(0, 0, 30, 30),
            "",
            &sample_points()[..1],
            "2025-06-01T12:00:00+00:00".to_string(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("image_id").is_none());
        assert_eq!(value["points"][0]["type"], "remove");
        assert_eq!(value["points"][0]["label"], "疏除");
        assert_eq!(value["points"][0]["pos"], serde_json::json!([10, 10]));
        assert_eq!(value["roi_coords"], serde_json::json!([0, 0, 30, 30]));
    }
}
