// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core geometry types (image-space points and
//! rectangles) and the two point categories used for marking.

use serde::{Deserialize, Serialize};

/// A ROI must exceed this many image pixels on both axes to be committed.
pub const MIN_ROI_SIZE: i32 = 20;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: i32,
    pub y: i32,
}

impl ImagePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Express this point relative to `origin`.
    pub fn relative_to(&self, origin: ImagePoint) -> ImagePoint {
        ImagePoint::new(self.x - origin.x, self.y - origin.y)
    }
}

/// An axis-aligned rectangle in image pixel coordinates.
///
/// Always normalized: `w >= 0`, `h >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Roi {
    /// Create a rectangle, normalizing negative extents.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        let (x, w) = if w < 0 { (x + w, -w) } else { (x, w) };
        let (y, h) = if h < 0 { (y + h, -h) } else { (y, h) };
        Self { x, y, w, h }
    }

    /// Create the normalized rectangle spanned by two corner points.
    pub fn from_corners(a: ImagePoint, b: ImagePoint) -> Self {
        Self::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    /// Check if a point is inside the rectangle.
    ///
    /// Left/top edges are inclusive, right/bottom edges exclusive.
    pub fn contains(&self, point: ImagePoint) -> bool {
        point.x >= self.x
            && point.x < self.x + self.w
            && point.y >= self.y
            && point.y < self.y + self.h
    }

    pub fn top_left(&self) -> ImagePoint {
        ImagePoint::new(self.x, self.y)
    }

    /// Whether both sides are strictly larger than [`MIN_ROI_SIZE`].
    pub fn is_committable(&self) -> bool {
        self.w > MIN_ROI_SIZE && self.h > MIN_ROI_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// `[x, y, w, h]`, the persisted form.
    pub fn to_array(&self) -> [i32; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

/// Pointer button that produced an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Point category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Marked for removal (thinning)
    Remove,
    /// Marked to keep
    Keep,
}

/// Glyph drawn inside a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Cross,
    Ring,
}

/// How a point of a given category is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Fill color as RGB
    pub fill: [u8; 3],
    pub glyph: Glyph,
    /// Short text shown next to markers on screen
    pub glyph_text: &'static str,
}

/// Marker radius in pixels.
pub const MARKER_RADIUS: i32 = 10;

/// Marker outline width in pixels.
pub const MARKER_OUTLINE: i32 = 2;

impl Category {
    /// Fixed button mapping: primary marks removal, secondary marks keep.
    pub fn from_button(button: PointerButton) -> Self {
        match button {
            PointerButton::Primary => Category::Remove,
            PointerButton::Secondary => Category::Keep,
        }
    }

    /// Persisted category code.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Remove => "remove",
            Category::Keep => "keep",
        }
    }

    /// Human-readable label stored alongside the code.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Remove => "疏除",
            Category::Keep => "保留",
        }
    }

    pub fn marker_style(&self) -> MarkerStyle {
        match self {
            Category::Remove => MarkerStyle {
                fill: [0xFF, 0x44, 0x44],
                glyph: Glyph::Cross,
                glyph_text: "X",
            },
            Category::Keep => MarkerStyle {
                fill: [0x44, 0xFF, 0x44],
                glyph: Glyph::Ring,
                glyph_text: "O",
            },
        }
    }
}

/// A categorized point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatedPoint {
    pub position: ImagePoint,
    pub category: Category,
}

/// A categorized point expressed relative to the ROI's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiPoint {
    pub position: ImagePoint,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let roi = Roi::from_corners(ImagePoint::new(100, 100), ImagePoint::new(50, 50));
        assert_eq!(roi, Roi { x: 50, y: 50, w: 50, h: 50 });
        assert!(roi.is_committable());

        let small = Roi::from_corners(ImagePoint::new(10, 10), ImagePoint::new(15, 12));
        assert_eq!(small, Roi { x: 10, y: 10, w: 5, h: 2 });
        assert!(!small.is_committable());
    }

    #[test]
    fn test_new_normalizes_negative_extent() {
        assert_eq!(Roi::new(60, 60, -10, -20), Roi { x: 50, y: 40, w: 10, h: 20 });
    }

    #[test]
    fn test_commit_threshold_is_strict() {
        assert!(!Roi::new(0, 0, 20, 50).is_committable());
        assert!(!Roi::new(0, 0, 50, 20).is_committable());
        assert!(Roi::new(0, 0, 21, 21).is_committable());
    }

    #[test]
    fn test_contains_excludes_right_and_bottom_edges() {
        let roi = Roi::new(50, 50, 50, 50);
        assert!(roi.contains(ImagePoint::new(50, 50)));
        assert!(roi.contains(ImagePoint::new(99, 99)));
        assert!(!roi.contains(ImagePoint::new(100, 60)));
        assert!(!roi.contains(ImagePoint::new(60, 100)));
        assert!(!roi.contains(ImagePoint::new(49, 60)));
    }

    #[test]
    fn test_category_codes_and_buttons() {
        assert_eq!(Category::from_button(PointerButton::Primary), Category::Remove);
        assert_eq!(Category::from_button(PointerButton::Secondary), Category::Keep);
        assert_eq!(Category::Remove.code(), "remove");
        assert_eq!(Category::Keep.code(), "keep");
        assert_eq!(serde_json::to_string(&Category::Keep).unwrap(), "\"keep\"");
    }

    #[test]
    fn test_styles_differ_per_category() {
        let remove = Category::Remove.marker_style();
        let keep = Category::Keep.marker_style();
        assert_ne!(remove.fill, keep.fill);
        assert_ne!(remove.glyph, keep.glyph);
    }
}
