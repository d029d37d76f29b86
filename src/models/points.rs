// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Categorized point store.
//!
//! Points are kept in a single chronological sequence regardless of
//! category. They can only be appended while a committed ROI contains
//! them, and only the most recent one can be removed.

use super::annotation::{AnnotatedPoint, Category, ImagePoint, Roi, RoiPoint};

/// Ordered collection of annotated points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointStore {
    points: Vec<AnnotatedPoint>,
}

impl PointStore {
    /// Append a point if `roi` is committed and contains it.
    pub fn add(&mut self, roi: Option<&Roi>, category: Category, position: ImagePoint) -> bool {
        match roi {
            Some(roi) if roi.contains(position) => {
                self.points.push(AnnotatedPoint { position, category });
                true
            }
            _ => false,
        }
    }

    /// Remove the most recently added point.
    pub fn undo_last(&mut self) -> bool {
        self.points.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// All points in the order they were added.
    pub fn points(&self) -> &[AnnotatedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points inside `roi`, positioned relative to its top-left corner.
    pub fn points_in_roi(&self, roi: &Roi) -> Vec<RoiPoint> {
        let origin = roi.top_left();
        self.points
            .iter()
            .filter(|p| roi.contains(p.position))
            .map(|p| RoiPoint {
                position: p.position.relative_to(origin),
                category: p.category,
            })
            .collect()
    }

    /// `(remove_count, keep_count)`
    pub fn counts(&self) -> (usize, usize) {
        self.points
            .iter()
            .fold((0, 0), |(remove, keep), p| match p.category {
                Category::Remove => (remove + 1, keep),
                Category::Keep => (remove, keep + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roi() -> Roi {
        Roi::new(50, 50, 50, 50)
    }

    #[test]
    fn test_add_inside_roi() {
        let mut store = PointStore::default();
        assert!(store.add(Some(&roi()), Category::Remove, ImagePoint::new(60, 60)));

        let points = store.points_in_roi(&roi());
        assert_eq!(
            points,
            vec![RoiPoint {
                position: ImagePoint::new(10, 10),
                category: Category::Remove,
            }]
        );
    }

    #[test]
    fn test_add_outside_roi_is_noop() {
        let mut store = PointStore::default();
        assert!(!store.add(Some(&roi()), Category::Remove, ImagePoint::new(10, 10)));
        assert!(!store.add(Some(&roi()), Category::Keep, ImagePoint::new(100, 100)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_without_roi_is_noop() {
        let mut store = PointStore::default();
        assert!(!store.add(None, Category::Keep, ImagePoint::new(60, 60)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_undo_removes_newest_regardless_of_category() {
        let mut store = PointStore::default();
        store.add(Some(&roi()), Category::Remove, ImagePoint::new(60, 60));
        store.add(Some(&roi()), Category::Keep, ImagePoint::new(70, 70));
        store.add(Some(&roi()), Category::Remove, ImagePoint::new(80, 80));

        assert!(store.undo_last());
        assert_eq!(store.points().last().unwrap().position, ImagePoint::new(70, 70));
        assert!(store.undo_last());
        assert_eq!(store.points().last().unwrap().category, Category::Remove);
        assert!(store.undo_last());
        assert!(!store.undo_last());
    }

    #[test]
    fn test_counts_by_category() {
        let mut store = PointStore::default();
        store.add(Some(&roi()), Category::Remove, ImagePoint::new(60, 60));
        store.add(Some(&roi()), Category::Keep, ImagePoint::new(61, 60));
        store.add(Some(&roi()), Category::Keep, ImagePoint::new(62, 60));
        assert_eq!(store.counts(), (1, 2));
    }

    #[test]
    fn test_points_in_roi_preserves_order() {
        let mut store = PointStore::default();
        store.add(Some(&roi()), Category::Keep, ImagePoint::new(99, 99));
        store.add(Some(&roi()), Category::Remove, ImagePoint::new(50, 50));

        let rel: Vec<_> = store.points_in_roi(&roi()).iter().map(|p| p.position).collect();
        assert_eq!(rel, vec![ImagePoint::new(49, 49), ImagePoint::new(0, 0)]);
    }
}
