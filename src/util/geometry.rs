// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the transform between image pixel coordinates
//! and viewport coordinates. The image is shrunk to fit the viewport
//! (never magnified) and centered on both axes.

use crate::models::annotation::{ImagePoint, Roi};

/// A point in viewport coordinates, relative to the canvas top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewportPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Fit-to-viewport transform for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    image_width: u32,
    image_height: u32,
    scale: f32,
    offset: ViewportPoint,
}

impl ViewTransform {
    /// Compute the transform for an image of `image_size` shown in a
    /// viewport of `viewport_size`.
    pub fn fit(image_size: (u32, u32), viewport_size: (f32, f32)) -> Self {
        let (iw, ih) = image_size;
        let (vw, vh) = viewport_size;
        let scale = if iw == 0 || ih == 0 {
            1.0
        } else {
            (vw / iw as f32).min(vh / ih as f32).min(1.0).max(0.0)
        };
        let offset = ViewportPoint::new(
            (vw - iw as f32 * scale) / 2.0,
            (vh - ih as f32 * scale) / 2.0,
        );
        Self {
            image_width: iw,
            image_height: ih,
            scale,
            offset,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> ViewportPoint {
        self.offset
    }

    /// Size of the rendered image in viewport pixels.
    pub fn display_size(&self) -> (f32, f32) {
        (
            self.image_width as f32 * self.scale,
            self.image_height as f32 * self.scale,
        )
    }

    /// Map an image point to the viewport.
    pub fn to_viewport(&self, point: ImagePoint) -> ViewportPoint {
        ViewportPoint::new(
            (point.x as f32 * self.scale).floor() + self.offset.x,
            (point.y as f32 * self.scale).floor() + self.offset.y,
        )
    }

    /// Map a viewport point to the image.
    ///
    /// Returns `None` when the point falls outside the rendered image.
    pub fn to_image(&self, point: ViewportPoint) -> Option<ImagePoint> {
        if self.image_width == 0 || self.image_height == 0 || self.scale <= 0.0 {
            return None;
        }

        let x = point.x - self.offset.x;
        let y = point.y - self.offset.y;
        let (display_w, display_h) = self.display_size();
        if x < 0.0 || x >= display_w || y < 0.0 || y >= display_h {
            return None;
        }

        let img_x = (x / self.scale).floor() as i64;
        let img_y = (y / self.scale).floor() as i64;

        // Guard rounding at the far edge.
        Some(ImagePoint::new(
            img_x.clamp(0, self.image_width as i64 - 1) as i32,
            img_y.clamp(0, self.image_height as i64 - 1) as i32,
        ))
    }

    /// Map an image rectangle to the viewport.
    ///
    /// Width and height are scaled independently of the top-left corner.
    pub fn rect_to_viewport(&self, roi: &Roi) -> ViewportRect {
        let top_left = self.to_viewport(roi.top_left());
        ViewportRect {
            x: top_left.x,
            y: top_left.y,
            w: (roi.w as f32 * self.scale).floor(),
            h: (roi.h as f32 * self.scale).floor(),
        }
    }
}
