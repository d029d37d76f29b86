// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROI crop export.
//!
//! Produces the two artifacts of a saved annotation from the same crop
//! geometry: the raw crop, and a copy with point markers burned in.

use crate::error::AnnotationError;
use crate::models::annotation::{Glyph, Roi, RoiPoint, MARKER_OUTLINE, MARKER_RADIUS};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const GLYPH_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const GLYPH_SIZE: f32 = 4.0;

/// Clamp a ROI against image bounds.
pub fn clamp_roi(roi: &Roi, width: u32, height: u32) -> Roi {
    let iw = i32::try_from(width).unwrap_or(i32::MAX);
    let ih = i32::try_from(height).unwrap_or(i32::MAX);
    let x = roi.x.clamp(0, iw);
    let y = roi.y.clamp(0, ih);
    Roi {
        x,
        y,
        w: roi.w.min(iw - x).max(0),
        h: roi.h.min(ih - y).max(0),
    }
}

/// Crop the ROI out of `image` without any markers.
pub fn export_raw(image: &RgbImage, roi: &Roi) -> Result<RgbImage, AnnotationError> {
    let crop = clamp_roi(roi, image.width(), image.height());
    if crop.is_empty() {
        return Err(AnnotationError::ExportFailure {
            reason: format!(
                "ROI {:?} has no area inside the {}x{} image",
                roi.to_array(),
                image.width(),
                image.height()
            ),
        });
    }

    Ok(imageops::crop_imm(image, crop.x as u32, crop.y as u32, crop.w as u32, crop.h as u32)
        .to_image())
}

/// Crop the ROI out of `image` and draw a marker for each point.
///
/// `points` are relative to the ROI's top-left corner.
pub fn export_marked(
    image: &RgbImage,
    roi: &Roi,
    points: &[RoiPoint],
) -> Result<RgbImage, AnnotationError> {
    let mut marked = export_raw(image, roi)?;
    let crop = clamp_roi(roi, image.width(), image.height());
    let shift = (roi.x - crop.x, roi.y - crop.y);

    for point in points {
        let center = (point.position.x + shift.0, point.position.y + shift.1);
        draw_marker(&mut marked, center, point);
    }

    Ok(marked)
}

fn draw_marker(canvas: &mut RgbImage, center: (i32, i32), point: &RoiPoint) {
    let style = point.category.marker_style();

    draw_filled_circle_mut(canvas, center, MARKER_RADIUS, Rgb(style.fill));
    for r in (MARKER_RADIUS - MARKER_OUTLINE + 1)..=MARKER_RADIUS {
        draw_hollow_circle_mut(canvas, center, r, OUTLINE_COLOR);
    }

    let (cx, cy) = (center.0 as f32, center.1 as f32);
    match style.glyph {
        Glyph::Cross => {
            // Two pixels wide
            for dx in [0.0, 1.0] {
                draw_line_segment_mut(
                    canvas,
                    (cx - GLYPH_SIZE + dx, cy - GLYPH_SIZE),
                    (cx + GLYPH_SIZE + dx, cy + GLYPH_SIZE),
                    GLYPH_COLOR,
                );
                draw_line_segment_mut(
                    canvas,
                    (cx - GLYPH_SIZE + dx, cy + GLYPH_SIZE),
                    (cx + GLYPH_SIZE + dx, cy - GLYPH_SIZE),
                    GLYPH_COLOR,
                );
            }
        }
        Glyph::Ring => {
            let r = GLYPH_SIZE as i32;
            draw_hollow_circle_mut(canvas, center, r, GLYPH_COLOR);
            draw_hollow_circle_mut(canvas, center, r + 1, GLYPH_COLOR);
        }
    }
}
