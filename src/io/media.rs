// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Frames reach the annotator through a [`FrameSource`]. Video decoding is
//! left to external tools; the sources here serve still images, either a
//! single file or a directory of extracted frames.

use crate::models::session::Frame;
use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// File extensions accepted as frames.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Supplies frames on request.
pub trait FrameSource: Send + Sync {
    /// Label recorded as the source of every frame
    fn label(&self) -> &str;

    fn frame_count(&self) -> usize;

    /// Decode the frame at `index`.
    fn frame(&self, index: usize) -> Result<Frame>;
}

/// Load an image file as 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgb8();
    log::debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string())
}

/// A single still image, served as frame 0.
#[derive(Debug, Clone)]
pub struct StillImageSource {
    path: PathBuf,
    label: String,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = file_label(&path);
        Self { path, label }
    }
}

impl FrameSource for StillImageSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn frame_count(&self) -> usize {
        1
    }

    fn frame(&self, index: usize) -> Result<Frame> {
        if index != 0 {
            bail!("{} has a single frame, requested {}", self.path.display(), index);
        }
        Ok(Frame {
            image: load_image(&self.path)?,
            source_video: self.label.clone(),
            frame_number: 0,
        })
    }
}

/// A directory of extracted frames, ordered by file name.
///
/// The frame number is the index in that order and the label is the
/// directory name.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    label: String,
    files: Vec<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            bail!("No image files in {}", dir.display());
        }

        log::info!("Opened frame sequence {} ({} frames)", dir.display(), files.len());
        Ok(Self {
            label: file_label(dir),
            files,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn frame(&self, index: usize) -> Result<Frame> {
        let Some(path) = self.files.get(index) else {
            bail!("Frame {} out of range (0..{})", index, self.files.len());
        };
        Ok(Frame {
            image: load_image(path)?,
            source_video: self.label.clone(),
            frame_number: index as u64,
        })
    }
}

/// Open `path` as a frame source: a directory becomes a sequence, a file
/// a single still.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        Ok(Box::new(ImageSequenceSource::open(path)?))
    } else if is_image_file(path) {
        Ok(Box::new(StillImageSource::new(path)))
    } else {
        bail!("Unsupported media: {}", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn write_png(path: &Path, shade: u8) {
        RgbImage::from_pixel(8, 6, Rgb([shade, shade, shade]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_still_image_is_frame_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orchard_row3.png");
        write_png(&path, 50);

        let source = StillImageSource::new(&path);
        assert_eq!(source.label(), "orchard_row3");
        assert_eq!(source.frame_count(), 1);

        let frame = source.frame(0).unwrap();
        assert_eq!(frame.frame_number, 0);
        assert_eq!(frame.size(), (8, 6));
        assert!(source.frame(1).is_err());
    }

    #[test]
    fn test_sequence_orders_frames_and_skips_other_files() {
        let dir = tempdir().unwrap();
        let seq = dir.path().join("clip07");
        std::fs::create_dir(&seq).unwrap();
        write_png(&seq.join("0002.png"), 2);
        write_png(&seq.join("0001.png"), 1);
        std::fs::write(seq.join("notes.txt"), "skip me").unwrap();

        let source = ImageSequenceSource::open(&seq).unwrap();
        assert_eq!(source.label(), "clip07");
        assert_eq!(source.frame_count(), 2);

        let frame = source.frame(1).unwrap();
        assert_eq!(frame.frame_number, 1);
        assert_eq!(frame.source_video, "clip07");
        assert_eq!(*frame.image.get_pixel(0, 0), Rgb([2, 2, 2]));
        assert!(source.frame(2).is_err());
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempdir().unwrap();
        assert!(ImageSequenceSource::open(dir.path()).is_err());
    }

    #[test]
    fn test_open_source_dispatch() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        write_png(&file, 9);

        assert_eq!(open_source(&file).unwrap().frame_count(), 1);
        assert_eq!(open_source(dir.path()).unwrap().frame_count(), 1);
        assert!(open_source(&dir.path().join("a.txt")).is_err());
    }
}
