// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROI Annotator
//!
//! A desktop application for selecting a region of interest on a video
//! frame, marking keep/remove points inside it and exporting the crop and
//! point metadata as a training sample.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::AnnotatorApp;
use config::{AppConfig, CONFIG_FILE};
use std::path::PathBuf;

fn main() -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE);
    let (config, config_warning) = AppConfig::load_or_default(&config_path);

    // Initialize logging; RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_filter()),
    )
    .init();

    if let Some(warning) = config_warning {
        log::warn!("{}", warning);
    }
    log::info!("Saving annotations under {}", config.output_dir.display());

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ROI Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROI Annotator",
        options,
        Box::new(move |_cc| Ok(Box::new(AnnotatorApp::new(config, config_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
