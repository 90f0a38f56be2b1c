// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PanelFlat - Solar panel photo flattening tool
//!
//! A desktop application for manually annotating photographs of solar
//! panels: click the four corners of a panel, enter its physical
//! dimensions, and save a perspective-corrected image. A JSON manifest
//! mapping output images to their dimensions is written when the run ends.

mod app;
mod core;
mod error;
mod io;
mod models;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::app::FlattenerApp;
use crate::core::flattener::PanelFlattener;
use crate::io::input::InputSpec;

/// Flatten a list of solar panels.
#[derive(Debug, Parser)]
#[command(author, version, about = "Annotate solar panel photos and flatten them to rectangles")]
struct Args {
    /// Path to the input JSON: a list of image paths, or a mapping of
    /// image path to approximate panel locations.
    #[arg(long)]
    input: PathBuf,

    /// Directory to save flattened images and result.json to.
    #[arg(long)]
    output: PathBuf,

    /// Radius of the dots used to mark and select panel corners.
    #[arg(long, default_value_t = 10)]
    dot_size: u32,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    // Validate the input manifest before any window opens
    let input = InputSpec::from_file(&args.input)
        .with_context(|| format!("invalid input file {}", args.input.display()))?;
    log::info!(
        "loaded {} image entr{} from {}",
        input.entries.len(),
        if input.entries.len() == 1 { "y" } else { "ies" },
        args.input.display()
    );

    let mut flattener = PanelFlattener::new(input, args.output);
    flattener.start();
    let app = FlattenerApp::new(flattener, args.dot_size);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("PanelFlat - Solar Panel Flattening"),
        ..Default::default()
    };

    // Run the application; the manifest is flushed when the window closes
    eframe::run_native("PanelFlat", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
