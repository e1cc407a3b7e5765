// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Draftpad - Main Entry Point
//!
//! A small rich-text notepad with markdown-style formatting shortcuts.
//! Built with Rust and egui.

mod app;
mod config;
mod document;
mod editor;
mod error;
mod markdown;
mod state;
mod storage;
mod string_utils;
mod theme;

use app::DraftpadApp;
use config::load_config;
use log::info;

/// Application name constant.
const APP_NAME: &str = "Draftpad";

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    // Load settings to get window configuration
    let settings = load_config();
    let window_size = settings.window_size;

    info!(
        "Window configuration: {}x{}",
        window_size.width, window_size.height
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0]);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(DraftpadApp::new(cc, settings)))),
    )
}
