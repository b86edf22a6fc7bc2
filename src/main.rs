mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use std::sync::Arc;

use iced::{window, Size};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::InstallerConfig;

fn main() -> iced::Result {
    // Respects RUST_LOG, defaults to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("streetview-setup v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(InstallerConfig::from_env());

    iced::application(
        move || app::InstallerApp::new(config.clone()),
        app::update,
        app::view,
    )
    .title("StreetViewLocate Setup")
    .window(window::Settings {
        size: Size::new(700.0, 500.0),
        resizable: false,
        ..Default::default()
    })
    .run()
}
