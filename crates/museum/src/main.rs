use clap::Parser;
use mathaf_engine::{
    ApplicationBuilder, Result,
    layers::{DeviceLayer, RenderLayer},
};
use std::path::PathBuf;
use winit::event_loop::EventLoop;

use crate::{
    config::MuseumConfig, museum_layer::MuseumLayer, notice::Notices, overlay::OverlayLayer,
};

mod components;
mod config;
mod controller;
mod gallery;
mod highlight;
mod museum_layer;
mod notice;
mod overlay;
mod prelude;
mod systems;
mod utils;

/// Walk through a virtual hall of Arabic heritage
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Museum layout to load instead of the built-in catalog
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_module("mathaf", log::LevelFilter::Debug)
        .init();

    let cli = Cli::parse();
    let mut notices = Notices::default();

    let config = match &cli.config {
        Some(path) => match MuseumConfig::load(path) {
            Ok(config) => {
                log::info!("Loaded museum from {}", path.display());
                notices.info(format!("Showing {}", config.title));
                config
            }
            Err(e) => {
                log::warn!("{}, falling back to the built-in catalog", e);
                notices.warn(format!("{}. Showing the built-in catalog.", e));
                MuseumConfig::builtin()?
            }
        },
        None => MuseumConfig::builtin()?,
    };

    let event_loop = EventLoop::new()?;

    let controller_settings = config.controller.clone();
    let mut app = ApplicationBuilder::new()
        .with_title(config.title.clone())
        .add_layer(|context| Ok(DeviceLayer::new(context)?))
        .add_layer(move |context| Ok(MuseumLayer::new(context, controller_settings.clone())))
        .add_layer(|context| Ok(RenderLayer::new(context)?))
        .add_layer(|context| Ok(OverlayLayer::new(context)?))
        .build();

    app.insert_resource(mathaf_engine::components::ClearColor(config.room.background));
    app.insert_resource(notices);

    gallery::build(&mut app, &config);

    event_loop.run_app(&mut app)?;

    Ok(())
}
