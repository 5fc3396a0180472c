//! Headless configurator run.
//!
//! Loads a model (plus an optional environment map and appearance tables),
//! walks through a scripted set of choices and prints every configurable
//! mesh's material after each step.
//!
//! ```text
//! cargo run -p lustre --example configurator -- ring.glb [--hdr studio.hdr] [--tables tables.json]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lustre::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "configurator")]
#[command(about = "Load a jewelry model and walk through a scripted configuration")]
struct Args {
    /// glTF/GLB model to configure
    model: PathBuf,

    /// Equirectangular HDR environment map
    #[arg(long)]
    hdr: Option<PathBuf>,

    /// Appearance tables JSON replacing the built-in tables
    #[arg(long)]
    tables: Option<PathBuf>,
}

/// Camera stand-in that just logs.
struct LogCamera;

impl CameraControl for LogCamera {
    fn set_auto_rotate(&mut self, enabled: bool) {
        log::info!("camera auto-rotate: {enabled}");
    }

    fn reset(&mut self) {
        log::info!("camera reset");
    }
}

fn print_materials(session: &ViewerSession, step: &str) {
    let Some(asset) = session.asset() else {
        return;
    };
    let mut parts = serde_json::Map::new();
    for id in asset.traverse() {
        let Some(node) = asset.node(id) else { continue };
        let Some(mesh) = node.mesh() else { continue };
        if session.classifier().classify(node.name()) != MeshClass::Unhandled {
            let value = serde_json::to_value(mesh.material()).unwrap_or_default();
            parts.insert(node.name().to_string(), value);
        }
    }
    let out = serde_json::json!({ "step": step, "state": session.state(), "materials": parts });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(e) => log::error!("failed to print materials: {e}"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let tables = match args.tables.as_deref().map(AppearanceTables::from_json_file) {
        Some(Ok(tables)) => tables,
        Some(Err(e)) => {
            log::warn!("{e}, using built-in tables");
            AppearanceTables::default()
        }
        None => AppearanceTables::default(),
    };

    let mut session = ViewerSession::new(tables).with_camera(LogCamera);
    let mut loader = AssetLoader::new();
    loader.spawn_asset(args.model.display().to_string(), LoadOptions::default());
    if let Some(hdr) = args.hdr {
        loader.spawn_environment(hdr.display().to_string());
    }

    while let Some(event) = loader.wait() {
        session.handle_load(event);
    }
    if !session.is_loaded() {
        return ExitCode::FAILURE;
    }
    print_materials(&session, "loaded");

    let tint = Color::from_hex("#167d9e").unwrap_or_else(|e| {
        log::warn!("{e}");
        session.tables().lookup_gem("blue").tint
    });
    session.set_gem_color(tint, "blue");
    print_materials(&session, "blue gem");

    session.set_metal_color("rose");
    print_materials(&session, "rose gold");

    session.set_metal_finish(Finish::Brushed);
    print_materials(&session, "brushed");

    session.toggle_auto_rotate();
    session.reset_viewer();
    print_materials(&session, "reset");

    #[cfg(feature = "diagnostics")]
    log::info!("{} apply passes recorded", session.apply_log().len());

    ExitCode::SUCCESS
}
