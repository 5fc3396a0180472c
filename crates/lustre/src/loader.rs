//! # Loading — glTF Assets and HDR Environment Maps
//!
//! Loading is the only asynchronous edge of the configurator. Decoding runs on
//! worker threads; results come back over a channel and are handed to the
//! session on the UI thread, exactly once each.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  AssetLoader                                             │
//! │                                                          │
//! │  spawn_asset(path) ──────► worker thread: load_gltf      │
//! │  spawn_environment(path) ► worker thread: load_hdr       │
//! │                              sends LoadEvent over mpsc   │
//! │                                                          │
//! │  rx ◄───────────── receives one event per spawned load   │
//! └──────────────────────────────────────────────────────────┘
//!
//! Per-frame: session.poll_loads(&mut loader)
//!   1. Drain rx without blocking
//!   2. Ok  → asset_ready / environment_ready (applies materials)
//!   3. Err → logged; the session keeps running without that resource
//! ```
//!
//! ## What We Extract From glTF
//!
//! - The node hierarchy of the default scene, with names and local transforms
//! - Per primitive: vertex/index counts and the metallic-roughness material,
//!   including texture indices (so metal parts keep their maps)
//!
//! Vertex data itself is left to the renderer. A node whose mesh has several
//! primitives gets one child per primitive named `{node}_{index}`, so the
//! naming convention still classifies each part.
//!
//! ## Up Axis
//!
//! Product models are authored Z-up. [`LoadOptions::root_rotation`] is
//! pre-multiplied onto every root (−90° about X by default).

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::mpsc;

use image::ColorType;

use crate::environment::EnvironmentMap;
use crate::error::LoadError;
use crate::material::{StandardMaterial, TextureRef};
use crate::math::{Color, Quat, Transform, Vec3, srgb_to_linear};
use crate::scene::{LoadedAsset, Mesh, NodeId};
use crate::session::ViewerSession;

/// Options for [`load_gltf`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Rotation applied on top of every root node.
    pub root_rotation: Quat,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            root_rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        }
    }
}

/// Load a glTF/GLB file into a [`LoadedAsset`].
pub fn load_gltf(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedAsset, LoadError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let gltf = gltf::Gltf::open(path).map_err(|source| LoadError::Gltf {
        path: path_str.clone(),
        source,
    })?;

    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("gltf")
        .to_string();
    let mut asset = LoadedAsset::new(name);

    let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) else {
        log::warn!("glTF '{path_str}' contains no scene");
        return Ok(asset);
    };

    // Breadth-first so sibling order is preserved.
    let mut queue: VecDeque<(gltf::Node, Option<NodeId>)> =
        scene.nodes().map(|node| (node, None)).collect();

    while let Some((node, parent)) = queue.pop_front() {
        let node_name = node_name(&node);
        let id = asset.add_node(parent, node_name.clone(), node_transform(&node));

        if let Some(mesh) = node.mesh() {
            let primitives: Vec<_> = mesh.primitives().collect();
            if let [primitive] = primitives.as_slice() {
                asset.set_mesh(id, read_primitive(&path_str, &node_name, primitive)?);
            } else {
                for (index, primitive) in primitives.iter().enumerate() {
                    let part_name = format!("{node_name}_{index}");
                    let part = read_primitive(&path_str, &part_name, primitive)?;
                    asset.add_mesh(Some(id), part_name, part);
                }
            }
        }

        queue.extend(node.children().map(|child| (child, Some(id))));
    }

    asset.rotate_roots(options.root_rotation);
    log::debug!(
        "Loaded glTF '{path_str}': {} nodes, {} meshes",
        asset.node_count(),
        asset.mesh_count()
    );
    Ok(asset)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .or_else(|| node.mesh().and_then(|mesh| mesh.name()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn node_transform(node: &gltf::Node) -> Transform {
    let (translation, rotation, scale) = node.transform().decomposed();
    Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    }
}

fn read_primitive(
    path: &str,
    mesh_name: &str,
    primitive: &gltf::Primitive,
) -> Result<Mesh, LoadError> {
    let vertex_count = primitive
        .get(&gltf::Semantic::Positions)
        .map(|accessor| accessor.count())
        .ok_or_else(|| LoadError::MissingAttribute {
            path: path.to_string(),
            mesh: mesh_name.to_string(),
            attribute: "POSITION",
        })?;
    let index_count = primitive
        .indices()
        .map(|accessor| accessor.count())
        .unwrap_or(vertex_count);

    Ok(Mesh::new(read_material(&primitive.material())).with_counts(vertex_count, index_count))
}

/// glTF color factors are linear; they are encoded to sRGB like every other
/// [`Color`] in the crate.
fn read_material(material: &gltf::Material) -> StandardMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let [er, eg, eb] = material.emissive_factor();

    StandardMaterial {
        name: material.name().map(str::to_string),
        color: Color::from_linear(r, g, b),
        opacity: a,
        color_texture: pbr
            .base_color_texture()
            .map(|info| TextureRef(info.texture().index())),
        metallic_roughness_texture: pbr
            .metallic_roughness_texture()
            .map(|info| TextureRef(info.texture().index())),
        normal_texture: material
            .normal_texture()
            .map(|info| TextureRef(info.texture().index())),
        occlusion_texture: material
            .occlusion_texture()
            .map(|info| TextureRef(info.texture().index())),
        emissive: Color::from_linear(er, eg, eb),
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        ..Default::default()
    }
}

/// Decode an equirectangular HDR (or any format `image` reads) into linear RGB.
///
/// Float images (Radiance HDR) are already linear. Integer images (PNG, JPEG)
/// are sRGB-encoded and get decoded per channel.
pub fn load_environment_map(path: impl AsRef<Path>) -> Result<EnvironmentMap, LoadError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| LoadError::Image {
        path: path.display().to_string(),
        source,
    })?;
    let linear = matches!(image.color(), ColorType::Rgb32F | ColorType::Rgba32F);
    let rgb = image.to_rgb32f();
    let (width, height) = rgb.dimensions();
    let texels = rgb
        .pixels()
        .map(|p| if linear { p.0 } else { p.0.map(srgb_to_linear) })
        .collect();
    Ok(EnvironmentMap::new(path.display().to_string(), width, height, texels))
}

// ── Background loading ───────────────────────────────────────────────────

/// Result of one background load.
#[derive(Debug)]
pub enum LoadEvent {
    Asset(Result<LoadedAsset, LoadError>),
    Environment(Result<EnvironmentMap, LoadError>),
}

/// Runs loads on worker threads and collects their results.
pub struct AssetLoader {
    tx: mpsc::Sender<LoadEvent>,
    rx: mpsc::Receiver<LoadEvent>,
    /// Loads spawned but not yet received.
    pending: usize,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    /// Start loading a glTF asset.
    pub fn spawn_asset(&mut self, path: impl Into<String>, options: LoadOptions) {
        self.spawn(
            path.into(),
            move |path| LoadEvent::Asset(load_gltf(path, &options)),
            |e| LoadEvent::Asset(Err(e)),
        );
    }

    /// Start decoding an environment map.
    pub fn spawn_environment(&mut self, path: impl Into<String>) {
        self.spawn(
            path.into(),
            |path| LoadEvent::Environment(load_environment_map(path)),
            |e| LoadEvent::Environment(Err(e)),
        );
    }

    /// Run `job` on a worker thread. Every spawned job sends exactly one
    /// event; a panicking job sends `on_panic(WorkerPanicked)` instead.
    fn spawn(
        &mut self,
        path: String,
        job: impl FnOnce(&str) -> LoadEvent + Send + 'static,
        on_panic: fn(LoadError) -> LoadEvent,
    ) {
        let tx = self.tx.clone();
        self.pending += 1;
        std::thread::spawn(move || {
            let event = std::panic::catch_unwind(AssertUnwindSafe(|| job(&path)))
                .unwrap_or_else(|_| {
                    log::error!("Loader thread for '{path}' panicked");
                    on_panic(LoadError::WorkerPanicked { path: path.clone() })
                });
            // Ignore send errors (loader dropped).
            let _ = tx.send(event);
        });
    }

    /// Drain finished loads without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let events: Vec<_> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(events.len());
        events
    }

    /// Block until the next load finishes. `None` if nothing is pending.
    pub fn wait(&mut self) -> Option<LoadEvent> {
        if self.pending == 0 {
            return None;
        }
        let event = self.rx.recv().ok()?;
        self.pending -= 1;
        Some(event)
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerSession {
    /// Hand over one finished load. Failures are logged and dropped.
    pub fn handle_load(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Asset(Ok(asset)) => self.asset_ready(asset),
            LoadEvent::Environment(Ok(environment)) => self.environment_ready(environment),
            LoadEvent::Asset(Err(e)) => log::error!("Asset load failed: {e}"),
            LoadEvent::Environment(Err(e)) => log::error!("Environment map load failed: {e}"),
        }
    }

    /// Drain the loader and hand over whatever finished. Returns the number of
    /// events processed.
    pub fn poll_loads(&mut self, loader: &mut AssetLoader) -> usize {
        let events = loader.poll();
        let count = events.len();
        for event in events {
            self.handle_load(event);
        }
        count
    }
}
