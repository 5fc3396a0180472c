//! # Viewer Session — The Control Surface
//!
//! A [`ViewerSession`] owns everything one configurator instance needs: the
//! appearance tables, the classifier, the [`ConfigurationState`], and (once
//! loading completes) the asset and environment map.
//!
//! ```text
//!   loader ──asset_ready──────► ViewerSession ──apply_appearance──► meshes
//!   loader ──environment_ready─►     ▲   │
//!                                    │   ├──► CameraControl (auto-rotate, reset)
//!   UI ──set_gem_color / ... ────────┘   └──► ControlPanel  (select defaults)
//! ```
//!
//! ## Operations
//!
//! Each control operation updates the state and then re-runs the applicator
//! before returning. The applicator cannot fail, so the state and the meshes
//! never disagree after a call. Operations never touch materials directly.
//!
//! ## Before Loading Completes
//!
//! Every operation works without an asset: the state still changes and the
//! applicator pass is an empty no-op. When the asset arrives, it is styled
//! with whatever the state is at that moment.
//!
//! ## Collaborators
//!
//! Camera input and UI widgets live outside this crate. They are reached
//! through [`CameraControl`] and [`ControlPanel`]; a session without them
//! uses [`Detached`], which ignores every call.

use crate::appearance::{AppearanceTables, Finish};
use crate::apply::{ApplyContext, ApplyReport, ApplyScope, apply_appearance};
use crate::classify::Classifier;
use crate::config::ConfigurationState;
use crate::environment::EnvironmentMap;
use crate::math::Color;
use crate::scene::LoadedAsset;

#[cfg(feature = "diagnostics")]
use crate::diag::ApplyLog;

/// The orbit camera owned by the host application.
pub trait CameraControl {
    fn set_auto_rotate(&mut self, enabled: bool);

    /// Return to the initial view.
    fn reset(&mut self) {}
}

/// The option widgets owned by the host application.
pub trait ControlPanel {
    /// Re-select the controls matching `state`.
    fn select_defaults(&mut self, state: &ConfigurationState);

    /// Show or hide the loading indicator.
    fn set_loading(&mut self, _loading: bool) {}
}

/// Stand-in collaborator that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl CameraControl for Detached {
    fn set_auto_rotate(&mut self, _enabled: bool) {}
}

impl ControlPanel for Detached {
    fn select_defaults(&mut self, _state: &ConfigurationState) {}
}

/// One configurator instance.
pub struct ViewerSession {
    tables: AppearanceTables,
    classifier: Classifier,
    state: ConfigurationState,
    asset: Option<LoadedAsset>,
    environment: Option<EnvironmentMap>,
    camera: Box<dyn CameraControl>,
    panel: Box<dyn ControlPanel>,
    #[cfg(feature = "diagnostics")]
    apply_log: ApplyLog,
}

impl ViewerSession {
    /// Create a session in the startup default state, with no asset yet.
    pub fn new(tables: AppearanceTables) -> Self {
        let state = ConfigurationState::new(&tables);
        Self {
            tables,
            classifier: Classifier::default(),
            state,
            asset: None,
            environment: None,
            camera: Box::new(Detached),
            panel: Box::new(Detached),
            #[cfg(feature = "diagnostics")]
            apply_log: ApplyLog::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_camera(mut self, camera: impl CameraControl + 'static) -> Self {
        self.camera = Box::new(camera);
        self
    }

    pub fn with_panel(mut self, panel: impl ControlPanel + 'static) -> Self {
        self.panel = Box::new(panel);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> &ConfigurationState {
        &self.state
    }

    pub fn tables(&self) -> &AppearanceTables {
        &self.tables
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The loaded asset, read-only. `None` until [`asset_ready`](Self::asset_ready).
    pub fn asset(&self) -> Option<&LoadedAsset> {
        self.asset.as_ref()
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.asset.is_some()
    }

    #[cfg(feature = "diagnostics")]
    pub fn apply_log(&self) -> &ApplyLog {
        &self.apply_log
    }

    // ── Loader handoff ───────────────────────────────────────────────

    /// Take ownership of the loaded asset and style it with the current state.
    ///
    /// Only the first asset is accepted; later handoffs are logged and dropped.
    pub fn asset_ready(&mut self, asset: LoadedAsset) {
        if let Some(current) = &self.asset {
            log::warn!(
                "Ignoring asset '{}': '{}' is already loaded",
                asset.name(),
                current.name()
            );
            return;
        }
        log::info!(
            "Asset '{}' ready ({} nodes, {} meshes)",
            asset.name(),
            asset.node_count(),
            asset.mesh_count()
        );
        self.asset = Some(asset);
        let report = self.apply("asset_ready", ApplyScope::All);
        for name in &report.unhandled {
            log::info!("Mesh '{name}' is not configurable");
        }
        self.panel.set_loading(false);
    }

    /// Take the environment map and link it into every handled material.
    pub fn environment_ready(&mut self, environment: EnvironmentMap) {
        if let Some(current) = &self.environment {
            log::warn!(
                "Ignoring environment map '{}': '{}' is already loaded",
                environment.source,
                current.source
            );
            return;
        }
        let [r, g, b] = environment.average_radiance();
        log::info!(
            "Environment map '{}' ready ({}x{}, mean radiance {r:.3} {g:.3} {b:.3})",
            environment.source,
            environment.width,
            environment.height
        );
        self.environment = Some(environment);
        self.apply("environment_ready", ApplyScope::All);
    }

    // ── Control surface ──────────────────────────────────────────────

    /// Restyle every gem with an explicit tint and the depth data of `gem_type`.
    pub fn set_gem_color(&mut self, tint: Color, gem_type: &str) {
        log::debug!("set_gem_color({tint}, {gem_type})");
        self.state.gem_tint = tint;
        self.state.gem_type = gem_type.to_string();
        self.apply("set_gem_color", ApplyScope::Gems);
    }

    /// Restyle every gem as `gem_type` in that type's table tint.
    pub fn set_gem_type(&mut self, gem_type: &str) {
        let tint = self.tables.lookup_gem(gem_type).tint;
        self.set_gem_color(tint, gem_type);
    }

    /// Retint every metal part. The finish is kept.
    pub fn set_metal_color(&mut self, alloy: &str) {
        log::debug!("set_metal_color({alloy})");
        self.state.metal_alloy = alloy.to_string();
        self.apply("set_metal_color", ApplyScope::Metals);
    }

    /// Change roughness/metalness of every metal part. The alloy is kept.
    pub fn set_metal_finish(&mut self, finish: Finish) {
        log::debug!("set_metal_finish({finish})");
        self.state.finish = finish;
        self.apply("set_metal_finish", ApplyScope::Metals);
    }

    /// Flip camera auto-rotation. Materials are not touched.
    ///
    /// Returns the new flag.
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.state.auto_rotate = !self.state.auto_rotate;
        log::debug!("toggle_auto_rotate -> {}", self.state.auto_rotate);
        self.camera.set_auto_rotate(self.state.auto_rotate);
        self.state.auto_rotate
    }

    /// Restore the startup configuration, restyle, and reset camera and UI.
    pub fn reset_viewer(&mut self) {
        log::debug!("reset_viewer");
        self.state.reset(&self.tables);
        self.apply("reset_viewer", ApplyScope::All);
        self.camera.set_auto_rotate(self.state.auto_rotate);
        self.camera.reset();
        self.panel.select_defaults(&self.state);
    }

    fn apply(&mut self, operation: &'static str, scope: ApplyScope) -> ApplyReport {
        let ctx = ApplyContext {
            tables: &self.tables,
            classifier: &self.classifier,
            env_map: self.environment.as_ref().map(EnvironmentMap::handle),
        };
        let report = apply_appearance(self.asset.as_mut(), &self.state, ctx, scope);
        self.record(operation, scope, &report);
        report
    }

    #[cfg(feature = "diagnostics")]
    fn record(&mut self, operation: &'static str, scope: ApplyScope, report: &ApplyReport) {
        if report.asset_present {
            self.apply_log.record(operation, scope, report.clone());
        }
    }

    #[cfg(not(feature = "diagnostics"))]
    fn record(&mut self, _operation: &'static str, _scope: ApplyScope, _report: &ApplyReport) {}
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(AppearanceTables::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::material::{Material, StandardMaterial};
    use crate::math::Transform;
    use crate::scene::Mesh;

    #[derive(Default)]
    struct Calls {
        auto_rotate: Vec<bool>,
        camera_resets: usize,
        panel_defaults: Vec<ConfigurationState>,
        loading: Vec<bool>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Calls>>);

    impl CameraControl for Recorder {
        fn set_auto_rotate(&mut self, enabled: bool) {
            self.0.borrow_mut().auto_rotate.push(enabled);
        }

        fn reset(&mut self) {
            self.0.borrow_mut().camera_resets += 1;
        }
    }

    impl ControlPanel for Recorder {
        fn select_defaults(&mut self, state: &ConfigurationState) {
            self.0.borrow_mut().panel_defaults.push(state.clone());
        }

        fn set_loading(&mut self, loading: bool) {
            self.0.borrow_mut().loading.push(loading);
        }
    }

    fn ring() -> LoadedAsset {
        let authored = StandardMaterial {
            color: Color::from_u32(0x555555),
            roughness: 0.5,
            metalness: 0.5,
            ..Default::default()
        };
        let mut asset = LoadedAsset::new("ring.glb");
        let root = asset.add_node(None, "Ring", Transform::IDENTITY);
        asset.add_mesh(Some(root), "Diamond_Round", Mesh::new(authored.clone()));
        asset.add_mesh(Some(root), "metal_band", Mesh::new(authored.clone()));
        asset.add_mesh(Some(root), "bezel", Mesh::new(authored));
        asset
    }

    fn material<'a>(session: &'a ViewerSession, name: &str) -> &'a Material {
        session.asset().unwrap().mesh_named(name).unwrap().material()
    }

    #[test]
    fn operations_before_load_only_update_state() {
        let mut session = ViewerSession::default();
        session.set_gem_color(Color::from_u32(0x167d9e), "blue");
        session.set_metal_color("gold");
        session.set_metal_finish(Finish::Brushed);
        assert!(!session.is_loaded());
        assert_eq!(session.state().gem_type, "blue");
        assert_eq!(session.state().metal_alloy, "gold");

        // The asset picks up the state at handoff.
        session.asset_ready(ring());
        let gem = material(&session, "Diamond_Round").as_physical().unwrap();
        assert_eq!(gem.color, Color::from_u32(0x167d9e));
        let band = material(&session, "metal_band");
        assert_eq!(band.color(), Color::from_u32(0xffc133));
        assert_eq!(band.roughness(), 0.8);
    }

    #[test]
    fn toggle_twice_without_asset_restores_flag() {
        let calls = Recorder::default();
        let mut session = ViewerSession::default().with_camera(calls.clone());
        let original = session.state().auto_rotate;

        assert!(session.toggle_auto_rotate());
        assert!(!session.toggle_auto_rotate());
        assert_eq!(session.state().auto_rotate, original);
        assert_eq!(calls.0.borrow().auto_rotate, [true, false]);
    }

    #[test]
    fn reset_restores_startup_state_exactly() {
        let calls = Recorder::default();
        let mut session = ViewerSession::default()
            .with_camera(calls.clone())
            .with_panel(calls.clone());
        let startup = session.state().clone();
        session.asset_ready(ring());
        let startup_band = material(&session, "metal_band").clone();

        session.set_gem_color(Color::from_u32(0x00674f), "green");
        session.set_metal_color("rose");
        session.set_metal_finish(Finish::Brushed);
        session.toggle_auto_rotate();
        session.reset_viewer();

        assert_eq!(session.state(), &startup);
        assert_eq!(material(&session, "metal_band"), &startup_band);
        let calls = calls.0.borrow();
        assert_eq!(calls.camera_resets, 1);
        assert_eq!(calls.panel_defaults, [startup]);
        assert_eq!(calls.auto_rotate.last(), Some(&false));
        assert_eq!(calls.loading, [false]);
    }

    #[test]
    fn finish_change_keeps_alloy_tint() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        session.set_metal_color("gold");
        let before = material(&session, "metal_band").as_standard().unwrap().clone();

        session.set_metal_finish(Finish::Brushed);
        let after = material(&session, "metal_band").as_standard().unwrap().clone();

        assert_eq!(after.color, before.color);
        assert_eq!(after.roughness, 0.8);
        let restored = StandardMaterial {
            roughness: before.roughness,
            metalness: before.metalness,
            ..after
        };
        assert_eq!(restored, before);
    }

    #[test]
    fn alloy_change_keeps_finish() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        session.set_metal_finish(Finish::Brushed);
        session.set_metal_color("platinum");
        assert_eq!(session.state().finish, Finish::Brushed);
        assert_eq!(material(&session, "metal_band").roughness(), 0.8);
    }

    #[test]
    fn unhandled_mesh_is_never_written() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        let bezel = material(&session, "bezel").clone();
        session.set_gem_type("cognac");
        session.set_metal_color("silver");
        session.reset_viewer();
        assert_eq!(material(&session, "bezel"), &bezel);
    }

    #[test]
    fn set_gem_type_uses_table_tint() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        session.set_gem_type("champagne");
        assert_eq!(session.state().gem_tint, Color::from_u32(0xf2d2b6));
        let gem = material(&session, "Diamond_Round").as_physical().unwrap();
        assert_eq!(gem.thickness, 2.0);
        assert_eq!(gem.attenuation_distance, 0.2);
    }

    #[test]
    fn late_environment_is_linked_into_handled_materials() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        assert_eq!(material(&session, "metal_band").env_map(), None);

        let env = EnvironmentMap::new("studio.hdr", 1, 1, vec![[1.0; 3]]);
        let handle = env.handle();
        session.environment_ready(env);

        assert_eq!(material(&session, "metal_band").env_map(), Some(handle));
        assert_eq!(material(&session, "Diamond_Round").env_map(), Some(handle));
        assert_eq!(material(&session, "bezel").env_map(), None);
    }

    #[test]
    fn second_asset_is_ignored() {
        let mut session = ViewerSession::default();
        session.asset_ready(ring());
        session.asset_ready(LoadedAsset::new("other.glb"));
        assert_eq!(session.asset().unwrap().name(), "ring.glb");
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn passes_are_logged_once_loaded() {
        let mut session = ViewerSession::default();
        session.set_metal_color("gold");
        assert!(session.apply_log().is_empty());

        session.asset_ready(ring());
        session.set_metal_color("rose");
        let last = session.apply_log().last().unwrap();
        assert_eq!(last.operation, "set_metal_color");
        assert_eq!(last.scope, ApplyScope::Metals);
        assert_eq!(last.report.unhandled, ["bezel"]);
        assert_eq!(session.apply_log().len(), 2);
    }
}
