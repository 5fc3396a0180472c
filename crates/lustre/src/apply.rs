//! # Applicator — Configuration onto Meshes
//!
//! [`apply_appearance`] is the only code path that writes mesh materials.
//! It makes one breadth-first pass over the asset:
//!
//! ```text
//!   for each mesh:
//!     classify(name)
//!       Gem       ──► material = synthesize_gem_material(tint, gem type)
//!       Metal     ──► synthesize_metal_patch(alloy, finish).apply(material)
//!       Unhandled ──► untouched, noted in the report
//! ```
//!
//! The gem material and metal patch are synthesized once per pass, not once
//! per mesh; every mesh of a class receives equal values.
//!
//! ## Idempotence
//!
//! Gem materials are replaced wholesale and metal patches overwrite the same
//! fields with the same values, so applying an unchanged configuration twice
//! leaves every material equal to the first result.
//!
//! ## Scope
//!
//! [`ApplyScope`] narrows a pass to one class. A gem-only pass writes exactly
//! what a full pass would write to gems and nothing else. The [`ApplyReport`]
//! still classifies every mesh, so its counts are the same for every scope.
//!
//! ## Missing Asset
//!
//! Before the asset arrives there is nothing to apply to. The call returns an
//! empty report instead of failing.

use serde::Serialize;

use crate::appearance::AppearanceTables;
use crate::classify::{Classifier, MeshClass};
use crate::config::ConfigurationState;
use crate::material::EnvMapHandle;
use crate::scene::LoadedAsset;
use crate::synth::{synthesize_gem_material, synthesize_metal_patch};

/// Which mesh classes a pass writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ApplyScope {
    #[default]
    All,
    Gems,
    Metals,
}

impl ApplyScope {
    fn includes(self, class: MeshClass) -> bool {
        match (self, class) {
            (_, MeshClass::Unhandled) => false,
            (ApplyScope::All, _) => true,
            (ApplyScope::Gems, MeshClass::Gem) => true,
            (ApplyScope::Metals, MeshClass::Metal) => true,
            _ => false,
        }
    }
}

/// What a pass touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    /// `false` when no asset was loaded yet and the pass did nothing.
    pub asset_present: bool,
    /// Meshes classified as gem. Counted whether or not the scope wrote them.
    pub gems: usize,
    /// Meshes classified as metal. Counted whether or not the scope wrote them.
    pub metals: usize,
    /// Meshes left untouched because neither convention matched.
    pub unhandled: Vec<String>,
}

impl ApplyReport {
    /// Meshes classified in this pass, whether written or not.
    pub fn total(&self) -> usize {
        self.gems + self.metals + self.unhandled.len()
    }
}

/// Everything a pass needs besides the asset itself.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub tables: &'a AppearanceTables,
    pub classifier: &'a Classifier,
    pub env_map: Option<EnvMapHandle>,
}

/// Apply `config` to every matching mesh of `asset`.
pub fn apply_appearance(
    asset: Option<&mut LoadedAsset>,
    config: &ConfigurationState,
    ctx: ApplyContext<'_>,
    scope: ApplyScope,
) -> ApplyReport {
    let Some(asset) = asset else {
        log::debug!("No asset loaded yet, skipping {scope:?} apply");
        return ApplyReport::default();
    };

    let gem_material =
        synthesize_gem_material(ctx.tables, config.gem_tint, &config.gem_type, ctx.env_map);
    let metal_patch =
        synthesize_metal_patch(ctx.tables, &config.metal_alloy, config.finish, ctx.env_map);

    let mut report = ApplyReport {
        asset_present: true,
        ..Default::default()
    };

    asset.for_each_mesh_mut(|_, name, mesh| {
        let class = ctx.classifier.classify(name);
        match class {
            MeshClass::Gem => {
                report.gems += 1;
                if scope.includes(class) {
                    mesh.replace_material(gem_material.clone());
                }
            }
            MeshClass::Metal => {
                report.metals += 1;
                if scope.includes(class) {
                    metal_patch.apply(mesh.material_mut());
                }
            }
            MeshClass::Unhandled => {
                log::debug!("Mesh '{name}' matches no appearance group, leaving its material");
                report.unhandled.push(name.to_string());
            }
        }
    });

    log::debug!(
        "Applied {scope:?} to '{}': {} gems, {} metals, {} unhandled",
        asset.name(),
        report.gems,
        report.metals,
        report.unhandled.len()
    );
    report
}
