//! # Material Synthesis
//!
//! Turns the current semantic choices into material data. Gems and metals are
//! handled with two different ownership modes:
//!
//! ```text
//!   gem:   (tint, gem type) ──► PhysicalMaterial ──► replaces the mesh material
//!   metal: (alloy, finish)  ──► MetalPatch       ──► overwrites 5 fields in place
//! ```
//!
//! Gem parts are rebuilt from scratch because the transmissive model has
//! nothing in common with the placeholder the asset ships. Metal parts keep
//! their authored material (texture, normal and occlusion maps stay bound)
//! and only tint, roughness, metalness and environment linkage change.
//!
//! Both functions are pure. Given the same inputs they produce equal values,
//! which is what makes re-applying a configuration idempotent.

use serde::Serialize;

use crate::appearance::{AppearanceTables, Finish};
use crate::material::{EnvMapHandle, Material, PhysicalMaterial};
use crate::math::Color;

/// Build the full gem material.
///
/// `tint` overrides the table tint; the table only supplies depth parameters.
/// The attenuation color follows the tint so the stone glows in its own color.
pub fn synthesize_gem_material(
    tables: &AppearanceTables,
    tint: Color,
    gem_type: &str,
    env_map: Option<EnvMapHandle>,
) -> PhysicalMaterial {
    let gem = tables.lookup_gem(gem_type);
    let optics = tables.gem_optics();

    PhysicalMaterial {
        color: tint,
        metalness: 0.0,
        roughness: optics.roughness,
        ior: optics.ior,
        transmission: optics.transmission,
        thickness: gem.thickness,
        attenuation_distance: gem.attenuation_distance,
        attenuation_color: tint,
        reflectivity: optics.reflectivity,
        clearcoat: optics.clearcoat,
        clearcoat_roughness: optics.clearcoat_roughness,
        specular_intensity: optics.specular_intensity,
        specular_color: optics.specular_color,
        env_map,
        env_map_intensity: optics.env_map_intensity,
        transparent: optics.transparent,
    }
}

/// The subset of material fields a metal part receives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetalPatch {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map: Option<EnvMapHandle>,
    pub env_map_intensity: f32,
}

impl MetalPatch {
    /// Overwrite the patched fields, leaving everything else as authored.
    pub fn apply(&self, material: &mut Material) {
        match material {
            Material::Standard(m) => {
                m.color = self.color;
                m.roughness = self.roughness;
                m.metalness = self.metalness;
                m.env_map = self.env_map;
                m.env_map_intensity = self.env_map_intensity;
            }
            Material::Physical(m) => {
                m.color = self.color;
                m.roughness = self.roughness;
                m.metalness = self.metalness;
                m.env_map = self.env_map;
                m.env_map_intensity = self.env_map_intensity;
            }
        }
    }
}

/// Build the metal patch. Alloy picks the tint, finish picks the surface.
pub fn synthesize_metal_patch(
    tables: &AppearanceTables,
    alloy: &str,
    finish: Finish,
    env_map: Option<EnvMapHandle>,
) -> MetalPatch {
    let metal = tables.lookup_metal(alloy);
    let (roughness, metalness) = finish.surface();

    MetalPatch {
        color: metal.tint,
        roughness,
        metalness,
        env_map,
        env_map_intensity: tables.metal_optics().env_map_intensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::{GemOptics, MetalOptics};
    use crate::material::{StandardMaterial, TextureRef};

    #[test]
    fn gem_material_takes_tint_from_caller_and_depth_from_table() {
        let tables = AppearanceTables::default();
        let tint = Color::from_u32(0x123456);
        let gem = synthesize_gem_material(&tables, tint, "blue", None);

        assert_eq!(gem.color, tint);
        assert_eq!(gem.attenuation_color, tint);
        assert_eq!(gem.thickness, 2.5);
        assert_eq!(gem.attenuation_distance, 0.2);
        assert_eq!(gem.metalness, 0.0);
        assert_eq!(gem.transmission, 1.0);
        assert!(gem.roughness < 0.05);
        assert_eq!(gem.clearcoat, 1.0);
        assert_eq!(gem.env_map_intensity, 5.0);
    }

    #[test]
    fn gem_material_for_unknown_type_uses_white_depths() {
        let tables = AppearanceTables::default();
        let gem = synthesize_gem_material(&tables, Color::WHITE, "opal", Some(EnvMapHandle(3)));
        assert_eq!(gem.thickness, 2.0);
        assert_eq!(gem.attenuation_distance, 0.4);
        assert_eq!(gem.env_map, Some(EnvMapHandle(3)));
    }

    #[test]
    fn gem_synthesis_is_deterministic() {
        let tables = AppearanceTables::default();
        let tint = Color::from_u32(0xfacbf3);
        assert_eq!(
            synthesize_gem_material(&tables, tint, "pink", None),
            synthesize_gem_material(&tables, tint, "pink", None)
        );
    }

    #[test]
    fn metal_patch_keeps_authored_maps() {
        let tables = AppearanceTables::default();
        let mut material = Material::Standard(StandardMaterial {
            name: Some("Band".into()),
            color_texture: Some(TextureRef(0)),
            normal_texture: Some(TextureRef(1)),
            ..Default::default()
        });

        let patch = synthesize_metal_patch(&tables, "rose", Finish::Brushed, Some(EnvMapHandle(0)));
        patch.apply(&mut material);

        let m = material.as_standard().unwrap();
        assert_eq!(m.color, Color::from_u32(0xb76e79));
        assert_eq!(m.roughness, 0.8);
        assert_eq!(m.metalness, 1.0);
        assert_eq!(m.env_map, Some(EnvMapHandle(0)));
        assert_eq!(m.env_map_intensity, 4.0);
        assert_eq!(m.color_texture, Some(TextureRef(0)));
        assert_eq!(m.normal_texture, Some(TextureRef(1)));
        assert_eq!(m.name.as_deref(), Some("Band"));
    }

    #[test]
    fn optics_overrides_reach_synthesized_materials() {
        let tables = AppearanceTables::default()
            .with_gem_optics(GemOptics {
                ior: 1.77,
                transparent: true,
                ..GemOptics::default()
            })
            .with_metal_optics(MetalOptics {
                env_map_intensity: 1.5,
            });

        let gem = synthesize_gem_material(&tables, Color::WHITE, "white", None);
        assert_eq!(gem.ior, 1.77);
        assert!(gem.transparent);
        // Untouched constants keep their defaults.
        assert_eq!(gem.transmission, 1.0);
        assert_eq!(gem.env_map_intensity, 5.0);

        let patch = synthesize_metal_patch(&tables, "gold", Finish::Polished, None);
        assert_eq!(patch.env_map_intensity, 1.5);
    }

    #[test]
    fn finish_does_not_change_tint() {
        let tables = AppearanceTables::default();
        let polished = synthesize_metal_patch(&tables, "gold", Finish::Polished, None);
        let brushed = synthesize_metal_patch(&tables, "gold", Finish::Brushed, None);
        assert_eq!(polished.color, brushed.color);
        assert_ne!(polished.roughness, brushed.roughness);
    }
}
