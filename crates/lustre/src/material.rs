//! # Materials — What the Renderer Reads Each Frame
//!
//! Every mesh owns exactly one [`Material`]. Two shading models exist:
//!
//! - [`StandardMaterial`]: the metallic-roughness material authored in the
//!   asset (glTF 2.0 `pbrMetallicRoughness`), including any texture maps.
//!   Metal parts keep this material and have select fields overwritten.
//! - [`PhysicalMaterial`]: a transmissive dielectric with refraction,
//!   absorption and clearcoat. Gem parts get a freshly built one each time the
//!   configuration changes; whatever the asset shipped with is discarded.
//!
//! ## Quick Guide
//!
//! | Surface | model | metalness | roughness | transmission |
//! |---------|-------|-----------|-----------|--------------|
//! | Polished gold | Standard | 1.0 | 0.1 | — |
//! | Brushed platinum | Standard | 1.0 | 0.8 | — |
//! | Diamond | Physical | 0.0 | 0.01 | 1.0 |
//!
//! ## Comparison
//!
//! - **three.js**: `MeshStandardMaterial` and `MeshPhysicalMaterial`, the same
//!   split. Field names here follow three.js where they overlap.
//! - **glTF**: the physical fields map onto `KHR_materials_transmission`,
//!   `KHR_materials_volume`, `KHR_materials_ior` and `KHR_materials_clearcoat`.

use serde::{Deserialize, Serialize};

use crate::math::Color;

/// Reference to a loaded environment reflection map.
///
/// Handles are indices handed out by the loader. Two materials linking the
/// same map compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvMapHandle(pub u32);

/// Reference to a texture inside the loaded asset (glTF texture index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureRef(pub usize);

/// Asset-authored metallic-roughness material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    /// Material name from the asset, if any.
    pub name: Option<String>,
    pub color: Color,
    pub opacity: f32,
    pub color_texture: Option<TextureRef>,
    pub metallic_roughness_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub occlusion_texture: Option<TextureRef>,
    pub emissive: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub env_map: Option<EnvMapHandle>,
    pub env_map_intensity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        // glTF defaults: white, fully metallic, fully rough.
        Self {
            name: None,
            color: Color::WHITE,
            opacity: 1.0,
            color_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive: Color::BLACK,
            metalness: 1.0,
            roughness: 1.0,
            env_map: None,
            env_map_intensity: 1.0,
        }
    }
}

/// Transmissive dielectric used for gem parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub ior: f32,
    /// Fraction of light passing through the surface (1.0 = clear stone).
    pub transmission: f32,
    /// Simulated volume depth used for refraction.
    pub thickness: f32,
    pub attenuation_distance: f32,
    /// Color light takes on while traveling through the volume.
    pub attenuation_color: Color,
    pub reflectivity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub specular_intensity: f32,
    pub specular_color: Color,
    pub env_map: Option<EnvMapHandle>,
    pub env_map_intensity: f32,
    pub transparent: bool,
}

/// The material slot of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Material {
    Standard(StandardMaterial),
    Physical(PhysicalMaterial),
}

impl Material {
    pub fn color(&self) -> Color {
        match self {
            Material::Standard(m) => m.color,
            Material::Physical(m) => m.color,
        }
    }

    pub fn roughness(&self) -> f32 {
        match self {
            Material::Standard(m) => m.roughness,
            Material::Physical(m) => m.roughness,
        }
    }

    pub fn env_map(&self) -> Option<EnvMapHandle> {
        match self {
            Material::Standard(m) => m.env_map,
            Material::Physical(m) => m.env_map,
        }
    }

    pub fn as_physical(&self) -> Option<&PhysicalMaterial> {
        match self {
            Material::Physical(m) => Some(m),
            Material::Standard(_) => None,
        }
    }

    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            Material::Physical(_) => None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Standard(StandardMaterial::default())
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Material::Standard(material)
    }
}

impl From<PhysicalMaterial> for Material {
    fn from(material: PhysicalMaterial) -> Self {
        Material::Physical(material)
    }
}
