//! # Appearance Tables — Semantic Parameters to Optical Data
//!
//! The configurator exposes a handful of semantic choices (gem type, metal
//! alloy, finish). This module maps each choice to the numbers the material
//! synthesizer needs.
//!
//! ```text
//!   gem type ("blue") ──► GemAppearance { tint, attenuation_distance, thickness }
//!   alloy ("rose")    ──► MetalAppearance { tint }
//!   finish            ──► (roughness, metalness)
//! ```
//!
//! ## Fallback on Miss
//!
//! Lookups are total. An identifier that isn't in the table resolves to the
//! fallback record (`white` for gems, `white-gold` for metals), so malformed
//! or future UI input never leaves a mesh without a material.
//!
//! Loaded tables are validated: both fallback keys must exist and every gem
//! needs a finite, positive attenuation distance and thickness.
//!
//! ## Identifier Matching
//!
//! Keys are compared after lowercasing and dropping everything that isn't a
//! letter or digit: `whiteGold`, `white_gold` and `White-Gold` are one alloy.
//! A table listing two keys that normalize to the same identifier is rejected.
//!
//! ## Tuning
//!
//! The values are hand-tuned for a studio HDR look, not measured spectra.
//! Shared optical constants ([`GemOptics`], [`MetalOptics`]) live next to the
//! tables so a table file can swap them without touching code.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::math::Color;

/// Gem type used when nothing else is known.
pub const DEFAULT_GEM_TYPE: &str = "white";
/// Alloy used when nothing else is known.
pub const DEFAULT_METAL_ALLOY: &str = "white-gold";

/// Optical record for one gem type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GemAppearance {
    /// Default tint for this gem type. Callers may override it.
    pub tint: Color,
    /// Distance at which internal absorption visibly darkens the stone.
    pub attenuation_distance: f32,
    /// Simulated internal path length.
    pub thickness: f32,
}

/// Base tint for one alloy. Roughness and metalness come from [`Finish`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetalAppearance {
    pub tint: Color,
}

/// Surface micro-roughness preset, independent of alloy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    #[default]
    Polished,
    Brushed,
}

impl Finish {
    /// `(roughness, metalness)` for this finish.
    pub fn surface(self) -> (f32, f32) {
        match self {
            Finish::Polished => (0.1, 1.0),
            Finish::Brushed => (0.8, 1.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finish::Polished => "polished",
            Finish::Brushed => "brushed",
        }
    }

    /// Parse a finish identifier, falling back to the default on miss.
    pub fn parse_or_default(text: &str) -> Self {
        text.parse().unwrap_or_else(|_| {
            log::warn!("Unknown finish '{text}', using {}", Finish::default());
            Finish::default()
        })
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Finish {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "polished" => Ok(Finish::Polished),
            "brushed" => Ok(Finish::Brushed),
            _ => Err(s.to_string()),
        }
    }
}

/// Constants shared by every synthesized gem material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemOptics {
    pub roughness: f32,
    pub ior: f32,
    pub transmission: f32,
    pub reflectivity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
    pub specular_intensity: f32,
    pub specular_color: Color,
    /// Alpha-blend flag. Transmission already handles see-through stones.
    pub transparent: bool,
}

impl Default for GemOptics {
    fn default() -> Self {
        Self {
            roughness: 0.01,
            ior: 2.417,
            transmission: 1.0,
            reflectivity: 0.9,
            clearcoat: 1.0,
            clearcoat_roughness: 0.0,
            env_map_intensity: 5.0,
            specular_intensity: 1.0,
            specular_color: Color::WHITE,
            transparent: false,
        }
    }
}

/// Constants shared by every metal patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetalOptics {
    pub env_map_intensity: f32,
}

impl Default for MetalOptics {
    fn default() -> Self {
        Self {
            env_map_intensity: 4.0,
        }
    }
}

/// On-disk shape of a table file, before key normalization and validation.
#[derive(Deserialize)]
struct TablesFile {
    gems: BTreeMap<String, GemAppearance>,
    metals: BTreeMap<String, MetalAppearance>,
    #[serde(default)]
    gem_optics: GemOptics,
    #[serde(default)]
    metal_optics: MetalOptics,
}

impl TryFrom<TablesFile> for AppearanceTables {
    type Error = LoadError;

    fn try_from(file: TablesFile) -> Result<Self, Self::Error> {
        let tables = Self {
            gems: normalize_entries("gems", file.gems)?,
            metals: normalize_entries("metals", file.metals)?,
            gem_optics: file.gem_optics,
            metal_optics: file.metal_optics,
        };
        tables.validate()?;
        Ok(tables)
    }
}

/// The full set of appearance data. Fixed for the lifetime of a session.
///
/// Every instance passes validation; deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TablesFile")]
pub struct AppearanceTables {
    gems: BTreeMap<String, GemAppearance>,
    metals: BTreeMap<String, MetalAppearance>,
    gem_optics: GemOptics,
    metal_optics: MetalOptics,
}

impl AppearanceTables {
    /// Build tables from explicit entries. Keys are normalized on insert.
    ///
    /// Fails if either fallback key is missing, two keys normalize to the
    /// same identifier, or a gem has a non-positive depth parameter.
    pub fn new(
        gems: impl IntoIterator<Item = (String, GemAppearance)>,
        metals: impl IntoIterator<Item = (String, MetalAppearance)>,
    ) -> Result<Self, LoadError> {
        let tables = Self {
            gems: normalize_entries("gems", gems)?,
            metals: normalize_entries("metals", metals)?,
            gem_optics: GemOptics::default(),
            metal_optics: MetalOptics::default(),
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Parse tables from JSON. Keys may use any casing or separators.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let file: TablesFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Load tables from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tables = Self::from_json_str(&json)?;
        log::info!(
            "Loaded appearance tables from '{}' ({} gems, {} alloys)",
            path.display(),
            tables.gems.len(),
            tables.metals.len()
        );
        Ok(tables)
    }

    pub fn with_gem_optics(mut self, optics: GemOptics) -> Self {
        self.gem_optics = optics;
        self
    }

    pub fn with_metal_optics(mut self, optics: MetalOptics) -> Self {
        self.metal_optics = optics;
        self
    }

    fn validate(&self) -> Result<(), LoadError> {
        if !self.gems.contains_key(&normalize_key(DEFAULT_GEM_TYPE)) {
            return Err(LoadError::MissingFallback {
                table: "gems",
                key: DEFAULT_GEM_TYPE,
            });
        }
        if !self.metals.contains_key(&normalize_key(DEFAULT_METAL_ALLOY)) {
            return Err(LoadError::MissingFallback {
                table: "metals",
                key: DEFAULT_METAL_ALLOY,
            });
        }
        for (key, gem) in &self.gems {
            let depths = [
                ("attenuation_distance", gem.attenuation_distance),
                ("thickness", gem.thickness),
            ];
            for (field, value) in depths {
                if !(value.is_finite() && value > 0.0) {
                    return Err(LoadError::InvalidGem {
                        key: key.clone(),
                        field,
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a gem type. Unknown identifiers resolve to the `white` record.
    pub fn lookup_gem(&self, gem_type: &str) -> GemAppearance {
        match self.gems.get(&normalize_key(gem_type)) {
            Some(gem) => *gem,
            None => {
                log::warn!("Unknown gem type '{gem_type}', falling back to '{DEFAULT_GEM_TYPE}'");
                self.gems[&normalize_key(DEFAULT_GEM_TYPE)]
            }
        }
    }

    /// Look up an alloy. Unknown identifiers resolve to the `white-gold` record.
    pub fn lookup_metal(&self, alloy: &str) -> MetalAppearance {
        match self.metals.get(&normalize_key(alloy)) {
            Some(metal) => *metal,
            None => {
                log::warn!("Unknown alloy '{alloy}', falling back to '{DEFAULT_METAL_ALLOY}'");
                self.metals[&normalize_key(DEFAULT_METAL_ALLOY)]
            }
        }
    }

    pub fn has_metal(&self, alloy: &str) -> bool {
        self.metals.contains_key(&normalize_key(alloy))
    }

    /// Normalized gem keys, sorted.
    pub fn gem_types(&self) -> impl Iterator<Item = &str> {
        self.gems.keys().map(String::as_str)
    }

    pub fn gem_optics(&self) -> &GemOptics {
        &self.gem_optics
    }

    pub fn metal_optics(&self) -> &MetalOptics {
        &self.metal_optics
    }
}

impl Default for AppearanceTables {
    fn default() -> Self {
        let gem = |hex, attenuation_distance, thickness| GemAppearance {
            tint: Color::from_u32(hex),
            attenuation_distance,
            thickness,
        };
        let metal = |hex| MetalAppearance {
            tint: Color::from_u32(hex),
        };

        let gems = [
            ("white", gem(0xf5f6f7, 0.4, 2.0)),
            ("pink", gem(0xfacbf3, 0.25, 2.2)),
            ("yellow", gem(0xfffacd, 0.3, 2.0)),
            ("blue", gem(0x167d9e, 0.2, 2.5)),
            ("green", gem(0x00674f, 0.12, 2.8)),
            ("champagne", gem(0xf2d2b6, 0.2, 2.0)),
            ("cognac", gem(0xb76e33, 0.15, 2.4)),
        ];
        let metals = [
            ("gold", metal(0xffc133)),
            ("rose", metal(0xb76e79)),
            ("white-gold", metal(0xd3d3d3)),
            ("silver", metal(0xc0c0c0)),
            ("platinum", metal(0xe5e4e2)),
        ];

        Self {
            gems: gems
                .into_iter()
                .map(|(key, g)| (normalize_key(key), g))
                .collect(),
            metals: metals
                .into_iter()
                .map(|(key, m)| (normalize_key(key), m))
                .collect(),
            gem_optics: GemOptics::default(),
            metal_optics: MetalOptics::default(),
        }
    }
}

/// Normalize every key, rejecting keys that collapse onto the same identifier.
fn normalize_entries<T>(
    table: &'static str,
    entries: impl IntoIterator<Item = (String, T)>,
) -> Result<BTreeMap<String, T>, LoadError> {
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        let normalized = normalize_key(&key);
        if map.insert(normalized.clone(), value).is_some() {
            return Err(LoadError::DuplicateKey {
                table,
                key: normalized,
            });
        }
    }
    Ok(map)
}

/// Lowercase and keep only ASCII letters and digits.
pub(crate) fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
