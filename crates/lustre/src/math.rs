//! Math types and glam re-exports.
//!
//! We re-export the [glam](https://docs.rs/glam) types the scene hierarchy
//! needs. [`Transform`] carries a node's local position, rotation and scale;
//! [`Color`] is the tint type shared by the appearance tables and the
//! synthesized materials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use glam::{Mat4, Quat, Vec3};

/// A 3D transform: position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with an extra rotation applied on top of the current one.
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation * self.rotation;
        self
    }

    /// Compute the 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An opaque sRGB color with components in `[0.0, 1.0]`.
///
/// Serialized as a `"#rrggbb"` string so appearance table files stay readable.
/// Components are sRGB-encoded, as authored in hex. Linear sources such as
/// glTF color factors come in through [`Color::from_linear`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Create a color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#rgb`, `#rrggbb`, `0xrrggbb` or bare hex digits.
    pub fn from_hex(text: &str) -> Result<Self, ParseColorError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(text.to_string()));
        }

        let packed = match digits.len() {
            3 => {
                // Expand each nibble: "abc" -> "aabbcc".
                let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16)
            }
            6 => u32::from_str_radix(digits, 16),
            _ => return Err(ParseColorError(text.to_string())),
        }
        .map_err(|_| ParseColorError(text.to_string()))?;

        Ok(Self::from_u32(packed))
    }

    /// Pack back into `0xRRGGBB`, rounding each channel to 8 bits.
    pub fn to_u32(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Encode linear components (as glTF factors store them) into sRGB.
    pub fn from_linear(r: f32, g: f32, b: f32) -> Self {
        Self::rgb(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

// ── sRGB transfer ────────────────────────────────────────────────────────

/// Decode one sRGB-encoded channel to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear channel as sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Returned when a string is not a recognizable hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color '{0}'")]
pub struct ParseColorError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_transfer_round_trips_and_matches_reference_points() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(128.0 / 255.0) - 0.2158605).abs() < 1e-4);
        assert!((linear_to_srgb(0.5) - 0.7353569).abs() < 1e-4);
        for v in [0.001, 0.2, 0.5, 0.9] {
            assert!((srgb_to_linear(linear_to_srgb(v)) - v).abs() < 1e-5, "{v}");
        }
    }

    #[test]
    fn linear_factors_encode_to_srgb() {
        let c = Color::from_linear(0.5, 0.0, 1.0);
        assert_eq!(c.to_u32(), 0xbc00ff);
    }

    #[test]
    fn parses_common_hex_forms() {
        let expected = Color::from_u32(0x167d9e);
        assert_eq!(Color::from_hex("#167d9e").unwrap(), expected);
        assert_eq!(Color::from_hex("0x167D9E").unwrap(), expected);
        assert_eq!(Color::from_hex("167d9e").unwrap(), expected);
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("teal").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn display_round_trips_through_packed_value() {
        let color = Color::from_u32(0xb76e79);
        assert_eq!(color.to_string(), "#b76e79");
        assert_eq!(color.to_u32(), 0xb76e79);
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::from_u32(0x00674f)).unwrap();
        assert_eq!(json, "\"#00674f\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::from_u32(0x00674f));
    }

    #[test]
    fn rotated_composes_with_existing_rotation() {
        let quarter = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let t = Transform::from_xyz(0.0, 0.0, 1.0).rotated(quarter);
        let up = t.matrix().transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-5);
    }
}
