//! Environment reflection maps.
//!
//! An [`EnvironmentMap`] is the decoded equirectangular HDR panorama used for
//! image-based reflections. Materials never own it; they link it through its
//! [`EnvMapHandle`], so the renderer can share one texture between every gem
//! and metal part.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::material::EnvMapHandle;

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(0);

/// A decoded HDR panorama.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    handle: EnvMapHandle,
    /// Where the map came from (path or URL), for logs.
    pub source: String,
    pub width: u32,
    pub height: u32,
    /// Linear RGB texels, row-major.
    pub texels: Vec<[f32; 3]>,
}

impl EnvironmentMap {
    /// Wrap decoded texels and allocate a fresh handle.
    pub fn new(source: impl Into<String>, width: u32, height: u32, texels: Vec<[f32; 3]>) -> Self {
        Self {
            handle: EnvMapHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)),
            source: source.into(),
            width,
            height,
            texels,
        }
    }

    pub fn handle(&self) -> EnvMapHandle {
        self.handle
    }

    /// Mean texel value. A quick sanity figure for logs.
    pub fn average_radiance(&self) -> [f32; 3] {
        if self.texels.is_empty() {
            return [0.0; 3];
        }
        let sum = self.texels.iter().fold([0.0f32; 3], |acc, t| {
            [acc[0] + t[0], acc[1] + t[1], acc[2] + t[2]]
        });
        let n = self.texels.len() as f32;
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let a = EnvironmentMap::new("a.hdr", 1, 1, vec![[1.0; 3]]);
        let b = EnvironmentMap::new("b.hdr", 1, 1, vec![[1.0; 3]]);
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn average_radiance_of_two_texels() {
        let map = EnvironmentMap::new("t.hdr", 2, 1, vec![[1.0, 0.0, 2.0], [3.0, 0.0, 0.0]]);
        assert_eq!(map.average_radiance(), [2.0, 0.0, 1.0]);
        assert_eq!(EnvironmentMap::new("e", 0, 0, Vec::new()).average_radiance(), [0.0; 3]);
    }
}
