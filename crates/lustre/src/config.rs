//! The current configuration selection.
//!
//! One [`ConfigurationState`] is the single source of truth for what the
//! product should look like. It is owned by a
//! [`ViewerSession`](crate::session::ViewerSession), written only by the
//! control surface, and read by the applicator.

use serde::{Deserialize, Serialize};

use crate::appearance::{AppearanceTables, DEFAULT_GEM_TYPE, DEFAULT_METAL_ALLOY, Finish};
use crate::math::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationState {
    /// Gem-type identifier, as supplied by the caller.
    pub gem_type: String,
    /// Gem tint. Starts as the table tint, may be overridden by the caller.
    pub gem_tint: Color,
    /// Alloy identifier, as supplied by the caller.
    pub metal_alloy: String,
    pub finish: Finish,
    pub auto_rotate: bool,
}

impl ConfigurationState {
    /// Startup defaults: white gem in its table tint, polished white gold, no
    /// auto-rotation.
    pub fn new(tables: &AppearanceTables) -> Self {
        Self {
            gem_type: DEFAULT_GEM_TYPE.to_string(),
            gem_tint: tables.lookup_gem(DEFAULT_GEM_TYPE).tint,
            metal_alloy: DEFAULT_METAL_ALLOY.to_string(),
            finish: Finish::default(),
            auto_rotate: false,
        }
    }

    /// Restore the startup defaults in place.
    pub fn reset(&mut self, tables: &AppearanceTables) {
        *self = Self::new(tables);
    }
}

impl Default for ConfigurationState {
    fn default() -> Self {
        Self::new(&AppearanceTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_startup_state() {
        let state = ConfigurationState::default();
        assert_eq!(state.gem_type, "white");
        assert_eq!(state.gem_tint, Color::from_u32(0xf5f6f7));
        assert_eq!(state.metal_alloy, "white-gold");
        assert_eq!(state.finish, Finish::Polished);
        assert!(!state.auto_rotate);
    }

    #[test]
    fn reset_restores_every_field() {
        let tables = AppearanceTables::default();
        let mut state = ConfigurationState::new(&tables);
        state.gem_type = "cognac".into();
        state.gem_tint = Color::BLACK;
        state.metal_alloy = "rose".into();
        state.finish = Finish::Brushed;
        state.auto_rotate = true;

        state.reset(&tables);
        assert_eq!(state, ConfigurationState::new(&tables));
    }

    #[test]
    fn state_serializes_for_snapshots() {
        let json = serde_json::to_value(ConfigurationState::default()).unwrap();
        assert_eq!(json["gem_tint"], "#f5f6f7");
        assert_eq!(json["finish"], "polished");
    }
}
