//! Convenience re-exports — `use lustre::prelude::*` for the common items.

// Core
pub use crate::appearance::{AppearanceTables, Finish, GemAppearance, MetalAppearance};
pub use crate::apply::{ApplyReport, ApplyScope};
pub use crate::classify::{Classifier, MeshClass};
pub use crate::config::ConfigurationState;
pub use crate::environment::EnvironmentMap;
pub use crate::error::LoadError;
pub use crate::material::{EnvMapHandle, Material, PhysicalMaterial, StandardMaterial};
pub use crate::math::{Color, Quat, Transform, Vec3};
pub use crate::scene::{LoadedAsset, Mesh, NodeId};
pub use crate::session::{CameraControl, ControlPanel, Detached, ViewerSession};

// Loading (feature-gated)
#[cfg(feature = "loader")]
pub use crate::loader::{AssetLoader, LoadEvent, LoadOptions};

// Diagnostics (feature-gated)
#[cfg(feature = "diagnostics")]
pub use crate::diag::{ApplyEvent, ApplyLog};
