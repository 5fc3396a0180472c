//! # Lustre — Jewelry Material Configurator
//!
//! Restyles a loaded product model (a ring, a pendant) from a small set of
//! user choices: gem type and tint, metal alloy, surface finish. Mesh names
//! decide which parts are gems and which are metal; everything else is left
//! as authored.
//!
//! Start with `use lustre::prelude::*` and drive a
//! [`ViewerSession`](session::ViewerSession).

pub mod appearance;
pub mod apply;
pub mod classify;
pub mod config;
pub mod environment;
pub mod error;
pub mod material;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod session;
pub mod synth;

#[cfg(feature = "loader")]
pub mod loader;

#[cfg(feature = "diagnostics")]
pub mod diag;
