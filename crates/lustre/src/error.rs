//! Errors for the file and asset boundary.
//!
//! Only loading can fail. Everything past the handoff (lookups,
//! classification, synthesis, the control surface) degrades locally and logs.

/// Failure while reading appearance tables, a glTF asset or an environment map.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid appearance table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("appearance table '{table}' has no fallback entry '{key}'")]
    MissingFallback {
        table: &'static str,
        key: &'static str,
    },
    #[error("appearance table entry '{key}' has invalid {field} (must be finite and positive)")]
    InvalidGem {
        key: String,
        field: &'static str,
    },
    #[error("appearance table '{table}' has keys that collide as '{key}' after normalization")]
    DuplicateKey {
        table: &'static str,
        key: String,
    },
    #[cfg(feature = "loader")]
    #[error("failed to load glTF '{path}': {source}")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[cfg(feature = "loader")]
    #[error("failed to decode environment map '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[cfg(feature = "loader")]
    #[error("worker loading '{path}' panicked")]
    WorkerPanicked { path: String },
    #[error("mesh '{mesh}' in '{path}' is missing its {attribute} attribute")]
    MissingAttribute {
        path: String,
        mesh: String,
        attribute: &'static str,
    },
}
