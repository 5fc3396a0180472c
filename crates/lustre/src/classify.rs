//! # Mesh Classification by Name
//!
//! Product models mark their parts by naming convention. A mesh is a gem, a
//! metal part, or something the configurator leaves alone:
//!
//! ```text
//!   "Diamond_Pear_1" ──► Gem
//!   "metal_band"     ──► Metal
//!   "bezel", "mesh_0"──► Unhandled (material untouched)
//! ```
//!
//! Classification is a pure function of the name, recomputed on every
//! traversal and never cached on the mesh. A new asset with extra or renamed
//! parts is classified correctly as long as it follows the convention.
//!
//! Two strategies are supported. [`Classifier::Prefix`] is the general path.
//! [`Classifier::AllowList`] covers assets whose part names are irregular and
//! have to be listed exactly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which appearance group a mesh belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshClass {
    Gem,
    Metal,
    Unhandled,
}

/// Name-based classification strategy. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Classifier {
    /// Names starting with `gem` are gems, names starting with `metal` are metal.
    Prefix {
        gem: String,
        metal: String,
    },
    /// Exact names only.
    AllowList {
        gems: BTreeSet<String>,
        metals: BTreeSet<String>,
    },
}

impl Classifier {
    /// The `diamond*` / `metal*` convention.
    pub fn prefix() -> Self {
        Self::with_prefixes("diamond", "metal")
    }

    pub fn with_prefixes(gem: &str, metal: &str) -> Self {
        Self::Prefix {
            gem: gem.to_lowercase(),
            metal: metal.to_lowercase(),
        }
    }

    /// Exact-name classification for assets with irregular naming.
    pub fn allow_list<G, M>(gems: G, metals: M) -> Self
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        Self::AllowList {
            gems: gems.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
            metals: metals
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Classify a mesh by name.
    ///
    /// Gem matching is checked first, so a name that satisfies both rules is a
    /// gem. The result is always exactly one class.
    pub fn classify(&self, name: &str) -> MeshClass {
        let name = name.to_lowercase();
        match self {
            Classifier::Prefix { gem, metal } => {
                if name.starts_with(&gem.to_lowercase()) {
                    MeshClass::Gem
                } else if name.starts_with(&metal.to_lowercase()) {
                    MeshClass::Metal
                } else {
                    MeshClass::Unhandled
                }
            }
            Classifier::AllowList { gems, metals } => {
                let listed = |set: &BTreeSet<String>| set.iter().any(|n| n.to_lowercase() == name);
                if listed(gems) {
                    MeshClass::Gem
                } else if listed(metals) {
                    MeshClass::Metal
                } else {
                    MeshClass::Unhandled
                }
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::prefix()
    }
}

/// Classify with the default prefix strategy.
pub fn classify(name: &str) -> MeshClass {
    Classifier::prefix().classify(name)
}
