//! # Loaded Asset — The Mesh Hierarchy
//!
//! A [`LoadedAsset`] is the tree of named nodes produced by the loader. Some
//! nodes carry a [`Mesh`] with a single material slot; the rest are grouping
//! nodes.
//!
//! ## Storage
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ LoadedAsset                                  │
//! │                                              │
//! │  nodes: Vec<Node>   (arena, NodeId = index)  │
//! │    name, local transform, parent, children   │
//! │    mesh: Option<Mesh { material, counts }>   │
//! │                                              │
//! │  roots: Vec<NodeId>                          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Nodes are never removed, so a [`NodeId`] stays valid for the asset's
//! lifetime.
//!
//! ## Traversal
//!
//! Traversal is breadth-first from the roots, parents before children, the
//! same order used for transform propagation. Every node is visited once.
//!
//! ## Material Access
//!
//! Outside this crate a mesh's material is read-only. Inside, the applicator
//! replaces gem materials and mutates metal materials in place; nothing else
//! writes them.

use std::collections::VecDeque;

use serde::Serialize;

use crate::material::{Material, PhysicalMaterial};
use crate::math::{Mat4, Quat, Transform};

/// Index of a node inside its [`LoadedAsset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Geometry summary plus the material slot the renderer reads each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    material: Material,
    pub vertex_count: usize,
    pub index_count: usize,
}

impl Mesh {
    pub fn new(material: impl Into<Material>) -> Self {
        Self {
            material: material.into(),
            vertex_count: 0,
            index_count: 0,
        }
    }

    pub fn with_counts(mut self, vertex_count: usize, index_count: usize) -> Self {
        self.vertex_count = vertex_count;
        self.index_count = index_count;
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Swap in a new gem material, dropping the previous one.
    pub(crate) fn replace_material(&mut self, material: PhysicalMaterial) {
        self.material = Material::Physical(material);
    }

    /// In-place access for metal patches.
    pub(crate) fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }
}

/// One node of the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    name: String,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    mesh: Option<Mesh>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }
}

/// The loaded scene hierarchy of one product model.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedAsset {
    name: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl LoadedAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Add a node. `parent = None` makes it a root.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this asset.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        transform: Transform,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.into(),
            transform,
            parent,
            children: Vec::new(),
            mesh: None,
        });
        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Add a node carrying a mesh.
    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        mesh: Mesh,
    ) -> NodeId {
        let id = self.add_node(parent, name, Transform::IDENTITY);
        self.nodes[id.index()].mesh = Some(mesh);
        id
    }

    /// Attach or replace the mesh of an existing node.
    pub fn set_mesh(&mut self, node: NodeId, mesh: Mesh) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.mesh = Some(mesh);
        }
    }

    /// Pre-multiply a rotation onto every root (up-axis correction).
    pub fn rotate_roots(&mut self, rotation: Quat) {
        for root in &self.roots {
            let node = &mut self.nodes[root.index()];
            node.transform = node.transform.rotated(rotation);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }

    /// First node with exactly this name, in traversal order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|id| self.nodes[id.index()].name == name)
    }

    /// The mesh on the first node named `name`.
    pub fn mesh_named(&self, name: &str) -> Option<&Mesh> {
        self.find(name).and_then(|id| self.nodes[id.index()].mesh.as_ref())
    }

    /// Breadth-first node order, parents before children.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<NodeId> = self.roots.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id.index()].children.iter().copied());
        }
        order
    }

    /// Visit every mesh once in traversal order with mutable access.
    pub(crate) fn for_each_mesh_mut(&mut self, mut f: impl FnMut(NodeId, &str, &mut Mesh)) {
        for id in self.traverse() {
            let node = &mut self.nodes[id.index()];
            if let Some(mesh) = node.mesh.as_mut() {
                f(id, &node.name, mesh);
            }
        }
    }

    /// World-space matrix for every node.
    ///
    /// - Roots get `transform.matrix()`.
    /// - Children get `parent_world * child_local`.
    pub fn world_transforms(&self) -> Vec<(NodeId, Mat4)> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<(NodeId, Mat4)> =
            self.roots.iter().map(|&id| (id, Mat4::IDENTITY)).collect();

        while let Some((id, parent_matrix)) = queue.pop_front() {
            let node = &self.nodes[id.index()];
            let world = parent_matrix * node.transform.matrix();
            result.push((id, world));
            for &child in &node.children {
                queue.push_back((child, world));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::StandardMaterial;
    use crate::math::Vec3;

    fn ring() -> LoadedAsset {
        let mut asset = LoadedAsset::new("ring.glb");
        let root = asset.add_node(None, "Ring", Transform::IDENTITY);
        let head = asset.add_node(Some(root), "Head", Transform::from_xyz(0.0, 1.0, 0.0));
        asset.add_mesh(Some(root), "metal_band", Mesh::new(StandardMaterial::default()));
        asset.add_mesh(Some(head), "Diamond_Round", Mesh::new(StandardMaterial::default()));
        asset
    }

    #[test]
    fn traversal_is_breadth_first_and_complete() {
        let asset = ring();
        let names: Vec<_> = asset
            .traverse()
            .into_iter()
            .map(|id| asset.node(id).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["Ring", "Head", "metal_band", "Diamond_Round"]);
        assert_eq!(asset.node_count(), 4);
        assert_eq!(asset.mesh_count(), 2);
    }

    #[test]
    fn find_and_mesh_lookup() {
        let asset = ring();
        let head = asset.find("Head").unwrap();
        assert!(asset.node(head).unwrap().mesh().is_none());
        assert!(asset.mesh_named("Diamond_Round").is_some());
        assert!(asset.find("prong").is_none());
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut asset = LoadedAsset::new("t");
        let root = asset.add_node(None, "root", Transform::from_xyz(10.0, 0.0, 0.0));
        let child = asset.add_node(Some(root), "child", Transform::from_xyz(0.0, 2.0, 0.0));

        let transforms = asset.world_transforms();
        let (_, m) = transforms.iter().find(|(id, _)| *id == child).unwrap();
        let col3 = m.col(3);
        assert!((col3.x - 10.0).abs() < 0.001);
        assert!((col3.y - 2.0).abs() < 0.001);
    }

    #[test]
    fn rotate_roots_applies_up_axis_correction() {
        let mut asset = LoadedAsset::new("t");
        let root = asset.add_node(None, "root", Transform::IDENTITY);
        let tip = asset.add_node(Some(root), "tip", Transform::from_xyz(0.0, 0.0, 1.0));
        asset.rotate_roots(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2));

        let transforms = asset.world_transforms();
        let (_, m) = transforms.iter().find(|(id, _)| *id == tip).unwrap();
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn mesh_visitor_sees_each_mesh_once() {
        let mut asset = ring();
        let mut seen = Vec::new();
        asset.for_each_mesh_mut(|_, name, _| seen.push(name.to_string()));
        assert_eq!(seen, ["metal_band", "Diamond_Round"]);
    }
}
