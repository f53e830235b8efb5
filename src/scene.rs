//! Minimal scene graph the actors write their visual proxies into.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A node's
//! transform is relative to its parent; [`SceneGraph::world_transform`]
//! composes the chain. How nodes are drawn is up to whoever consumes the
//! graph; the simulation only records what each node shows.

use glam::{Quat, Vec3};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

/// What a node shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Visual {
    /// A loaded model asset; `mirrored` flips it half a turn about local z.
    Model { asset: String, mirrored: bool },
    /// Horizontal square of side `size`.
    Plane {
        size: f32,
        color: u32,
        texture: Option<String>,
        transparent: bool,
    },
    /// Ground grid with minor and major cell sizes, faded out at `distance`.
    Grid {
        minor: f32,
        major: f32,
        color: u32,
        distance: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub position: Vec3,
    pub rotation: Quat,
    pub visual: Option<Visual>,
}

impl SceneNode {
    pub fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, parent: Option<NodeId>, visual: Option<Visual>) -> NodeId {
        self.nodes.push(SceneNode {
            name: name.to_string(),
            parent,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            visual,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn set_transform(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        if let Some(node) = self.node_mut(id) {
            node.set_transform(position, rotation);
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(i, _)| NodeId(i))
    }

    /// Position and rotation of a node in world space.
    pub fn world_transform(&self, id: NodeId) -> Option<(Vec3, Quat)> {
        let mut node = self.node(id)?;
        let mut position = node.position;
        let mut rotation = node.rotation;

        while let Some(parent) = node.parent.and_then(|p| self.node(p)) {
            position = parent.position + parent.rotation * position;
            rotation = parent.rotation * rotation;
            node = parent;
        }

        Some((position, rotation))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn child_transform_composes_with_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.add("chassis", None, None);
        let child = scene.add("model", Some(parent), None);

        scene.set_transform(parent, Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        scene.set_transform(child, Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY);

        let (position, _) = scene.world_transform(child).unwrap();
        // +z turned a quarter turn about +y lands on +x
        assert_relative_eq!(position.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn nodes_are_found_by_name() {
        let mut scene = SceneGraph::new();
        let floor = scene.add("floor", None, None);
        let grid = scene.add("grid", Some(floor), None);

        assert_eq!(scene.find("grid"), Some(grid));
        assert_eq!(scene.children(floor).collect::<Vec<_>>(), vec![grid]);
        assert_eq!(scene.find("sky"), None);
    }
}
