/// AabbTree: incremental binary tree of axis-aligned bounding boxes.
///
/// Leaves hold one instance and a copy of its box; internal nodes hold the
/// union of their two children. Nodes live in a `SlotMap` arena and refer
/// to their parent by key, so the parent link never owns anything.
///
/// Insertion descends towards the child whose union with the new box has
/// the smaller volume (surface area when volumes tie), splits the leaf it
/// reaches and refits the ancestors.
/// Removal promotes the sibling into the parent's slot and refits. A bounds
/// change is a detach + reinsert of the same leaf, never an in-place edit,
/// so every internal box is the exact union of its children whenever no
/// operation is in flight.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::bounds::AABB;
use crate::instance::{InstanceId, RenderParameter, SharedInstance};
use crate::view::Frustum;
use super::base_container::{BaseContainer, ContainerStorage};
use super::container::ContainerType;

new_key_type! {
    /// Arena key of a tree node.
    struct NodeKey;
}

enum NodeKind {
    Leaf { id: InstanceId, instance: SharedInstance },
    Internal { children: [NodeKey; 2] },
}

struct AabbNode {
    /// Leaf: copy of the instance box at last sync. Internal: union of children.
    aabb: AABB,
    parent: Option<NodeKey>,
    kind: NodeKind,
}

/// Dynamic AABB tree keyed by instance identifier.
#[derive(Default)]
pub struct AabbTree {
    nodes: SlotMap<NodeKey, AabbNode>,
    root: Option<NodeKey>,
    leaves: FxHashMap<InstanceId, NodeKey>,
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leaves (instances).
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Total node count, internal nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Box of the root node, i.e. the union of every leaf.
    pub fn root_bounds(&self) -> Option<AABB> {
        self.root.map(|key| self.nodes[key].aabb)
    }

    /// Box the tree currently holds for an instance.
    pub fn leaf_bounds(&self, id: InstanceId) -> Option<AABB> {
        self.leaves.get(&id).map(|&key| self.nodes[key].aabb)
    }

    /// Insert a new leaf. Replaces nothing: a present identifier is detached first.
    pub fn insert(&mut self, instance: SharedInstance, aabb: AABB) {
        let id = instance.identifier();
        if self.leaves.contains_key(&id) {
            debug_assert!(false, "AabbTree::insert: {} already present", id);
            self.remove(id);
        }

        let leaf = self.nodes.insert(AabbNode {
            aabb,
            parent: None,
            kind: NodeKind::Leaf { id, instance },
        });
        self.leaves.insert(id, leaf);
        self.insert_leaf(leaf);
    }

    /// Remove a leaf, returning its instance.
    pub fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        let leaf = self.leaves.remove(&id)?;
        self.detach_leaf(leaf);
        match self.nodes.remove(leaf)?.kind {
            NodeKind::Leaf { instance, .. } => Some(instance),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Move a leaf to a new box (detach, overwrite, reinsert).
    ///
    /// Returns false if the identifier is unknown.
    pub fn update(&mut self, id: InstanceId, aabb: AABB) -> bool {
        let Some(&leaf) = self.leaves.get(&id) else {
            return false;
        };
        self.detach_leaf(leaf);
        self.nodes[leaf].aabb = aabb;
        self.insert_leaf(leaf);
        true
    }

    pub fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        let &key = self.leaves.get(&id)?;
        match &self.nodes[key].kind {
            NodeKind::Leaf { instance, .. } => Some(instance),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Append renderable leaves intersecting `frustum` to `out`.
    ///
    /// Subtrees whose box fails the frustum test are pruned whole.
    pub fn query(&self, frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        let mut stack: Vec<NodeKey> = self.root.into_iter().collect();
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if !frustum.intersects_aabb(&node.aabb) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf { instance, .. } => {
                    if instance.should_render() {
                        out.push(Arc::clone(instance));
                    }
                }
                NodeKind::Internal { children } => stack.extend_from_slice(children),
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaves.clear();
        self.root = None;
    }

    // ===== TOPOLOGY =====

    /// Link a detached leaf into the tree.
    fn insert_leaf(&mut self, leaf: NodeKey) {
        let Some(root) = self.root else {
            self.nodes[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_box = self.nodes[leaf].aabb;
        let sibling = self.choose_sibling(root, &leaf_box);
        let old_parent = self.nodes[sibling].parent;

        let parent = self.nodes.insert(AabbNode {
            aabb: self.nodes[sibling].aabb.union(&leaf_box),
            parent: old_parent,
            kind: NodeKind::Internal { children: [sibling, leaf] },
        });
        self.nodes[sibling].parent = Some(parent);
        self.nodes[leaf].parent = Some(parent);

        match old_parent {
            Some(grandparent) => self.replace_child(grandparent, sibling, parent),
            None => self.root = Some(parent),
        }

        self.refit(Some(parent));
    }

    /// Descend from `start` to the leaf whose union with `aabb` grows the
    /// least. Equal volumes (flat boxes) fall back to surface area; full
    /// ties go to the first child.
    fn choose_sibling(&self, start: NodeKey, aabb: &AABB) -> NodeKey {
        let mut current = start;
        while let NodeKind::Internal { children: [left, right] } = self.nodes[current].kind {
            let left_union = self.nodes[left].aabb.union(aabb);
            let right_union = self.nodes[right].aabb.union(aabb);
            let (left_volume, right_volume) = (left_union.volume(), right_union.volume());
            let go_left = if left_volume != right_volume {
                left_volume < right_volume
            } else {
                left_union.surface_area() <= right_union.surface_area()
            };
            current = if go_left { left } else { right };
        }
        current
    }

    /// Unlink a leaf from the tree, keeping the node in the arena.
    fn detach_leaf(&mut self, leaf: NodeKey) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let Some(parent) = self.nodes[leaf].parent else {
            debug_assert!(false, "AabbTree: non-root leaf without parent");
            return;
        };
        let NodeKind::Internal { children } = self.nodes[parent].kind else {
            debug_assert!(false, "AabbTree: leaf parent is not an internal node");
            return;
        };
        let sibling = if children[0] == leaf { children[1] } else { children[0] };
        let grandparent = self.nodes[parent].parent;

        self.nodes.remove(parent);
        self.nodes[sibling].parent = grandparent;
        self.nodes[leaf].parent = None;

        match grandparent {
            Some(gp) => {
                self.replace_child(gp, parent, sibling);
                self.refit(Some(gp));
            }
            None => self.root = Some(sibling),
        }
    }

    fn replace_child(&mut self, parent: NodeKey, old: NodeKey, new: NodeKey) {
        if let NodeKind::Internal { children } = &mut self.nodes[parent].kind {
            for child in children.iter_mut() {
                if *child == old {
                    *child = new;
                    return;
                }
            }
        }
        debug_assert!(false, "AabbTree: replace_child on a node that is not the parent");
    }

    /// Recompute internal boxes from `start` up to the root.
    fn refit(&mut self, start: Option<NodeKey>) {
        let mut current = start;
        while let Some(key) = current {
            if let NodeKind::Internal { children: [a, b] } = self.nodes[key].kind {
                let union = self.nodes[a].aabb.union(&self.nodes[b].aabb);
                self.nodes[key].aabb = union;
            }
            current = self.nodes[key].parent;
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeKey, usize)> = self.root.map(|key| (key, 1)).into_iter().collect();
        while let Some((key, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Internal { children } = &self.nodes[key].kind {
                stack.extend(children.iter().map(|&child| (child, depth + 1)));
            }
        }
        deepest
    }

    /// Check structural invariants: parent links, two children per internal
    /// node, exact union boxes, and leaf map consistency.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() && self.leaves.is_empty() {
                Ok(())
            } else {
                Err("empty root with live nodes".to_string())
            };
        };
        if self.nodes[root].parent.is_some() {
            return Err("root has a parent".to_string());
        }

        let mut visited = 0;
        let mut leaf_count = 0;
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            visited += 1;
            let node = &self.nodes[key];
            match &node.kind {
                NodeKind::Leaf { id, .. } => {
                    leaf_count += 1;
                    if self.leaves.get(id) != Some(&key) {
                        return Err(format!("leaf {} missing from leaf map", id));
                    }
                }
                NodeKind::Internal { children } => {
                    for &child in children {
                        if self.nodes[child].parent != Some(key) {
                            return Err("child parent link mismatch".to_string());
                        }
                    }
                    let union = self.nodes[children[0]].aabb.union(&self.nodes[children[1]].aabb);
                    if union != node.aabb {
                        return Err(format!("internal box {:?} != union {:?}", node.aabb, union));
                    }
                    stack.extend_from_slice(children);
                }
            }
        }

        if visited != self.nodes.len() {
            return Err(format!("{} reachable nodes, {} allocated", visited, self.nodes.len()));
        }
        if leaf_count != self.leaves.len() {
            return Err("leaf count mismatch".to_string());
        }
        Ok(())
    }
}

// ===== CONTAINER STORAGE =====

impl ContainerStorage for AabbTree {
    const CONTAINER_TYPE: ContainerType = ContainerType::AabbTree;
    const SOURCE: &'static str = "galaxy3d::AabbTreeContainer";
    const SPATIAL: bool = true;

    fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        AabbTree::get(self, id)
    }

    fn insert(&mut self, instance: SharedInstance, bounds: Option<AABB>) {
        let Some(aabb) = bounds else {
            debug_assert!(false, "AabbTree storage requires bounds");
            return;
        };
        AabbTree::insert(self, instance, aabb);
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        AabbTree::remove(self, id)
    }

    fn resync(&mut self) {
        let mut moved = Vec::new();
        for (&id, &key) in &self.leaves {
            let node = &self.nodes[key];
            let NodeKind::Leaf { instance, .. } = &node.kind else {
                continue;
            };
            match instance.bounding_volume() {
                Some(current) if current != node.aabb && current.is_valid() => {
                    moved.push((id, current));
                }
                Some(_) => {}
                None => crate::index_warn!(Self::SOURCE,
                    "Instance {} lost its bounding volume, keeping last synced box", id),
            }
        }

        for (id, aabb) in moved {
            self.update(id, aabb);
        }
    }

    fn collect_all(&self, out: &mut Vec<SharedInstance>) {
        out.reserve(self.leaves.len());
        for &key in self.leaves.values() {
            if let NodeKind::Leaf { instance, .. } = &self.nodes[key].kind {
                out.push(Arc::clone(instance));
            }
        }
    }

    fn collect_visible(&self, frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        self.query(frustum, out);
    }

    fn len(&self) -> usize {
        AabbTree::len(self)
    }

    fn clear(&mut self) {
        AabbTree::clear(self);
    }
}

/// Container backed by an `AabbTree`.
pub type AabbTreeContainer = BaseContainer<AabbTree>;

impl BaseContainer<AabbTree> {
    pub fn new(render_parameter: RenderParameter) -> Self {
        Self::with_storage(AabbTree::new(), render_parameter)
    }
}

#[cfg(test)]
#[path = "aabb_tree_tests.rs"]
mod tests;
