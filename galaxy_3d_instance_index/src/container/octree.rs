/// Octree: loose, depth-limited spatial grid over fixed world bounds.
///
/// Each object is stored in exactly one node: the node reached by
/// descending from the root while the node has children and the object's
/// box fits strictly inside one octant. Objects straddling a midpoint, or
/// lying outside the world bounds, stay in the node where descent stops
/// (the root, for out-of-bounds objects).
///
/// A childless node whose own list grows past `split_threshold` (and whose
/// depth is below `max_depth`) splits into eight octants and pushes down
/// every object that now fits one. After a removal, a node whose children
/// are all leaves and whose subtree holds at most `split_threshold`
/// objects pulls them back up and drops its children.
///
/// Removal walks the same descent the insertion rule would choose against
/// the current structure, using the box stored at last sync, so objects
/// pushed down by a later split are still found.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::bounds::AABB;
use crate::config::OctreeConfig;
use crate::error::Result;
use crate::instance::{InstanceId, RenderParameter, SharedInstance};
use crate::view::{Frustum, FrustumTest};
use super::base_container::{BaseContainer, ContainerStorage};
use super::container::ContainerType;

new_key_type! {
    /// Arena key of an octree node.
    struct OctantKey;
}

struct OctreeEntry {
    id: InstanceId,
    /// Box at last sync
    aabb: AABB,
    instance: SharedInstance,
}

struct OctreeNode {
    /// Static region covered by this node
    aabb: AABB,
    depth: u32,
    /// Objects that do not fit a single child (or all objects, for a leaf)
    entries: Vec<OctreeEntry>,
    /// Eight octants in `AABB::octant` order, or none
    children: Option<[OctantKey; 8]>,
}

/// Loose octree keyed by instance identifier.
pub struct Octree {
    nodes: SlotMap<OctantKey, OctreeNode>,
    root: OctantKey,
    config: OctreeConfig,
    /// Identifier → (instance, box at last sync)
    instances: FxHashMap<InstanceId, (SharedInstance, AABB)>,
}

/// Octant of `node` that strictly contains `aabb`, if any.
///
/// `None` when the box touches or crosses a midpoint on any axis, or is
/// not inside `node` at all.
fn child_octant(node: &AABB, aabb: &AABB) -> Option<u8> {
    if !node.contains(aabb) {
        return None;
    }
    let mid = node.center();
    let mut octant = 0u8;
    for (axis, bit) in [(0usize, 1u8), (1, 2), (2, 4)] {
        octant |= if aabb.max[axis] < mid[axis] {
            0
        } else if aabb.min[axis] > mid[axis] {
            bit
        } else {
            return None;
        };
    }
    Some(octant)
}

impl Octree {
    /// Create an empty octree.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for unusable bounds, depth or threshold.
    pub fn new(config: OctreeConfig) -> Result<Self> {
        config.validate()?;
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OctreeNode {
            aabb: config.world_bounds,
            depth: 0,
            entries: Vec::new(),
            children: None,
        });
        Ok(Self {
            nodes,
            root,
            config,
            instances: FxHashMap::default(),
        })
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of allocated nodes (the root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        self.instances.get(&id).map(|(instance, _)| instance)
    }

    /// Box the octree currently holds for an instance.
    pub fn synced_bounds(&self, id: InstanceId) -> Option<AABB> {
        self.instances.get(&id).map(|(_, aabb)| *aabb)
    }

    /// Insert an instance with its box.
    pub fn insert(&mut self, instance: SharedInstance, aabb: AABB) {
        let id = instance.identifier();
        if self.instances.contains_key(&id) {
            debug_assert!(false, "Octree::insert: {} already present", id);
            self.remove(id);
        }
        self.instances.insert(id, (Arc::clone(&instance), aabb));
        self.insert_entry(self.root, OctreeEntry { id, aabb, instance });
    }

    /// Remove an instance, merging emptied subtrees back on the way up.
    pub fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        let (instance, aabb) = self.instances.remove(&id)?;

        let mut path = Vec::with_capacity(self.config.max_depth as usize + 1);
        let mut current = Some(self.root);
        let mut found = false;
        while let Some(key) = current {
            path.push(key);
            let node = &mut self.nodes[key];
            if let Some(pos) = node.entries.iter().position(|e| e.id == id) {
                node.entries.swap_remove(pos);
                found = true;
                break;
            }
            current = match (node.children, child_octant(&node.aabb, &aabb)) {
                (Some(children), Some(octant)) => Some(children[octant as usize]),
                _ => None,
            };
        }

        if !found {
            debug_assert!(false, "Octree::remove: {} not on its descent path", id);
            self.evict_anywhere(id);
        }

        for &key in path.iter().rev() {
            self.try_merge(key);
        }

        Some(instance)
    }

    /// Move an instance to a new box (remove + insert).
    pub fn update(&mut self, id: InstanceId, aabb: AABB) -> bool {
        match self.remove(id) {
            Some(instance) => {
                self.insert(instance, aabb);
                true
            }
            None => false,
        }
    }

    /// Append renderable objects intersecting `frustum` to `out`.
    pub fn query(&self, frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        let root = &self.nodes[self.root];

        // The root list also holds out-of-bounds objects: always test them.
        Self::collect_tested(&root.entries, frustum, out);
        if let Some(children) = root.children {
            for child in children {
                let class = frustum.classify_aabb(&self.nodes[child].aabb);
                self.query_node(child, frustum, class, out);
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(OctreeNode {
            aabb: self.config.world_bounds,
            depth: 0,
            entries: Vec::new(),
            children: None,
        });
        self.instances.clear();
    }

    // ===== INSERTION =====

    fn insert_entry(&mut self, start: OctantKey, entry: OctreeEntry) {
        let mut key = start;
        loop {
            let node = &self.nodes[key];
            match (node.children, child_octant(&node.aabb, &entry.aabb)) {
                (Some(children), Some(octant)) => key = children[octant as usize],
                _ => break,
            }
        }
        self.nodes[key].entries.push(entry);
        self.maybe_split(key);
    }

    fn maybe_split(&mut self, key: OctantKey) {
        let node = &self.nodes[key];
        if node.children.is_some()
            || node.entries.len() <= self.config.split_threshold
            || node.depth >= self.config.max_depth
        {
            return;
        }

        let (aabb, depth) = (node.aabb, node.depth);
        let children: [OctantKey; 8] = std::array::from_fn(|octant| {
            self.nodes.insert(OctreeNode {
                aabb: aabb.octant(octant as u8),
                depth: depth + 1,
                entries: Vec::new(),
                children: None,
            })
        });
        self.nodes[key].children = Some(children);

        let entries = std::mem::take(&mut self.nodes[key].entries);
        crate::index_trace!("galaxy3d::Octree",
            "Splitting node at depth {} holding {} object(s)", depth, entries.len());

        for entry in entries {
            match child_octant(&aabb, &entry.aabb) {
                Some(octant) => self.insert_entry(children[octant as usize], entry),
                None => self.nodes[key].entries.push(entry),
            }
        }
    }

    // ===== MERGE-BACK =====

    /// Collapse `key`'s children if they are all leaves and the subtree
    /// holds at most `split_threshold` objects.
    fn try_merge(&mut self, key: OctantKey) {
        let Some(children) = self.nodes[key].children else {
            return;
        };
        let mut total = self.nodes[key].entries.len();
        for &child in &children {
            let child_node = &self.nodes[child];
            if child_node.children.is_some() {
                return;
            }
            total += child_node.entries.len();
        }
        if total > self.config.split_threshold {
            return;
        }

        let mut pulled = Vec::new();
        for child in children {
            if let Some(child_node) = self.nodes.remove(child) {
                pulled.extend(child_node.entries);
            }
        }
        crate::index_trace!("galaxy3d::Octree",
            "Merging children at depth {} ({} object(s))", self.nodes[key].depth, total);

        let node = &mut self.nodes[key];
        node.entries.extend(pulled);
        node.children = None;
    }

    /// Last-resort eviction by full scan.
    fn evict_anywhere(&mut self, id: InstanceId) {
        for (_, node) in self.nodes.iter_mut() {
            if let Some(pos) = node.entries.iter().position(|e| e.id == id) {
                node.entries.swap_remove(pos);
                return;
            }
        }
    }

    // ===== QUERY =====

    fn query_node(
        &self,
        key: OctantKey,
        frustum: &Frustum,
        class: FrustumTest,
        out: &mut Vec<SharedInstance>,
    ) {
        let node = &self.nodes[key];
        match class {
            FrustumTest::Outside => {}
            FrustumTest::Inside => self.collect_subtree(key, out),
            FrustumTest::Partial => {
                Self::collect_tested(&node.entries, frustum, out);
                if let Some(children) = node.children {
                    for child in children {
                        let child_class = frustum.classify_aabb(&self.nodes[child].aabb);
                        self.query_node(child, frustum, child_class, out);
                    }
                }
            }
        }
    }

    /// Node region is fully inside the frustum: take every renderable object.
    fn collect_subtree(&self, key: OctantKey, out: &mut Vec<SharedInstance>) {
        let node = &self.nodes[key];
        out.extend(
            node.entries
                .iter()
                .filter(|e| e.instance.should_render())
                .map(|e| Arc::clone(&e.instance)),
        );
        if let Some(children) = node.children {
            for child in children {
                self.collect_subtree(child, out);
            }
        }
    }

    fn collect_tested(entries: &[OctreeEntry], frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        out.extend(
            entries
                .iter()
                .filter(|e| e.instance.should_render() && frustum.intersects_aabb(&e.aabb))
                .map(|e| Arc::clone(&e.instance)),
        );
    }

    // ===== INSPECTION (tests) =====

    /// Check placement invariants: every object sits where descent would put
    /// it, no childless node below max depth exceeds the threshold, no node
    /// at max depth has children, and the identifier map matches the nodes.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = 0usize;
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if node.depth > self.config.max_depth {
                return Err(format!("node deeper than max depth: {}", node.depth));
            }
            match node.children {
                Some(children) => {
                    if node.depth >= self.config.max_depth {
                        return Err("node at max depth has children".to_string());
                    }
                    for e in &node.entries {
                        if child_octant(&node.aabb, &e.aabb).is_some() {
                            return Err(format!("{} fits a child but stayed in parent", e.id));
                        }
                    }
                    stack.extend_from_slice(&children);
                }
                None => {
                    if node.entries.len() > self.config.split_threshold
                        && node.depth < self.config.max_depth
                    {
                        return Err(format!(
                            "childless node at depth {} holds {} objects",
                            node.depth, node.entries.len()
                        ));
                    }
                }
            }
            for e in &node.entries {
                if self.instances.get(&e.id).map(|(_, b)| *b) != Some(e.aabb) {
                    return Err(format!("{} stored with a stale box", e.id));
                }
            }
            seen += node.entries.len();
        }
        if seen != self.instances.len() {
            return Err(format!("{} entries in nodes, {} instances", seen, self.instances.len()));
        }
        Ok(())
    }

    /// Depth of the node holding `id`.
    #[cfg(test)]
    pub(crate) fn depth_of(&self, id: InstanceId) -> Option<u32> {
        self.nodes
            .values()
            .find(|n| n.entries.iter().any(|e| e.id == id))
            .map(|n| n.depth)
    }

    /// Own object count of the root and of each root child.
    #[cfg(test)]
    pub(crate) fn root_load(&self) -> (usize, Option<[usize; 8]>) {
        let root = &self.nodes[self.root];
        let children = root
            .children
            .map(|c| std::array::from_fn(|i| self.nodes[c[i]].entries.len()));
        (root.entries.len(), children)
    }
}

// ===== CONTAINER STORAGE =====

impl ContainerStorage for Octree {
    const CONTAINER_TYPE: ContainerType = ContainerType::Octree;
    const SOURCE: &'static str = "galaxy3d::OctreeContainer";
    const SPATIAL: bool = true;

    fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        Octree::get(self, id)
    }

    fn insert(&mut self, instance: SharedInstance, bounds: Option<AABB>) {
        let Some(aabb) = bounds else {
            debug_assert!(false, "Octree storage requires bounds");
            return;
        };
        Octree::insert(self, instance, aabb);
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        Octree::remove(self, id)
    }

    fn resync(&mut self) {
        let mut moved = Vec::new();
        for (&id, (instance, synced)) in &self.instances {
            match instance.bounding_volume() {
                Some(current) if current != *synced && current.is_valid() => {
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
        out.extend(self.instances.values().map(|(instance, _)| Arc::clone(instance)));
    }

    fn collect_visible(&self, frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        self.query(frustum, out);
    }

    fn len(&self) -> usize {
        Octree::len(self)
    }

    fn clear(&mut self) {
        Octree::clear(self);
    }
}

/// Container backed by an `Octree`.
pub type OctreeContainer = BaseContainer<Octree>;

impl BaseContainer<Octree> {
    /// Create an octree container. Fails with `InvalidConfig` for unusable
    /// bounds, depth or threshold.
    pub fn new(render_parameter: RenderParameter, config: OctreeConfig) -> Result<Self> {
        Ok(Self::with_storage(Octree::new(config)?, render_parameter))
    }
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;
