/// Priority strategy: a list kept sorted by a caller-supplied total order.
///
/// Sorting is lazy: any insertion marks the list dirty and the stored list
/// is re-sorted at `swap_data`. Queries made while the list is dirty return
/// a sorted copy, so callers always observe the order. No frustum culling.

use std::cmp::Ordering;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::bounds::AABB;
use crate::instance::{GraphicsInstance, InstanceId, RenderParameter, SharedInstance};
use super::base_container::{BaseContainer, ContainerStorage};
use super::container::ContainerType;

/// Total order over instances. Must be consistent for the lifetime of the
/// container.
pub type PriorityOrder =
    Arc<dyn Fn(&dyn GraphicsInstance, &dyn GraphicsInstance) -> Ordering + Send + Sync>;

/// Ascending identifier order.
pub fn by_identifier() -> PriorityOrder {
    Arc::new(|a: &dyn GraphicsInstance, b: &dyn GraphicsInstance| {
        a.identifier().cmp(&b.identifier())
    })
}

pub struct PriorityList {
    entries: Vec<SharedInstance>,
    by_id: FxHashMap<InstanceId, SharedInstance>,
    order: PriorityOrder,
    dirty: bool,
}

impl PriorityList {
    pub fn new(order: PriorityOrder) -> Self {
        Self {
            entries: Vec::new(),
            by_id: FxHashMap::default(),
            order,
            dirty: false,
        }
    }

    /// Whether the stored list awaits a re-sort.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a re-sort at the next `sort_if_dirty`, for orders that read
    /// mutable instance state.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn sort_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        let order = &self.order;
        self.entries.sort_by(|a, b| order(a.as_ref(), b.as_ref()));
        self.dirty = false;
    }

    fn sorted_into(&self, out: &mut Vec<SharedInstance>) {
        let start = out.len();
        out.extend(self.entries.iter().cloned());
        if self.dirty {
            let order = &self.order;
            out[start..].sort_by(|a, b| order(a.as_ref(), b.as_ref()));
        }
    }
}

impl ContainerStorage for PriorityList {
    const CONTAINER_TYPE: ContainerType = ContainerType::Priority;
    const SOURCE: &'static str = "galaxy3d::PriorityContainer";
    const SPATIAL: bool = false;

    fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        self.by_id.get(&id)
    }

    fn insert(&mut self, instance: SharedInstance, _bounds: Option<AABB>) {
        self.by_id.insert(instance.identifier(), Arc::clone(&instance));
        self.entries.push(instance);
        self.dirty = true;
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        let instance = self.by_id.remove(&id)?;
        // Removal keeps the remaining entries in order.
        self.entries.retain(|i| i.identifier() != id);
        Some(instance)
    }

    fn resync(&mut self) {
        self.sort_if_dirty();
    }

    fn collect_all(&self, out: &mut Vec<SharedInstance>) {
        self.sorted_into(out);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.by_id.clear();
        self.dirty = false;
    }
}

/// Container backed by a `PriorityList`.
pub type PriorityContainer = BaseContainer<PriorityList>;

impl BaseContainer<PriorityList> {
    pub fn new(render_parameter: RenderParameter, order: PriorityOrder) -> Self {
        Self::with_storage(PriorityList::new(order), render_parameter)
    }

    /// Re-sort at the next `swap_data` even without structural change.
    pub fn invalidate_order(&mut self) {
        self.storage_mut().invalidate();
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
