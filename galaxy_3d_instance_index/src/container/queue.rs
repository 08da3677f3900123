/// Queue strategy: plain insertion order, no culling.
///
/// Duplicate live identifiers are rejected with a warning instead of an
/// error.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::bounds::AABB;
use crate::instance::{InstanceId, RenderParameter, SharedInstance};
use super::base_container::{BaseContainer, ContainerStorage};
use super::container::ContainerType;

#[derive(Default)]
pub struct QueueList {
    entries: Vec<SharedInstance>,
    by_id: FxHashMap<InstanceId, SharedInstance>,
}

impl QueueList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerStorage for QueueList {
    const CONTAINER_TYPE: ContainerType = ContainerType::Queue;
    const SOURCE: &'static str = "galaxy3d::QueueContainer";
    const SPATIAL: bool = false;

    fn get(&self, id: InstanceId) -> Option<&SharedInstance> {
        self.by_id.get(&id)
    }

    fn insert(&mut self, instance: SharedInstance, _bounds: Option<AABB>) {
        self.by_id.insert(instance.identifier(), Arc::clone(&instance));
        self.entries.push(instance);
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        let instance = self.by_id.remove(&id)?;
        self.entries.retain(|i| i.identifier() != id);
        Some(instance)
    }

    fn resync(&mut self) {}

    fn collect_all(&self, out: &mut Vec<SharedInstance>) {
        out.extend(self.entries.iter().cloned());
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.by_id.clear();
    }

    fn reject_duplicate(&self, id: InstanceId) {
        crate::index_warn!(Self::SOURCE, "Instance {} is already queued, add ignored", id);
    }
}

/// Container backed by a `QueueList`.
pub type QueueContainer = BaseContainer<QueueList>;

impl BaseContainer<QueueList> {
    pub fn new(render_parameter: RenderParameter) -> Self {
        Self::with_storage(QueueList::new(), render_parameter)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
