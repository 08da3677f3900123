/// BaseContainer: bookkeeping shared by every storage strategy.
///
/// Splits instances into tickable / async-tickable subsets, drives the
/// per-frame hooks, performs discard cleanup and fans events out to
/// listeners. The strategy-specific part lives behind `ContainerStorage`.
///
/// Topology of the storage is written only through `&mut self` methods
/// (`add`, `remove`, `swap_data`, `clear`). `async_tick` and the queries
/// take `&self` and may run concurrently with each other.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use crate::bounds::AABB;
use crate::error::Result;
use crate::index_bail;
use crate::instance::{
    ContainerListener, InstanceCapabilities, InstanceId, ListenerList, RenderParameter,
    SharedInstance,
};
use crate::view::{Frustum, RenderContext};
use super::container::{ContainerType, InstanceContainer};

/// Storage strategy plugged into a `BaseContainer`.
///
/// Implementations own the identifier → instance mapping and whatever
/// index they keep on top of it.
pub trait ContainerStorage: Send + Sync {
    /// Strategy tag reported to listeners.
    const CONTAINER_TYPE: ContainerType;

    /// Log source tag.
    const SOURCE: &'static str;

    /// Whether `add` requires a bounding volume.
    const SPATIAL: bool;

    /// Look up a stored instance.
    fn get(&self, id: InstanceId) -> Option<&SharedInstance>;

    /// Store an instance. The identifier is known to be absent.
    /// `bounds` is `Some` whenever `SPATIAL` is true.
    fn insert(&mut self, instance: SharedInstance, bounds: Option<AABB>);

    /// Detach an instance from all storage.
    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance>;

    /// Re-synchronize against the instances' current bounds.
    /// Only called from `swap_data`.
    fn resync(&mut self);

    /// Append every stored instance to `out`, in the strategy's order.
    fn collect_all(&self, out: &mut Vec<SharedInstance>);

    /// Append renderable instances passing `frustum` to `out`.
    ///
    /// Non-spatial strategies ignore the frustum.
    fn collect_visible(&self, _frustum: &Frustum, out: &mut Vec<SharedInstance>) {
        let start = out.len();
        self.collect_all(out);
        retain_renderable(out, start);
    }

    /// Number of stored instances.
    fn len(&self) -> usize;

    /// Drop everything.
    fn clear(&mut self);

    /// Called when `add` rejects a live duplicate.
    fn reject_duplicate(&self, _id: InstanceId) {}
}

/// Keep only `out[start..]` entries whose should-render flag is set.
fn retain_renderable(out: &mut Vec<SharedInstance>, start: usize) {
    let tail = out.split_off(start);
    out.extend(tail.into_iter().filter(|i| i.should_render()));
}

/// Container contract implemented once over any `ContainerStorage`.
pub struct BaseContainer<S: ContainerStorage> {
    storage: S,
    render_parameter: RenderParameter,
    tickable: Vec<SharedInstance>,
    async_tickable: Vec<SharedInstance>,
    listeners: ListenerList,
}

impl<S: ContainerStorage> BaseContainer<S> {
    /// Wrap a storage strategy.
    pub fn with_storage(storage: S, render_parameter: RenderParameter) -> Self {
        crate::index_debug!(S::SOURCE, "Container created for render parameter {:?}", render_parameter);
        Self {
            storage,
            render_parameter,
            tickable: Vec::new(),
            async_tickable: Vec::new(),
            listeners: ListenerList::new(),
        }
    }

    /// Read access to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Number of instances receiving `tick()`.
    pub fn tickable_count(&self) -> usize {
        self.tickable.len()
    }

    /// Number of instances receiving `async_tick()`.
    pub fn async_tickable_count(&self) -> usize {
        self.async_tickable.len()
    }

    fn classify(&mut self, instance: &SharedInstance) {
        let caps = instance.capabilities();
        if caps.contains(InstanceCapabilities::TICK) {
            self.tickable.push(Arc::clone(instance));
        }
        if caps.contains(InstanceCapabilities::ASYNC_TICK) {
            self.async_tickable.push(Arc::clone(instance));
        }
    }

    fn declassify(&mut self, id: InstanceId) {
        self.tickable.retain(|i| i.identifier() != id);
        self.async_tickable.retain(|i| i.identifier() != id);
    }

    /// Remove every instance whose should-discard flag is set.
    fn cleanup_discarded(&mut self) {
        let mut all = Vec::with_capacity(self.storage.len());
        self.storage.collect_all(&mut all);
        let discarded: Vec<InstanceId> = all
            .iter()
            .filter(|i| i.should_discard())
            .map(|i| i.identifier())
            .collect();

        if discarded.is_empty() {
            return;
        }
        crate::index_trace!(S::SOURCE, "Discarding {} instance(s)", discarded.len());
        for id in discarded {
            self.remove(id);
        }
    }
}

impl<S: ContainerStorage> InstanceContainer for BaseContainer<S> {
    fn container_type(&self) -> ContainerType {
        S::CONTAINER_TYPE
    }

    fn render_parameter(&self) -> RenderParameter {
        self.render_parameter
    }

    fn add(&mut self, instance: SharedInstance) -> Result<bool> {
        let id = instance.identifier();
        let bounds = instance.bounding_volume();

        if S::SPATIAL {
            match bounds {
                None => index_bail!(S::SOURCE, InvalidInstance,
                    "instance {} has no bounding volume", id),
                Some(b) if !b.is_valid() => index_bail!(S::SOURCE, InvalidInstance,
                    "instance {} has an inverted bounding volume {:?}", id, b),
                Some(_) => {}
            }
        }

        if let Some(existing) = self.storage.get(id) {
            if !existing.should_discard() {
                self.storage.reject_duplicate(id);
                return Ok(false);
            }
            self.remove(id);
        }

        self.storage.insert(Arc::clone(&instance), bounds);
        self.classify(&instance);
        self.listeners.fire_added(&instance, self.render_parameter, S::CONTAINER_TYPE);
        Ok(true)
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        let instance = self.storage.remove(id)?;
        self.declassify(id);
        self.listeners.fire_removed(&instance);
        Some(instance)
    }

    fn tick(&self) {
        for instance in &self.tickable {
            instance.tick();
        }
    }

    fn async_tick(&self) {
        for instance in &self.async_tickable {
            instance.async_tick();
        }
    }

    fn swap_data(&mut self) {
        self.cleanup_discarded();
        for instance in &self.async_tickable {
            instance.swap_data();
        }
        self.storage.resync();
    }

    fn dirty_check(&self) {
        let mut seen = FxHashSet::default();
        for instance in self.tickable.iter().chain(self.async_tickable.iter()) {
            if !seen.insert(instance.identifier()) {
                continue;
            }
            if instance.is_batch_dirty() {
                self.listeners.fire_dirty(instance);
                instance.clear_batch_dirty_flags();
            }
        }
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.tickable.clear();
        self.async_tickable.clear();
    }

    fn all_instances(&self) -> Vec<SharedInstance> {
        let mut out = Vec::with_capacity(self.storage.len());
        self.storage.collect_all(&mut out);
        out
    }

    fn visible_instances(&self, context: &dyn RenderContext) -> Vec<SharedInstance> {
        let mut out = Vec::new();
        match context.frustum() {
            Some(frustum) => self.storage.collect_visible(frustum, &mut out),
            None => {
                self.storage.collect_all(&mut out);
                retain_renderable(&mut out, 0);
            }
        }
        out
    }

    fn get(&self, id: InstanceId) -> Option<SharedInstance> {
        self.storage.get(id).cloned()
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn add_listener(&mut self, listener: Arc<dyn ContainerListener>) {
        self.listeners.add(listener);
    }

    fn remove_listener(&mut self, listener: &Arc<dyn ContainerListener>) -> bool {
        self.listeners.remove(listener)
    }
}

#[cfg(test)]
#[path = "base_container_tests.rs"]
mod tests;
