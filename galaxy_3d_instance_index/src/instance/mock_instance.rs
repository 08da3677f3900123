//! Test doubles for the instance contract.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use glam::Vec3;
use crate::bounds::AABB;
use crate::container::ContainerType;
use super::graphics_instance::{
    GraphicsInstance, InstanceCapabilities, InstanceId, RenderParameter, SharedInstance,
};
use super::listener::ContainerListener;

// ============================================================================
// Mock Instance
// ============================================================================

pub struct MockInstance {
    id: InstanceId,
    bounds: Mutex<Option<AABB>>,
    capabilities: InstanceCapabilities,
    render: AtomicBool,
    discard: AtomicBool,
    dirty: AtomicBool,
    pub ticks: AtomicU32,
    pub async_ticks: AtomicU32,
    pub swaps: AtomicU32,
}

impl MockInstance {
    pub fn new(id: u64, bounds: Option<AABB>, capabilities: InstanceCapabilities) -> Arc<Self> {
        Arc::new(Self {
            id: InstanceId(id),
            bounds: Mutex::new(bounds),
            capabilities,
            render: AtomicBool::new(true),
            discard: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            ticks: AtomicU32::new(0),
            async_ticks: AtomicU32::new(0),
            swaps: AtomicU32::new(0),
        })
    }

    /// Renderable unit cube at `center`, no hooks.
    pub fn cube(id: u64, center: Vec3) -> Arc<Self> {
        Self::new(id, Some(AABB::from_center(center, Vec3::splat(0.5))), InstanceCapabilities::empty())
    }

    pub fn boxed(id: u64, min: Vec3, max: Vec3) -> Arc<Self> {
        Self::new(id, Some(AABB::new(min, max)), InstanceCapabilities::empty())
    }

    pub fn unbounded(id: u64) -> Arc<Self> {
        Self::new(id, None, InstanceCapabilities::empty())
    }

    pub fn set_bounds(&self, bounds: Option<AABB>) {
        *self.bounds.lock().unwrap() = bounds;
    }

    pub fn set_render(&self, value: bool) {
        self.render.store(value, Ordering::SeqCst);
    }

    pub fn set_discard(&self, value: bool) {
        self.discard.store(value, Ordering::SeqCst);
    }

    pub fn set_dirty(&self, value: bool) {
        self.dirty.store(value, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

impl GraphicsInstance for MockInstance {
    fn identifier(&self) -> InstanceId {
        self.id
    }

    fn should_render(&self) -> bool {
        self.render.load(Ordering::SeqCst)
    }

    fn should_discard(&self) -> bool {
        self.discard.load(Ordering::SeqCst)
    }

    fn is_batch_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn clear_batch_dirty_flags(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn bounding_volume(&self) -> Option<AABB> {
        *self.bounds.lock().unwrap()
    }

    fn capabilities(&self) -> InstanceCapabilities {
        self.capabilities
    }

    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn async_tick(&self) {
        self.async_ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn swap_data(&self) {
        self.swaps.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Added(InstanceId, RenderParameter, ContainerType),
    Removed(InstanceId),
    Dirty(InstanceId),
}

#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl ContainerListener for RecordingListener {
    fn on_instance_added(
        &self,
        instance: &SharedInstance,
        render_parameter: RenderParameter,
        container_type: ContainerType,
    ) {
        self.events.lock().unwrap().push(Event::Added(instance.identifier(), render_parameter, container_type));
    }

    fn on_instance_removed(&self, instance: &SharedInstance) {
        self.events.lock().unwrap().push(Event::Removed(instance.identifier()));
    }

    fn on_instance_dirty(&self, instance: &SharedInstance) {
        self.events.lock().unwrap().push(Event::Dirty(instance.identifier()));
    }
}

/// Sorted identifiers of a query result.
pub fn ids(instances: &[SharedInstance]) -> Vec<u64> {
    let mut ids: Vec<u64> = instances.iter().map(|i| i.identifier().0).collect();
    ids.sort_unstable();
    ids
}
