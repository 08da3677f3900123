/// Container contract shared by every storage strategy.
///
/// Per-frame call order, driven by the owner (see `FrameDriver`):
///
/// 1. `tick()` on the simulation thread
/// 2. `async_tick()` on a worker, concurrently with read-only queries
/// 3. join
/// 4. `swap_data()`: the only point where index topology changes
/// 5. `dirty_check()`
///
/// `add` / `remove` / `clear` also change topology; they take `&mut self`
/// and therefore cannot overlap an in-flight `async_tick`.

use std::sync::Arc;
use crate::error::Result;
use crate::instance::{ContainerListener, InstanceId, RenderParameter, SharedInstance};
use crate::view::RenderContext;
use super::aabb_tree::AabbTreeContainer;
use super::octree::OctreeContainer;
use super::priority::PriorityContainer;
use super::queue::QueueContainer;

/// Storage strategy of a container, reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    /// Incrementally balanced binary tree of boxes
    AabbTree,
    /// Fixed-bounds loose octree
    Octree,
    /// List kept sorted by a caller-supplied order
    Priority,
    /// Plain insertion order
    Queue,
}

impl ContainerType {
    /// Whether the strategy culls against the frustum.
    pub fn is_spatial(self) -> bool {
        matches!(self, ContainerType::AabbTree | ContainerType::Octree)
    }
}

/// Operations every container strategy implements.
pub trait InstanceContainer: Send + Sync {
    fn container_type(&self) -> ContainerType;

    /// Batch key forwarded to `on_instance_added`.
    fn render_parameter(&self) -> RenderParameter;

    /// Store an instance.
    ///
    /// Returns `Ok(false)` when a live (non-discarded) instance with the same
    /// identifier is already stored. A discarded holder of the identifier is
    /// removed first and replaced. Spatial strategies fail with
    /// `Error::InvalidInstance` when the instance has no usable bounds.
    fn add(&mut self, instance: SharedInstance) -> Result<bool>;

    /// Remove and return an instance. `None` if absent.
    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance>;

    /// Dispatch `tick()` to tickable instances.
    fn tick(&self);

    /// Dispatch `async_tick()` to async-tickable instances.
    /// Never writes index topology.
    fn async_tick(&self);

    /// Safe mutation point: discard cleanup, `swap_data()` on async-tickable
    /// instances, then re-sync stored bounds against current bounds.
    fn swap_data(&mut self);

    /// Fire `on_instance_dirty` for each tickable instance whose batch-dirty
    /// flag is set, then clear the flag.
    fn dirty_check(&self);

    /// Drop every instance. No events fire.
    fn clear(&mut self);

    fn all_instances(&self) -> Vec<SharedInstance>;

    /// Instances passing the should-render flag and, for spatial strategies,
    /// the context's frustum. Without a frustum only should-render applies.
    fn visible_instances(&self, context: &dyn RenderContext) -> Vec<SharedInstance>;

    fn get(&self, id: InstanceId) -> Option<SharedInstance>;

    fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_listener(&mut self, listener: Arc<dyn ContainerListener>);

    /// Unregister by pointer identity. Returns false if it was not registered.
    fn remove_listener(&mut self, listener: &Arc<dyn ContainerListener>) -> bool;
}

/// Closed set of container strategies.
pub enum Container {
    AabbTree(AabbTreeContainer),
    Octree(OctreeContainer),
    Priority(PriorityContainer),
    Queue(QueueContainer),
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Container::AabbTree($c) => $body,
            Container::Octree($c) => $body,
            Container::Priority($c) => $body,
            Container::Queue($c) => $body,
        }
    };
}

impl InstanceContainer for Container {
    fn container_type(&self) -> ContainerType {
        dispatch!(self, c => c.container_type())
    }

    fn render_parameter(&self) -> RenderParameter {
        dispatch!(self, c => c.render_parameter())
    }

    fn add(&mut self, instance: SharedInstance) -> Result<bool> {
        dispatch!(self, c => c.add(instance))
    }

    fn remove(&mut self, id: InstanceId) -> Option<SharedInstance> {
        dispatch!(self, c => c.remove(id))
    }

    fn tick(&self) {
        dispatch!(self, c => c.tick())
    }

    fn async_tick(&self) {
        dispatch!(self, c => c.async_tick())
    }

    fn swap_data(&mut self) {
        dispatch!(self, c => c.swap_data())
    }

    fn dirty_check(&self) {
        dispatch!(self, c => c.dirty_check())
    }

    fn clear(&mut self) {
        dispatch!(self, c => c.clear())
    }

    fn all_instances(&self) -> Vec<SharedInstance> {
        dispatch!(self, c => c.all_instances())
    }

    fn visible_instances(&self, context: &dyn RenderContext) -> Vec<SharedInstance> {
        dispatch!(self, c => c.visible_instances(context))
    }

    fn get(&self, id: InstanceId) -> Option<SharedInstance> {
        dispatch!(self, c => c.get(id))
    }

    fn len(&self) -> usize {
        dispatch!(self, c => c.len())
    }

    fn add_listener(&mut self, listener: Arc<dyn ContainerListener>) {
        dispatch!(self, c => c.add_listener(listener))
    }

    fn remove_listener(&mut self, listener: &Arc<dyn ContainerListener>) -> bool {
        dispatch!(self, c => c.remove_listener(listener))
    }
}

impl From<AabbTreeContainer> for Container {
    fn from(container: AabbTreeContainer) -> Self {
        Container::AabbTree(container)
    }
}

impl From<OctreeContainer> for Container {
    fn from(container: OctreeContainer) -> Self {
        Container::Octree(container)
    }
}

impl From<PriorityContainer> for Container {
    fn from(container: PriorityContainer) -> Self {
        Container::Priority(container)
    }
}

impl From<QueueContainer> for Container {
    fn from(container: QueueContainer) -> Self {
        Container::Queue(container)
    }
}
