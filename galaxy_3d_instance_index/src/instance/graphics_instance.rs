/// Graphics instance contract.
///
/// An instance exposes a stable identifier, an optional world-space
/// bounding volume and three flags (should-render, should-discard,
/// batch-dirty). Per-frame hooks (`tick`, `async_tick`, `swap_data`) are
/// dispatched by containers according to `capabilities()`.
///
/// All methods take `&self`: an instance that changes state from its
/// hooks uses interior mutability, and is responsible for making its
/// bounding volume reads safe against concurrent simulation writes.

use std::fmt;
use std::sync::Arc;
use bitflags::bitflags;
use crate::bounds::AABB;

/// Stable identifier of a graphics instance.
///
/// Unique within a container at any instant; reusable only after the
/// previous holder has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque batch key a container feeds (material / pass bucket).
///
/// Passed through to `ContainerListener::on_instance_added`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderParameter(pub u64);

bitflags! {
    /// Per-frame hooks an instance wants dispatched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InstanceCapabilities: u32 {
        /// Receives `tick()` once per simulation step
        const TICK       = 1 << 0;
        /// Receives `async_tick()` on the frame worker and `swap_data()`
        /// at the safe mutation point
        const ASYNC_TICK = 1 << 1;
    }
}

/// Renderable object tracked by a container.
pub trait GraphicsInstance: Send + Sync {
    /// Stable identifier.
    fn identifier(&self) -> InstanceId;

    /// Whether the instance should be drawn this frame.
    fn should_render(&self) -> bool;

    /// Whether the instance asks to be removed at the next cleanup.
    fn should_discard(&self) -> bool;

    /// Whether batch data changed since the last dirty check.
    fn is_batch_dirty(&self) -> bool;

    /// Reset the batch-dirty flag.
    fn clear_batch_dirty_flags(&self);

    /// World-space bounding volume.
    ///
    /// Spatial containers (AABB tree, octree) reject instances returning
    /// `None` from `add`.
    fn bounding_volume(&self) -> Option<AABB> {
        None
    }

    /// Hooks to dispatch. Defaults to none.
    fn capabilities(&self) -> InstanceCapabilities {
        InstanceCapabilities::empty()
    }

    /// Synchronous simulation step.
    fn tick(&self) {}

    /// Per-frame work, possibly on the frame worker thread.
    fn async_tick(&self) {}

    /// Publish the results of `async_tick`. Called at the safe mutation point.
    fn swap_data(&self) {}
}

/// Shared handle stored by containers.
pub type SharedInstance = Arc<dyn GraphicsInstance>;
