/// Container event listeners.
///
/// Listeners are notified after a container mutation completes. Each
/// fan-out iterates a snapshot of the list, so a listener registered or
/// removed while events are firing takes effect at the next event.

use std::sync::Arc;
use crate::container::ContainerType;
use super::graphics_instance::{RenderParameter, SharedInstance};

/// Observer of a container's add / remove / dirty events.
///
/// Callbacks may read the instance they receive but must not call back
/// into the container that fired them.
pub trait ContainerListener: Send + Sync {
    /// An instance was stored.
    fn on_instance_added(
        &self,
        instance: &SharedInstance,
        render_parameter: RenderParameter,
        container_type: ContainerType,
    );

    /// An instance was removed, explicitly or by discard cleanup.
    fn on_instance_removed(&self, instance: &SharedInstance);

    /// A tickable instance reported dirty batch data.
    fn on_instance_dirty(&self, instance: &SharedInstance);
}

/// Registered listeners of one container.
#[derive(Default, Clone)]
pub struct ListenerList {
    listeners: Vec<Arc<dyn ContainerListener>>,
}

impl ListenerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Registering the same `Arc` twice is a no-op.
    pub fn add(&mut self, listener: Arc<dyn ContainerListener>) {
        if !self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    /// Unregister a listener by pointer identity. Returns false if absent.
    pub fn remove(&mut self, listener: &Arc<dyn ContainerListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn ContainerListener>> {
        self.listeners.clone()
    }

    pub(crate) fn fire_added(
        &self,
        instance: &SharedInstance,
        render_parameter: RenderParameter,
        container_type: ContainerType,
    ) {
        for listener in self.snapshot() {
            listener.on_instance_added(instance, render_parameter, container_type);
        }
    }

    pub(crate) fn fire_removed(&self, instance: &SharedInstance) {
        for listener in self.snapshot() {
            listener.on_instance_removed(instance);
        }
    }

    pub(crate) fn fire_dirty(&self, instance: &SharedInstance) {
        for listener in self.snapshot() {
            listener.on_instance_dirty(instance);
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
