//! Instance module: the contract between the rendering layer and the
//! containers, plus the listener fan-out.
//!
//! Graphics instances are owned by the rendering layer. Containers only
//! store shared handles and query them.

mod graphics_instance;
mod listener;
#[cfg(test)]
pub(crate) mod mock_instance;

pub use graphics_instance::{
    GraphicsInstance, InstanceCapabilities, InstanceId, RenderParameter, SharedInstance,
};
pub use listener::{ContainerListener, ListenerList};
