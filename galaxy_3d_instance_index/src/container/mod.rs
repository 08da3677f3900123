//! Container module: the instance registry strategies.
//!
//! Four interchangeable strategies share one contract (`InstanceContainer`)
//! and one bookkeeping layer (`BaseContainer`):
//!
//! - `AabbTreeContainer`: dynamic bounding-box tree, tight culling
//! - `OctreeContainer`: fixed-bounds loose octree
//! - `PriorityContainer`: sorted list, no culling
//! - `QueueContainer`: insertion order, no culling

mod aabb_tree;
mod base_container;
#[allow(clippy::module_inception)]
mod container;
mod octree;
mod priority;
mod queue;

pub use aabb_tree::{AabbTree, AabbTreeContainer};
pub use base_container::{BaseContainer, ContainerStorage};
pub use container::{Container, ContainerType, InstanceContainer};
pub use octree::{Octree, OctreeContainer};
pub use priority::{by_identifier, PriorityContainer, PriorityList, PriorityOrder};
pub use queue::{QueueContainer, QueueList};
