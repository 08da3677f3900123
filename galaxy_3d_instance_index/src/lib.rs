/*!
# Galaxy 3D Instance Index

Per-frame registry of renderable instances for the Galaxy 3D engine,
answering "which instances are visible from this frustum?" every frame
while instances are added, removed, moved and discarded.

## Architecture

- **InstanceContainer**: contract shared by every storage strategy
- **BaseContainer**: tickable / async-tickable bookkeeping, discard cleanup,
  listener fan-out, generic over a `ContainerStorage`
- **AabbTree / Octree**: spatial strategies with frustum culling
- **PriorityList / QueueList**: linear strategies, no culling
- **ContainerFactory**: builds any strategy from shared settings
- **FrameDriver**: runs tick → async tick (worker) → join → swap → dirty check

Index topology changes only through `&mut self` calls (`add`, `remove`,
`swap_data`, `clear`). `async_tick` and visibility queries take `&self` and
may overlap freely.
*/

// Internal modules
mod error;
pub mod log;
pub mod bounds;
pub mod config;
pub mod view;
pub mod instance;
pub mod container;
pub mod factory;
pub mod frame;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    pub use crate::bounds::AABB;
    pub use crate::config::OctreeConfig;
    pub use crate::factory::ContainerFactory;
    pub use crate::frame::FrameDriver;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // View sub-module
    pub mod view {
        pub use crate::view::*;
    }

    // Instance sub-module
    pub mod instance {
        pub use crate::instance::*;
    }

    // Container sub-module
    pub mod container {
        pub use crate::container::*;
    }
}

// Re-export math library at crate root
pub use glam;
