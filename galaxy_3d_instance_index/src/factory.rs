/// ContainerFactory: builds containers of any strategy from shared settings.
///
/// Owned by the pipeline and passed where containers are created, so two
/// pipelines never share construction settings by accident.

use crate::config::OctreeConfig;
use crate::container::{
    by_identifier, AabbTreeContainer, Container, ContainerType, OctreeContainer,
    PriorityContainer, PriorityOrder, QueueContainer,
};
use crate::error::Result;
use crate::instance::RenderParameter;

pub struct ContainerFactory {
    octree_config: OctreeConfig,
    priority_order: PriorityOrder,
}

impl ContainerFactory {
    /// Factory with a custom octree configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the octree configuration is unusable.
    pub fn new(octree_config: OctreeConfig) -> Result<Self> {
        octree_config.validate()?;
        Ok(Self::with_config(octree_config))
    }

    fn with_config(octree_config: OctreeConfig) -> Self {
        crate::index_info!("galaxy3d::ContainerFactory",
            "Container factory ready (octree depth {}, split threshold {})",
            octree_config.max_depth, octree_config.split_threshold);
        Self {
            octree_config,
            priority_order: by_identifier(),
        }
    }

    /// Replace the order used by priority containers built from now on.
    pub fn with_priority_order(mut self, order: PriorityOrder) -> Self {
        self.priority_order = order;
        self
    }

    pub fn octree_config(&self) -> &OctreeConfig {
        &self.octree_config
    }

    /// Build an empty container.
    pub fn create(&self, container_type: ContainerType, render_parameter: RenderParameter) -> Result<Container> {
        let container: Container = match container_type {
            ContainerType::AabbTree => AabbTreeContainer::new(render_parameter).into(),
            ContainerType::Octree => {
                OctreeContainer::new(render_parameter, self.octree_config.clone())?.into()
            }
            ContainerType::Priority => {
                PriorityContainer::new(render_parameter, self.priority_order.clone()).into()
            }
            ContainerType::Queue => QueueContainer::new(render_parameter).into(),
        };
        Ok(container)
    }
}

impl Default for ContainerFactory {
    fn default() -> Self {
        Self::with_config(OctreeConfig::default())
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
