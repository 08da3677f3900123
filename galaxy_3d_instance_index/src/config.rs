//! Container configuration
//!
//! Plain data with defaults, validated when a container is built.

use glam::Vec3;
use crate::bounds::AABB;
use crate::error::Result;
use crate::index_bail;

/// Half-size of the default octree world box on every axis.
pub const DEFAULT_WORLD_HALF_EXTENT: f32 = 16384.0;

/// Default octree depth limit (root = depth 0).
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Default per-node object count above which a childless node splits.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 8;

/// Deepest octree the index accepts.
pub const MAX_OCTREE_DEPTH: u32 = 16;

/// Octree configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeConfig {
    /// Fixed world bounds. Never resized; objects outside stay at the root.
    pub world_bounds: AABB,
    /// Maximum node depth (root = 0)
    pub max_depth: u32,
    /// A childless node splits once its own list exceeds this count
    pub split_threshold: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            world_bounds: AABB::from_center(Vec3::ZERO, Vec3::splat(DEFAULT_WORLD_HALF_EXTENT)),
            max_depth: DEFAULT_MAX_DEPTH,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }
}

impl OctreeConfig {
    /// Default depth and threshold over custom world bounds.
    pub fn with_world_bounds(world_bounds: AABB) -> Self {
        Self {
            world_bounds,
            ..Self::default()
        }
    }

    /// Reject unusable configurations.
    pub fn validate(&self) -> Result<()> {
        let b = &self.world_bounds;
        if !b.is_valid() || !b.min.is_finite() || !b.max.is_finite() || b.volume() <= 0.0 {
            index_bail!("galaxy3d::OctreeConfig", InvalidConfig,
                "world bounds must be finite with positive volume, got {:?}", b);
        }
        if self.split_threshold == 0 {
            index_bail!("galaxy3d::OctreeConfig", InvalidConfig,
                "split_threshold must be at least 1");
        }
        if self.max_depth > MAX_OCTREE_DEPTH {
            index_bail!("galaxy3d::OctreeConfig", InvalidConfig,
                "max_depth {} exceeds the limit of {}", self.max_depth, MAX_OCTREE_DEPTH);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
