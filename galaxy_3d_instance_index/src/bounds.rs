/// Axis-aligned bounding boxes.
///
/// World-space boxes are copied into the spatial indices at the safe
/// mutation point; the indices never read an instance's live bounds
/// during a query.

use glam::Vec3;

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Create a box from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with half-size `half_extent` on every axis.
    pub fn from_center(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// True if `min <= max` on every axis and no coordinate is NaN.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis (clamped to zero for inverted boxes).
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    /// Volume of the box. Flat boxes have zero volume.
    pub fn volume(&self) -> f32 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    /// Surface area of the box. Non-zero for flat boxes.
    pub fn surface_area(&self) -> f32 {
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// Touching faces count as contained.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// One eighth of this box.
    ///
    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z
    /// (0 = low half, 1 = high half).
    pub fn octant(&self, octant: u8) -> AABB {
        let c = self.center();
        let pick = |bit: u8, lo: f32, mid: f32, hi: f32| {
            if octant & bit == 0 { (lo, mid) } else { (mid, hi) }
        };
        let (min_x, max_x) = pick(1, self.min.x, c.x, self.max.x);
        let (min_y, max_y) = pick(2, self.min.y, c.y, self.max.y);
        let (min_z, max_z) = pick(4, self.min.z, c.z, self.max.z);
        AABB {
            min: Vec3::new(min_x, min_y, min_z),
            max: Vec3::new(max_x, max_y, max_z),
        }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
