//! Boundary value types.
//!
//! These are plain fixed-layout aggregates: no identity, no ownership. They
//! are copied on every crossing of the host boundary.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 3-component float vector (`float3` at the boundary).
pub type Float3 = Vec3;

/// Axis-aligned box stored as center plus half extent (`Box` at the boundary).
///
/// A box with any negative half-extent component is empty.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// The canonical empty box.
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        half_extent: Vec3::splat(-1.0),
    };

    #[inline]
    #[must_use]
    pub fn new(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extent: (max - min) * 0.5,
        }
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extent
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extent
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.half_extent.min_element() < 0.0
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        if self.is_empty() {
            return false;
        }
        let d = (point - self.center).abs();
        d.cmple(self.half_extent).all()
    }

    /// Smallest box enclosing both; empty boxes are ignored.
    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => *other,
            (_, true) => *self,
            _ => Self::from_min_max(self.min().min(other.min()), self.max().max(other.max())),
        }
    }

    /// Marshaled form: `[center, halfExtent]`.
    #[must_use]
    pub fn to_array(&self) -> [[f32; 3]; 2] {
        [self.center.to_array(), self.half_extent.to_array()]
    }

    #[must_use]
    pub fn from_array(a: [[f32; 3]; 2]) -> Self {
        Self::new(Vec3::from_array(a[0]), Vec3::from_array(a[1]))
    }
}
