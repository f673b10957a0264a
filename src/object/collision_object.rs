use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Real};
use crate::motion::Motion;
use crate::shape::SharedShape;

/// A handle identifying a collision object registered into a broad-phase manager.
///
/// Handles are issued at registration and never reused by the same manager.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CollisionObjectHandle(pub u64);

/// The occupancy state carried by a collision object.
///
/// Regular objects are fully occupied. Objects synthesized from occupancy-tree cells
/// carry the cell's probability and the tree's thresholds instead.
#[derive(Copy, Clone, Debug)]
pub struct Occupancy {
    /// The probability that this object occupies its volume.
    pub density: Real,
    /// Densities at or above this threshold count as occupied.
    pub occupied_threshold: Real,
    /// Densities at or below this threshold count as free.
    pub free_threshold: Real,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            density: 1.0,
            occupied_threshold: 1.0,
            free_threshold: 0.0,
        }
    }
}

/// A shape positioned in the world, with its world-space AABB cached.
#[derive(Clone)]
pub struct CollisionObject {
    geometry: SharedShape,
    transform: Isometry<Real>,
    aabb: Aabb,
    /// The occupancy state of this object.
    pub occupancy: Occupancy,
}

impl CollisionObject {
    /// Creates a collision object from a shared shape and its world transform.
    pub fn new(geometry: SharedShape, transform: Isometry<Real>) -> Self {
        let aabb = geometry.compute_aabb(&transform);
        Self {
            geometry,
            transform,
            aabb,
            occupancy: Occupancy::default(),
        }
    }

    /// The geometry of this object.
    #[inline]
    pub fn geometry(&self) -> &SharedShape {
        &self.geometry
    }

    /// The world transform of this object.
    #[inline]
    pub fn transform(&self) -> &Isometry<Real> {
        &self.transform
    }

    /// Sets the world transform of this object and recomputes its cached AABB.
    pub fn set_transform(&mut self, transform: Isometry<Real>) {
        self.transform = transform;
        self.update_aabb();
    }

    /// The cached world-space AABB of this object.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Recomputes the cached world-space AABB from the current transform.
    pub fn update_aabb(&mut self) {
        self.aabb = self.geometry.compute_aabb(&self.transform);
    }

    /// Is this object known to be free space?
    #[inline]
    pub fn is_free(&self) -> bool {
        self.occupancy.density <= self.occupancy.free_threshold
    }

    /// Is this object occupied?
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupancy.density >= self.occupancy.occupied_threshold
    }
}

/// A shape attached to a motion describing its trajectory over the unit time interval.
pub struct ContinuousCollisionObject {
    geometry: SharedShape,
    motion: Motion,
}

impl ContinuousCollisionObject {
    /// Creates a continuous collision object from a shared shape and its motion.
    pub fn new(geometry: SharedShape, motion: Motion) -> Self {
        Self { geometry, motion }
    }

    /// The geometry of this object.
    #[inline]
    pub fn geometry(&self) -> &SharedShape {
        &self.geometry
    }

    /// The motion of this object.
    #[inline]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }
}
