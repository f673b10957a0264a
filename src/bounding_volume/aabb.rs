//! Axis Aligned Bounding Box.

use crate::bounding_volume::BoundingVolume;
use crate::math::{Isometry, Point, Real, Vector, DIM};
use na;
use num::Bounded;

/// An Axis Aligned Bounding Box.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with the smallest coordinates of this AABB.
    pub mins: Point<Real>,
    /// The point with the highest coordinates of this AABB.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB.
    ///
    /// # Arguments:
    ///   * `mins` - position of the point with the smallest coordinates.
    ///   * `maxs` - position of the point with the highest coordinates. Each component of `mins`
    ///     must be smaller than the related components of `maxs`.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::max_value` and `maxs`
    /// components set to `-Real::max_value`.
    ///
    /// This is often used as the initial value of some AABB merging algorithms.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::max_value()).into(),
            Vector::repeat(-Real::max_value()).into(),
        )
    }

    /// Creates a new AABB from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates a new AABB from a set of points.
    pub fn from_points<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        let mut result = Self::new_invalid();
        for pt in pts {
            result.take_point(*pt);
        }
        result
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The volume of this AABB.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Computes the AABB bounding `self` transformed by `m`.
    #[inline]
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        let ls_center = self.center();
        let center = m * ls_center;
        let abs_rot = m.rotation.to_rotation_matrix().into_inner().abs();
        let ws_half_extents = abs_rot * self.half_extents();

        Aabb::new(center - ws_half_extents, center + ws_half_extents)
    }

    /// This AABB translated by `v`.
    #[inline]
    pub fn translated(&self, v: &Vector<Real>) -> Self {
        Aabb::new(self.mins + v, self.maxs + v)
    }

    /// Checks whether the given point is inside of this AABB.
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        for i in 0..DIM {
            if point[i] < self.mins[i] || point[i] > self.maxs[i] {
                return false;
            }
        }

        true
    }

    /// The smallest distance between a point and this AABB.
    ///
    /// Returns 0.0 if the point is inside of this AABB.
    #[inline]
    pub fn distance_to_local_point(&self, point: &Point<Real>) -> Real {
        let mut dist2 = 0.0;
        for i in 0..DIM {
            let gap = (self.mins[i] - point[i]).max(point[i] - self.maxs[i]).max(0.0);
            dist2 += gap * gap;
        }
        dist2.sqrt()
    }

    /// The smallest distance between two AABBs.
    ///
    /// Returns 0.0 if they intersect.
    #[inline]
    pub fn distance_to_aabb(&self, other: &Aabb) -> Real {
        let mut dist2 = 0.0;
        for i in 0..DIM {
            let gap = (self.mins[i] - other.maxs[i])
                .max(other.mins[i] - self.maxs[i])
                .max(0.0);
            dist2 += gap * gap;
        }
        dist2.sqrt()
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        self.center()
    }

    #[inline]
    fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    #[inline]
    fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    #[inline]
    fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    #[inline]
    fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// The squared norm of this AABB's diagonal.
    #[inline]
    fn size(&self) -> Real {
        (self.maxs - self.mins).norm_squared()
    }

    #[inline]
    fn distance(&self, other: &Aabb) -> Real {
        self.distance_to_aabb(other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Point, Vector};

    #[test]
    fn aabb_distance_disjoint() {
        let a = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point::new(2.0, 2.0, 2.0), Point::new(3.0, 3.0, 3.0));
        assert_relative_eq!(a.distance_to_aabb(&b), 3.0f64.sqrt() as Real, epsilon = 1.0e-9);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn aabb_transform_by_translation() {
        let a = Aabb::new(Point::origin(), Point::new(1.0, 2.0, 3.0));
        let m = crate::math::Isometry::translation(1.0, 0.0, -1.0);
        let b = a.transform_by(&m);
        assert_relative_eq!(b.mins, Point::new(1.0, 0.0, -1.0));
        assert_relative_eq!(b.maxs, Point::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn aabb_merged_contains_both() {
        let a = Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0));
        let b = Aabb::from_half_extents(Point::new(4.0, 0.0, 0.0), Vector::repeat(0.5));
        let m = a.merged(&b);
        assert!(m.contains(&a));
        assert!(m.contains(&b));
    }
}
