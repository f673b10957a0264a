use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Shape, ShapeClass, ShapeType, SupportMap};

/// A cuboid shape, defined by its half-extents.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Cuboid {
    /// The half-extents of the cuboid.
    pub half_extents: Vector<Real>,
}

impl Cuboid {
    /// Creates a new cuboid from its half-extents.
    #[inline]
    pub fn new(half_extents: Vector<Real>) -> Cuboid {
        Cuboid { half_extents }
    }
}

impl SupportMap for Cuboid {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        Point::from(self.half_extents.zip_map(dir, |he, d| he.copysign(d)))
    }
}

impl Shape for Cuboid {
    fn compute_local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.half_extents)
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Cuboid
    }

    fn shape_class(&self) -> ShapeClass {
        ShapeClass::Geom
    }

    fn angular_motion_disc(&self) -> Real {
        self.half_extents.norm()
    }

    fn as_support_map(&self) -> Option<&dyn SupportMap> {
        Some(self)
    }
}
