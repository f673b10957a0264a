use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Ball, Shape, ShapeClass, ShapeType, SupportMap};

/// A capsule shape: a segment along the local `y` axis, inflated by a radius.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Capsule {
    /// The half-length of the capsule's inner segment.
    pub half_height: Real,
    /// The radius of the capsule.
    pub radius: Real,
}

impl Capsule {
    /// Creates a new capsule from the half-length of its inner segment and its radius.
    #[inline]
    pub fn new(half_height: Real, radius: Real) -> Capsule {
        Capsule {
            half_height,
            radius,
        }
    }
}

impl SupportMap for Capsule {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let mut result = Ball::new(self.radius).local_support_point(dir);
        result.y += self.half_height.copysign(dir.y);
        result
    }
}

impl Shape for Capsule {
    fn compute_local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(
            Point::origin(),
            Vector::new(self.radius, self.half_height + self.radius, self.radius),
        )
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Capsule
    }

    fn shape_class(&self) -> ShapeClass {
        ShapeClass::Geom
    }

    fn angular_motion_disc(&self) -> Real {
        self.half_height + self.radius
    }

    fn as_support_map(&self) -> Option<&dyn SupportMap> {
        Some(self)
    }
}
