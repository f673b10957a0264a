use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::{Shape, ShapeClass, ShapeType, SupportMap};

/// A Ball shape.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Ball {
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball with the given radius.
    #[inline]
    pub fn new(radius: Real) -> Ball {
        Ball { radius }
    }
}

impl SupportMap for Ball {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let norm = dir.norm();
        if norm > DEFAULT_EPSILON {
            Point::from(dir * (self.radius / norm))
        } else {
            Point::new(self.radius, 0.0, 0.0)
        }
    }
}

impl Shape for Ball {
    fn compute_local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), Vector::repeat(self.radius))
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Ball
    }

    fn shape_class(&self) -> ShapeClass {
        ShapeClass::Geom
    }

    fn angular_motion_disc(&self) -> Real {
        self.radius
    }

    fn as_support_map(&self) -> Option<&dyn SupportMap> {
        Some(self)
    }
}
