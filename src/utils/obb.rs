use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Matrix, Point, Real, Rotation, Vector, DEFAULT_EPSILON};

/// An oriented bounding box.
#[derive(Copy, Clone, Debug)]
pub struct Obb {
    /// The center of this box.
    pub center: Point<Real>,
    /// The orientation of this box.
    pub rotation: Rotation,
    /// The half-extents of this box along its local axes.
    pub half_extents: Vector<Real>,
}

impl Obb {
    /// The oriented box covering `aabb` transformed by `pos`.
    pub fn from_aabb(aabb: &Aabb, pos: &Isometry<Real>) -> Self {
        Self {
            center: pos * aabb.center(),
            rotation: pos.rotation,
            half_extents: aabb.half_extents(),
        }
    }

    /// Tests whether this box intersects another one, by the separating-axis theorem.
    pub fn intersects(&self, other: &Obb) -> bool {
        // Work in the local frame of `self`.
        let rot12 = self.rotation.inverse() * other.rotation;
        let r: Matrix<Real> = rot12.to_rotation_matrix().into_inner();
        let t = self
            .rotation
            .inverse_transform_vector(&(other.center - self.center));

        // Inflated absolute rotation, to avoid missing separations on near-parallel axes.
        let abs_r = r.map(|x| x.abs() + DEFAULT_EPSILON);

        let ea = self.half_extents;
        let eb = other.half_extents;

        // The axes of `self`.
        for i in 0..3 {
            let rb = eb.x * abs_r[(i, 0)] + eb.y * abs_r[(i, 1)] + eb.z * abs_r[(i, 2)];
            if t[i].abs() > ea[i] + rb {
                return false;
            }
        }

        // The axes of `other`.
        for j in 0..3 {
            let ra = ea.x * abs_r[(0, j)] + ea.y * abs_r[(1, j)] + ea.z * abs_r[(2, j)];
            if (t.x * r[(0, j)] + t.y * r[(1, j)] + t.z * r[(2, j)]).abs() > ra + eb[j] {
                return false;
            }
        }

        // The nine cross products of both boxes' axes.
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[(i2, j)] + ea[i2] * abs_r[(i1, j)];
                let rb = eb[j1] * abs_r[(i, j2)] + eb[j2] * abs_r[(i, j1)];
                if (t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)]).abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Point, Vector};

    #[test]
    fn rotated_obb_overlap() {
        let aabb = Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0));
        let a = Obb::from_aabb(&aabb, &Isometry::identity());
        let rot = Isometry::new(
            Vector::new(2.5, 0.0, 0.0),
            Vector::new(0.0, 0.0, std::f64::consts::FRAC_PI_4 as Real),
        );
        let b = Obb::from_aabb(&aabb, &rot);

        // The rotated box reaches sqrt(2) toward the first one.
        assert!(!a.intersects(&b));
        let closer = Obb::from_aabb(&aabb, &Isometry::translation(1.9, 0.0, 0.0));
        assert!(a.intersects(&closer));
    }
}
