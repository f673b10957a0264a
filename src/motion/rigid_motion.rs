use crate::math::{
    Isometry, Point, Real, Rotation, Translation, UnitVector, Vector,
};

/// A continuous rigid motion.
///
/// This is a function, assumed to be continuous, that, given a parameter `t ∈ [0, 1]`,
/// returns a direct isometry.
pub trait RigidMotion {
    /// Get a position at the time `t`.
    fn position_at_time(&self, t: Real) -> Isometry<Real>;

    /// An upper bound of the velocity, projected on `dir`, of any point rigidly attached to
    /// this motion and lying within `angular_disc` of the moving frame's origin.
    ///
    /// Conservative advancement divides the current separation by the sum of both objects'
    /// bounds to obtain a safe time step.
    fn motion_bound(&self, dir: &Vector<Real>, angular_disc: Real) -> Real;
}

/// The motion interpolation used to connect the begin and end transforms of a
/// continuous-collision query.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CcdMotionType {
    /// Constant translational velocity, constant rotation.
    Translation,
    /// Linear interpolation of the translation, spherical interpolation of the rotation.
    Interp,
    /// Rotation about a fixed spatial axis combined with sliding along it.
    Screw,
    /// A smooth ease-in/ease-out blend between the two endpoint transforms.
    Spline,
}

/// A motion with constant translational velocity and fixed rotation.
#[derive(Clone, Debug)]
pub struct TranslationMotion {
    /// The transformation at `t = 0`.
    pub start: Isometry<Real>,
    /// The translational velocity over the unit time interval.
    pub velocity: Vector<Real>,
}

impl TranslationMotion {
    /// Initializes a translation motion from the begin and end transforms.
    ///
    /// The rotation is taken from `start` and kept constant.
    pub fn new(start: Isometry<Real>, end: Isometry<Real>) -> Self {
        Self {
            velocity: end.translation.vector - start.translation.vector,
            start,
        }
    }

    /// The constant translational velocity of this motion.
    #[inline]
    pub fn velocity(&self) -> Vector<Real> {
        self.velocity
    }
}

impl RigidMotion for TranslationMotion {
    fn position_at_time(&self, t: Real) -> Isometry<Real> {
        Isometry::from_parts(
            (self.start.translation.vector + self.velocity * t).into(),
            self.start.rotation,
        )
    }

    fn motion_bound(&self, dir: &Vector<Real>, _angular_disc: Real) -> Real {
        self.velocity.dot(dir).max(0.0)
    }
}

/// Interpolation between two transforms using LERP for the translation part and SLERP for
/// the rotation part.
#[derive(Clone, Debug)]
pub struct InterpMotion {
    /// The transformation at `t = 0`.
    pub start: Isometry<Real>,
    /// The transformation at `t = 1`.
    pub end: Isometry<Real>,
    linvel: Vector<Real>,
    angvel: Real,
}

impl InterpMotion {
    /// Initializes a lerp-slerp motion with the given begin and end transforms.
    pub fn new(start: Isometry<Real>, end: Isometry<Real>) -> Self {
        let linvel = end.translation.vector - start.translation.vector;
        let angvel = start.rotation.angle_to(&end.rotation);
        Self {
            start,
            end,
            linvel,
            angvel,
        }
    }
}

impl RigidMotion for InterpMotion {
    fn position_at_time(&self, t: Real) -> Isometry<Real> {
        self.start.lerp_slerp(&self.end, t)
    }

    fn motion_bound(&self, dir: &Vector<Real>, angular_disc: Real) -> Real {
        self.linvel.dot(dir).max(0.0) + self.angvel * angular_disc
    }
}

/// A screw motion: rotation about a fixed spatial axis combined with sliding along it.
#[derive(Clone, Debug)]
pub struct ScrewMotion {
    /// The transformation at `t = 0`.
    pub start: Isometry<Real>,
    axis_origin: Point<Real>,
    axis: UnitVector<Real>,
    angvel: Real,
    linvel: Real,
    // Fallback displacement for rotation-free begin/end pairs.
    translation: Vector<Real>,
}

impl ScrewMotion {
    /// Initializes a screw motion from the begin and end transforms.
    ///
    /// The screw axis, angle and slide are recovered from the relative displacement
    /// `end * start⁻¹`.
    pub fn new(start: Isometry<Real>, end: Isometry<Real>) -> Self {
        let delta = end * start.inverse();
        let translation = delta.translation.vector;

        if let Some(axis) = delta.rotation.axis() {
            let angle = delta.rotation.angle();
            let slide = translation.dot(&axis);
            let perp = translation - *axis * slide;
            // Solve (I - R) c = p_perp for the axis origin.
            let half_cot = 0.5 / (angle * 0.5).tan();
            let axis_origin = Point::from(0.5 * perp + half_cot * axis.cross(&perp));

            Self {
                start,
                axis_origin,
                axis,
                angvel: angle,
                linvel: slide,
                translation,
            }
        } else {
            Self {
                start,
                axis_origin: Point::origin(),
                axis: Vector::x_axis(),
                angvel: 0.0,
                linvel: 0.0,
                translation,
            }
        }
    }

    // Distance between the moving frame's origin and the screw axis.
    fn origin_axis_distance(&self) -> Real {
        let rel = self.start.translation.vector - self.axis_origin.coords;
        (rel - *self.axis * rel.dot(&self.axis)).norm()
    }
}

impl RigidMotion for ScrewMotion {
    fn position_at_time(&self, t: Real) -> Isometry<Real> {
        if self.angvel == 0.0 {
            return Translation::from(self.translation * t) * self.start;
        }

        let rot = Rotation::from_axis_angle(&self.axis, self.angvel * t);
        let slide = Translation::from(*self.axis * (self.linvel * t));
        let about_axis = Translation::from(self.axis_origin.coords)
            * rot
            * Translation::from(-self.axis_origin.coords);
        slide * about_axis * self.start
    }

    fn motion_bound(&self, dir: &Vector<Real>, angular_disc: Real) -> Real {
        if self.angvel == 0.0 {
            self.translation.dot(dir).max(0.0)
        } else {
            self.linvel.abs()
                + self.angvel.abs() * (self.origin_axis_distance() + angular_disc)
        }
    }
}

/// A smooth ease-in/ease-out blend between two endpoint transforms, with zero velocity at
/// both ends.
#[derive(Clone, Debug)]
pub struct SplineMotion {
    /// The transformation at `t = 0`.
    pub start: Isometry<Real>,
    /// The transformation at `t = 1`.
    pub end: Isometry<Real>,
    linvel: Vector<Real>,
    angvel: Real,
}

impl SplineMotion {
    /// Initializes a spline motion with the given begin and end transforms.
    pub fn new(start: Isometry<Real>, end: Isometry<Real>) -> Self {
        let linvel = end.translation.vector - start.translation.vector;
        let angvel = start.rotation.angle_to(&end.rotation);
        Self {
            start,
            end,
            linvel,
            angvel,
        }
    }
}

impl RigidMotion for SplineMotion {
    fn position_at_time(&self, t: Real) -> Isometry<Real> {
        let s = t * t * (3.0 - 2.0 * t);
        self.start.lerp_slerp(&self.end, s)
    }

    fn motion_bound(&self, dir: &Vector<Real>, angular_disc: Real) -> Real {
        // The smoothstep parameter speed peaks at 1.5.
        1.5 * (self.linvel.dot(dir).max(0.0) + self.angvel * angular_disc)
    }
}

/// A rigid motion, tagged by its interpolation kind.
pub enum Motion {
    /// Constant translational velocity.
    Translation(TranslationMotion),
    /// Lerp-slerp interpolation.
    Interp(InterpMotion),
    /// Screw motion.
    Screw(ScrewMotion),
    /// Eased endpoint blend.
    Spline(SplineMotion),
}

impl Motion {
    /// Builds the motion of the given kind connecting `start` to `end` over the unit time
    /// interval.
    pub fn from_transforms(
        kind: CcdMotionType,
        start: Isometry<Real>,
        end: Isometry<Real>,
    ) -> Self {
        match kind {
            CcdMotionType::Translation => Motion::Translation(TranslationMotion::new(start, end)),
            CcdMotionType::Interp => Motion::Interp(InterpMotion::new(start, end)),
            CcdMotionType::Screw => Motion::Screw(ScrewMotion::new(start, end)),
            CcdMotionType::Spline => Motion::Spline(SplineMotion::new(start, end)),
        }
    }

    /// This motion seen as a translation motion, if it is one.
    pub fn as_translation(&self) -> Option<&TranslationMotion> {
        match self {
            Motion::Translation(motion) => Some(motion),
            _ => None,
        }
    }
}

impl RigidMotion for Motion {
    fn position_at_time(&self, t: Real) -> Isometry<Real> {
        match self {
            Motion::Translation(motion) => motion.position_at_time(t),
            Motion::Interp(motion) => motion.position_at_time(t),
            Motion::Screw(motion) => motion.position_at_time(t),
            Motion::Spline(motion) => motion.position_at_time(t),
        }
    }

    fn motion_bound(&self, dir: &Vector<Real>, angular_disc: Real) -> Real {
        match self {
            Motion::Translation(motion) => motion.motion_bound(dir, angular_disc),
            Motion::Interp(motion) => motion.motion_bound(dir, angular_disc),
            Motion::Screw(motion) => motion.motion_bound(dir, angular_disc),
            Motion::Spline(motion) => motion.motion_bound(dir, angular_disc),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Isometry, Vector};

    #[test]
    fn translation_motion_interpolates_linearly() {
        let start = Isometry::translation(1.0, 0.0, 0.0);
        let end = Isometry::translation(3.0, 0.0, 0.0);
        let motion = TranslationMotion::new(start, end);

        assert_relative_eq!(
            motion.position_at_time(0.5).translation.vector,
            Vector::new(2.0, 0.0, 0.0)
        );
        assert_relative_eq!(motion.velocity(), Vector::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn motions_hit_both_endpoints() {
        let start = Isometry::new(Vector::new(1.0, 2.0, 3.0), Vector::new(0.1, 0.0, 0.4));
        let end = Isometry::new(Vector::new(-2.0, 0.5, 0.0), Vector::new(0.0, 0.7, 0.0));

        for kind in [
            CcdMotionType::Interp,
            CcdMotionType::Screw,
            CcdMotionType::Spline,
        ] {
            let motion = Motion::from_transforms(kind, start, end);

            let at0 = motion.position_at_time(0.0);
            assert_relative_eq!(at0.translation.vector, start.translation.vector, epsilon = 1.0e-6);
            assert_relative_eq!(
                at0.rotation.angle_to(&start.rotation),
                0.0,
                epsilon = 1.0e-6
            );

            let at1 = motion.position_at_time(1.0);
            assert_relative_eq!(at1.translation.vector, end.translation.vector, epsilon = 1.0e-6);
            assert_relative_eq!(at1.rotation.angle_to(&end.rotation), 0.0, epsilon = 1.0e-6);
        }
    }

    #[test]
    fn screw_motion_reaches_end_transform() {
        let start = Isometry::new(Vector::new(1.0, 2.0, 3.0), Vector::new(0.1, 0.0, 0.4));
        let end = Isometry::new(Vector::new(-2.0, 0.5, 0.0), Vector::new(0.0, 0.7, 0.0));
        let motion = ScrewMotion::new(start, end);

        let at1 = motion.position_at_time(1.0);
        assert_relative_eq!(at1.translation.vector, end.translation.vector, epsilon = 1.0e-6);
        assert_relative_eq!(at1.rotation.angle_to(&end.rotation), 0.0, epsilon = 1.0e-6);
    }
}
