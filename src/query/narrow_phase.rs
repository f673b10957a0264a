use crate::math::{Isometry, Real};
use crate::query::{gjk, ClosestPoints, GjkResult, Unsupported};
use crate::shape::Shape;

/// The flavor of narrow-phase solver to use.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum GjkSolverType {
    /// A solver tuned like the portal-refinement family: a small iteration budget with a
    /// loose tolerance.
    #[default]
    LibCcd,
    /// A solver tuned for tight convergence.
    Indep,
}

/// A narrow-phase solver: decides collision and closest features between two shapes at
/// fixed relative transform.
pub trait NarrowPhase: Send + Sync {
    /// Tests whether two shapes are intersecting.
    fn intersection_test(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
    ) -> Result<bool, Unsupported>;

    /// Computes the pair of closest points between two shapes.
    ///
    /// Returns `ClosestPoints::Disjoint` if the objects are separated by a distance greater
    /// than `max_dist`. Points are expressed in the local-space of the first shape.
    fn closest_points(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
        max_dist: Real,
    ) -> Result<ClosestPoints, Unsupported>;

    /// Computes the minimum distance separating two shapes.
    ///
    /// Returns `0.0` if the objects are touching or penetrating.
    fn distance(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
    ) -> Result<Real, Unsupported>;
}

/// The support-map narrow-phase solver backing both [`GjkSolverType`] flavors.
#[derive(Copy, Clone, Debug)]
pub struct GjkSolver {
    flavor: GjkSolverType,
}

impl Default for GjkSolver {
    fn default() -> Self {
        Self::from_type(GjkSolverType::default())
    }
}

impl GjkSolver {
    /// Creates the solver of the given flavor.
    pub fn from_type(flavor: GjkSolverType) -> Self {
        Self { flavor }
    }

    /// The flavor of this solver.
    pub fn flavor(&self) -> GjkSolverType {
        self.flavor
    }
}

impl NarrowPhase for GjkSolver {
    fn intersection_test(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
    ) -> Result<bool, Unsupported> {
        let sm1 = g1.as_support_map().ok_or(Unsupported)?;
        let sm2 = g2.as_support_map().ok_or(Unsupported)?;
        Ok(gjk::intersection_test(pos12, sm1, sm2))
    }

    fn closest_points(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
        max_dist: Real,
    ) -> Result<ClosestPoints, Unsupported> {
        let sm1 = g1.as_support_map().ok_or(Unsupported)?;
        let sm2 = g2.as_support_map().ok_or(Unsupported)?;

        match gjk::closest_points(pos12, sm1, sm2, max_dist) {
            GjkResult::Intersection => Ok(ClosestPoints::Intersecting),
            GjkResult::ClosestPoints(p1, p2, _) => Ok(ClosestPoints::WithinMargin(p1, p2)),
            GjkResult::NoIntersection(_) => Ok(ClosestPoints::Disjoint),
        }
    }

    fn distance(
        &self,
        pos12: &Isometry<Real>,
        g1: &dyn Shape,
        g2: &dyn Shape,
    ) -> Result<Real, Unsupported> {
        match self.closest_points(pos12, g1, g2, Real::MAX)? {
            ClosestPoints::Intersecting => Ok(0.0),
            ClosestPoints::WithinMargin(p1, p2) => Ok((p2 - p1).norm()),
            ClosestPoints::Disjoint => Ok(Real::MAX),
        }
    }
}

/// Tests whether two shapes positioned in world-space are intersecting, using the default
/// solver.
pub fn intersection_test(
    pos1: &Isometry<Real>,
    g1: &dyn Shape,
    pos2: &Isometry<Real>,
    g2: &dyn Shape,
) -> Result<bool, Unsupported> {
    GjkSolver::default().intersection_test(&pos1.inv_mul(pos2), g1, g2)
}

/// Computes the minimum distance between two shapes positioned in world-space, using the
/// default solver.
pub fn distance(
    pos1: &Isometry<Real>,
    g1: &dyn Shape,
    pos2: &Isometry<Real>,
    g2: &dyn Shape,
) -> Result<Real, Unsupported> {
    GjkSolver::default().distance(&pos1.inv_mul(pos2), g1, g2)
}

/// Computes the closest points between two shapes positioned in world-space, using the
/// default solver. Points are expressed in world-space.
pub fn closest_points(
    pos1: &Isometry<Real>,
    g1: &dyn Shape,
    pos2: &Isometry<Real>,
    g2: &dyn Shape,
    max_dist: Real,
) -> Result<ClosestPoints, Unsupported> {
    let result = GjkSolver::default().closest_points(&pos1.inv_mul(pos2), g1, g2, max_dist)?;
    Ok(match result {
        ClosestPoints::WithinMargin(p1, p2) => ClosestPoints::WithinMargin(pos1 * p1, pos1 * p2),
        other => other,
    })
}
