//! Continuous collision detection between two moving shapes.

pub use self::conservative_advancement::{
    conservative_advancement_matrix, ConservativeAdvancementFn, ConservativeAdvancementMatrix,
};
pub use self::polynomial::{mesh_mesh_toc, MeshContinuousResult};

use crate::math::{Isometry, Real};
use crate::motion::{CcdMotionType, Motion, RigidMotion};
use crate::object::{CollisionObject, ContinuousCollisionObject};
use crate::query::{GjkSolver, GjkSolverType, NarrowPhase};
use crate::shape::{Shape, ShapeClass};

mod conservative_advancement;
mod polynomial;

/// The strategy used to detect the first time of contact between two moving shapes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CcdSolverType {
    /// Sample the motions at regular times and run discrete collision checks.
    #[default]
    Naive,
    /// Iteratively advance a lower bound of the time of contact using closest-distance
    /// queries and motion bounds.
    ConservativeAdvancement,
    /// Shoot a ray along the relative translation. Unimplemented.
    RayShooting,
    /// Solve the exact contact equations of translating meshes.
    Polynomial,
}

/// The configuration of a continuous collision query.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug)]
pub struct ContinuousCollisionRequest {
    /// The motion interpolation connecting the begin and end transforms.
    pub ccd_motion_type: CcdMotionType,
    /// The narrow-phase solver flavor.
    pub gjk_solver_type: GjkSolverType,
    /// The time-of-contact strategy.
    pub ccd_solver_type: CcdSolverType,
    /// The maximum number of sampling iterations of the naive strategy.
    pub num_max_iterations: usize,
    /// The tolerance on the reported time of contact. Must be positive.
    pub toc_err: Real,
}

impl Default for ContinuousCollisionRequest {
    fn default() -> Self {
        Self {
            ccd_motion_type: CcdMotionType::Translation,
            gjk_solver_type: GjkSolverType::default(),
            ccd_solver_type: CcdSolverType::default(),
            num_max_iterations: 10,
            toc_err: 1.0e-4,
        }
    }
}

/// The result of a continuous collision query.
#[derive(Clone, Debug)]
pub struct ContinuousCollisionResult {
    /// Did the two shapes collide during their motions?
    pub is_collide: bool,
    /// The first time of contact, in `[0, 1]`, when `is_collide` is set.
    pub time_of_contact: Real,
    /// The transform of the first shape at the time of contact.
    pub contact_tf1: Isometry<Real>,
    /// The transform of the second shape at the time of contact.
    pub contact_tf2: Isometry<Real>,
}

impl Default for ContinuousCollisionResult {
    fn default() -> Self {
        Self {
            is_collide: false,
            time_of_contact: 1.0,
            contact_tf1: Isometry::identity(),
            contact_tf2: Isometry::identity(),
        }
    }
}

fn continuous_collide_naive(
    g1: &dyn Shape,
    motion1: &Motion,
    g2: &dyn Shape,
    motion2: &Motion,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    let solver = GjkSolver::from_type(request.gjk_solver_type);
    let n_iter = request
        .num_max_iterations
        .min((1.0 / request.toc_err).ceil() as usize)
        .max(1);

    for i in 0..n_iter {
        let t = if n_iter == 1 {
            0.0
        } else {
            i as Real / (n_iter - 1) as Real
        };
        let tf1 = motion1.position_at_time(t);
        let tf2 = motion2.position_at_time(t);

        match solver.intersection_test(&tf1.inv_mul(&tf2), g1, g2) {
            Ok(true) => {
                result.is_collide = true;
                result.time_of_contact = t;
                result.contact_tf1 = tf1;
                result.contact_tf2 = tf2;
                return t;
            }
            Ok(false) => {}
            Err(_) => {
                log::warn!(
                    "naive continuous collision is not supported between shape types {:?} and {:?}",
                    g1.shape_type(),
                    g2.shape_type()
                );
                result.is_collide = false;
                return -1.0;
            }
        }
    }

    result.is_collide = false;
    result.time_of_contact = 1.0;
    result.time_of_contact
}

fn continuous_collide_conservative_advancement(
    g1: &dyn Shape,
    motion1: &Motion,
    g2: &dyn Shape,
    motion2: &Motion,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    let solver = GjkSolver::from_type(request.gjk_solver_type);
    let table = conservative_advancement_matrix();

    let Some(advance) = table.lookup(g1.shape_type(), g2.shape_type()) else {
        log::warn!(
            "conservative advancement is not supported between shape types {:?} and {:?}",
            g1.shape_type(),
            g2.shape_type()
        );
        result.is_collide = false;
        return -1.0;
    };

    let res = advance(g1, motion1, g2, motion2, &solver, request, result);

    if result.is_collide {
        result.contact_tf1 = motion1.position_at_time(result.time_of_contact);
        result.contact_tf2 = motion2.position_at_time(result.time_of_contact);
    }

    res
}

/// Continuous collision detection between two shapes moving along the given motions.
pub fn continuous_collide_motions(
    g1: &dyn Shape,
    motion1: &Motion,
    g2: &dyn Shape,
    motion2: &Motion,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    match request.ccd_solver_type {
        CcdSolverType::Naive => continuous_collide_naive(g1, motion1, g2, motion2, request, result),
        CcdSolverType::ConservativeAdvancement => {
            continuous_collide_conservative_advancement(g1, motion1, g2, motion2, request, result)
        }
        CcdSolverType::RayShooting => {
            if g1.shape_class() == ShapeClass::Geom
                && g2.shape_class() == ShapeClass::Geom
                && request.ccd_motion_type == CcdMotionType::Translation
            {
                // Unimplemented strategy.
            } else {
                log::warn!("invalid continuous collision setting");
            }
            result.is_collide = false;
            -1.0
        }
        CcdSolverType::Polynomial => {
            if let (Some(m1), Some(m2)) = (motion1.as_translation(), motion2.as_translation()) {
                if g1.shape_class() == ShapeClass::Mesh && g2.shape_class() == ShapeClass::Mesh {
                    return polynomial::continuous_collide_mesh_polynomial(
                        g1, m1, g2, m2, request, result,
                    );
                }
            }
            log::warn!("invalid continuous collision checking");
            result.is_collide = false;
            -1.0
        }
    }
}

/// Continuous collision detection between two shapes moving between two transforms each.
///
/// The motions connecting the begin and end transforms are built according to
/// `request.ccd_motion_type`. Returns the time of contact, or `-1.0` for unsupported
/// configurations.
pub fn continuous_collide(
    g1: &dyn Shape,
    tf1_beg: &Isometry<Real>,
    tf1_end: &Isometry<Real>,
    g2: &dyn Shape,
    tf2_beg: &Isometry<Real>,
    tf2_end: &Isometry<Real>,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    let motion1 = Motion::from_transforms(request.ccd_motion_type, *tf1_beg, *tf1_end);
    let motion2 = Motion::from_transforms(request.ccd_motion_type, *tf2_beg, *tf2_end);
    continuous_collide_motions(g1, &motion1, g2, &motion2, request, result)
}

/// Continuous collision detection between two collision objects moving from their current
/// transforms to the given end transforms.
pub fn continuous_collide_objects(
    o1: &CollisionObject,
    tf1_end: &Isometry<Real>,
    o2: &CollisionObject,
    tf2_end: &Isometry<Real>,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    continuous_collide(
        o1.geometry().as_ref(),
        o1.transform(),
        tf1_end,
        o2.geometry().as_ref(),
        o2.transform(),
        tf2_end,
        request,
        result,
    )
}

/// Continuous collision detection between two objects moving along their attached motions.
pub fn collide_continuous_objects(
    o1: &ContinuousCollisionObject,
    o2: &ContinuousCollisionObject,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    continuous_collide_motions(
        o1.geometry().as_ref(),
        o1.motion(),
        o2.geometry().as_ref(),
        o2.motion(),
        request,
        result,
    )
}
