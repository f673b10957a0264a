use crate::math::Real;
use crate::motion::{Motion, RigidMotion};
use crate::query::{ClosestPoints, ContinuousCollisionRequest, ContinuousCollisionResult};
use crate::query::{GjkSolver, NarrowPhase};
use crate::shape::{Shape, ShapeType};
use std::sync::OnceLock;

/// A conservative-advancement routine specialized for one pair of shape types.
///
/// Computes the first time of contact of the two shapes along their motions; fills
/// `result` and returns the time of contact, or `-1.0` on failure.
pub type ConservativeAdvancementFn = fn(
    &dyn Shape,
    &Motion,
    &dyn Shape,
    &Motion,
    &GjkSolver,
    &ContinuousCollisionRequest,
    &mut ContinuousCollisionResult,
) -> Real;

/// A table of conservative-advancement routines indexed by pairs of shape types.
///
/// Populated once at first use; read-only afterwards.
pub struct ConservativeAdvancementMatrix {
    table: [[Option<ConservativeAdvancementFn>; ShapeType::COUNT]; ShapeType::COUNT],
}

impl ConservativeAdvancementMatrix {
    fn new() -> Self {
        let mut table: [[Option<ConservativeAdvancementFn>; ShapeType::COUNT];
            ShapeType::COUNT] = [[None; ShapeType::COUNT]; ShapeType::COUNT];

        let support_mapped = [ShapeType::Ball, ShapeType::Cuboid, ShapeType::Capsule];
        for t1 in support_mapped {
            for t2 in support_mapped {
                table[t1 as usize][t2 as usize] = Some(
                    conservative_advancement_support_map as ConservativeAdvancementFn,
                );
            }
        }

        Self { table }
    }

    /// The routine registered for the given pair of shape types, if any.
    pub fn lookup(
        &self,
        type1: ShapeType,
        type2: ShapeType,
    ) -> Option<ConservativeAdvancementFn> {
        self.table[type1 as usize][type2 as usize]
    }
}

/// The process-wide conservative-advancement table.
pub fn conservative_advancement_matrix() -> &'static ConservativeAdvancementMatrix {
    static MATRIX: OnceLock<ConservativeAdvancementMatrix> = OnceLock::new();
    MATRIX.get_or_init(ConservativeAdvancementMatrix::new)
}

// Safety cap on advancement iterations; convergence normally takes far fewer steps.
const MAX_ADVANCEMENT_ITERATIONS: usize = 1024;

/// Conservative advancement between two support-mapped shapes.
///
/// Advances a lower bound of the time of contact: at each step the current separation is
/// divided by an upper bound of the approach velocity of the two shapes. Stops when the
/// separation falls under `request.toc_err` (contact) or the bound reaches `t = 1` (no
/// contact within the interval).
pub fn conservative_advancement_support_map(
    g1: &dyn Shape,
    motion1: &Motion,
    g2: &dyn Shape,
    motion2: &Motion,
    solver: &GjkSolver,
    request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    let disc1 = g1.angular_motion_disc();
    let disc2 = g2.angular_motion_disc();

    let mut t: Real = 0.0;

    for iter in 0..=MAX_ADVANCEMENT_ITERATIONS {
        let tf1 = motion1.position_at_time(t);
        let tf2 = motion2.position_at_time(t);
        let pos12 = tf1.inv_mul(&tf2);

        let closest = match solver.closest_points(&pos12, g1, g2, Real::MAX) {
            Ok(closest) => closest,
            Err(_) => {
                result.is_collide = false;
                return -1.0;
            }
        };

        match closest {
            ClosestPoints::Intersecting => {
                result.is_collide = true;
                result.time_of_contact = t;
                return t;
            }
            ClosestPoints::WithinMargin(p1, p2) => {
                let dist = (p2 - p1).norm();
                if dist < request.toc_err || iter == MAX_ADVANCEMENT_ITERATIONS {
                    // Separation within tolerance, or the advancement stalled right above
                    // it. Either way `t` is a valid lower bound of the contact time.
                    result.is_collide = true;
                    result.time_of_contact = t;
                    return t;
                }

                // World-space direction from shape 1 toward shape 2.
                let dir = tf1 * ((p2 - p1) / dist);
                let bound = motion1.motion_bound(&dir, disc1)
                    + motion2.motion_bound(&-dir, disc2);

                if bound <= 0.0 {
                    // The shapes never approach each other.
                    break;
                }

                t += dist / bound;
                if t >= 1.0 {
                    break;
                }
            }
            ClosestPoints::Disjoint => unreachable!(),
        }
    }

    result.is_collide = false;
    result.time_of_contact = 1.0;
    result.time_of_contact
}
