//! Non-persistent geometric queries.
//!
//! The most general operations provided by this module are:
//!
//! * [`intersection_test()`] to determine if two shapes are intersecting or not.
//! * [`distance()`] to compute the distance between two shapes.
//! * [`closest_points()`] to compute the closest points between two shapes.
//! * [`continuous_collide()`] and its variants to determine whether and when two moving
//!   shapes hit for the first time.

pub use self::closest_points::ClosestPoints;
pub use self::continuous::{
    collide_continuous_objects, conservative_advancement_matrix, continuous_collide,
    continuous_collide_motions, continuous_collide_objects, mesh_mesh_toc, CcdSolverType,
    ConservativeAdvancementFn, ConservativeAdvancementMatrix, ContinuousCollisionRequest,
    ContinuousCollisionResult, MeshContinuousResult,
};
pub use self::error::Unsupported;
pub use self::gjk::GjkResult;
pub use self::narrow_phase::{
    closest_points, distance, intersection_test, GjkSolver, GjkSolverType, NarrowPhase,
};

mod closest_points;
pub mod continuous;
mod error;
pub mod gjk;
mod narrow_phase;
