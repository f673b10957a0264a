use collide3d::math::{Isometry, Point, Vector};
use collide3d::motion::{CcdMotionType, Motion};
use collide3d::object::ContinuousCollisionObject;
use collide3d::query::{
    self, CcdSolverType, ContinuousCollisionRequest, ContinuousCollisionResult,
};
use collide3d::shape::{Ball, Cuboid, MeshBvKind, SharedShape, TriMesh};

fn unit_cube() -> Cuboid {
    Cuboid::new(Vector::repeat(0.5))
}

// A unit cube mesh with 12 triangles.
fn unit_cube_mesh(bv_kind: MeshBvKind) -> TriMesh {
    let vertices = vec![
        Point::new(-0.5, -0.5, -0.5),
        Point::new(0.5, -0.5, -0.5),
        Point::new(0.5, 0.5, -0.5),
        Point::new(-0.5, 0.5, -0.5),
        Point::new(-0.5, -0.5, 0.5),
        Point::new(0.5, -0.5, 0.5),
        Point::new(0.5, 0.5, 0.5),
        Point::new(-0.5, 0.5, 0.5),
    ];
    let indices = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    TriMesh::new(vertices, indices, bv_kind)
}

// Object A is a unit cube at the origin; object B is identical at (3, 0, 0) translating
// by (-5, 0, 0) over the unit time interval. First contact at t = 0.4.
fn translating_cubes_request(solver: CcdSolverType) -> ContinuousCollisionRequest {
    ContinuousCollisionRequest {
        ccd_solver_type: solver,
        num_max_iterations: 100,
        toc_err: 1.0e-3,
        ..Default::default()
    }
}

#[test]
fn naive_translating_cubes() {
    let cube = unit_cube();
    let request = translating_cubes_request(CcdSolverType::Naive);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(result.is_collide);
    // The sampling grid has 100 points; the first sample past contact is within 1/99.
    assert!((toc - 0.4).abs() <= 1.0 / 99.0 + 1.0e-9);
    assert_eq!(toc, result.time_of_contact);
    // Contact transforms are the integrated configurations at the reported time.
    assert!((result.contact_tf2.translation.x - (3.0 - 5.0 * toc)).abs() < 1.0e-9);
}

#[test]
fn naive_miss_reports_t_one() {
    let cube = unit_cube();
    let request = translating_cubes_request(CcdSolverType::Naive);
    let mut result = ContinuousCollisionResult::default();

    // B moves away from A.
    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(8.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(!result.is_collide);
    assert_eq!(toc, 1.0);
    assert_eq!(result.time_of_contact, 1.0);
}

#[test]
fn conservative_advancement_translating_cubes() {
    let cube = unit_cube();
    let request = translating_cubes_request(CcdSolverType::ConservativeAdvancement);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(result.is_collide);
    assert!((toc - 0.4).abs() < request.toc_err);
    assert!((result.contact_tf2.translation.x - (3.0 - 5.0 * toc)).abs() < 1.0e-9);
}

#[test]
fn conservative_advancement_balls() {
    let ball = Ball::new(0.5);
    let request = translating_cubes_request(CcdSolverType::ConservativeAdvancement);
    let mut result = ContinuousCollisionResult::default();

    // Centers 4 apart, approaching at speed 10: surfaces meet at t = 0.3.
    let toc = query::continuous_collide(
        &ball,
        &Isometry::identity(),
        &Isometry::identity(),
        &ball,
        &Isometry::translation(4.0, 0.0, 0.0),
        &Isometry::translation(-6.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(result.is_collide);
    assert!((toc - 0.3).abs() < request.toc_err);
}

#[test]
fn conservative_advancement_miss() {
    let ball = Ball::new(0.5);
    let request = translating_cubes_request(CcdSolverType::ConservativeAdvancement);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &ball,
        &Isometry::identity(),
        &Isometry::identity(),
        &ball,
        &Isometry::translation(4.0, 0.0, 0.0),
        &Isometry::translation(4.0, 5.0, 0.0),
        &request,
        &mut result,
    );

    assert!(!result.is_collide);
    assert_eq!(toc, 1.0);
}

#[test]
fn polynomial_on_primitives_is_unsupported() {
    let cube = unit_cube();
    let request = translating_cubes_request(CcdSolverType::Polynomial);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert_eq!(toc, -1.0);
    assert!(!result.is_collide);
}

#[test]
fn ray_shooting_is_unimplemented() {
    let cube = unit_cube();
    let request = translating_cubes_request(CcdSolverType::RayShooting);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert_eq!(toc, -1.0);
    assert!(!result.is_collide);
}

#[test]
fn polynomial_translating_meshes() {
    let mesh1 = unit_cube_mesh(MeshBvKind::Aabb);
    let mesh2 = unit_cube_mesh(MeshBvKind::Aabb);
    let request = translating_cubes_request(CcdSolverType::Polynomial);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &mesh1,
        &Isometry::identity(),
        &Isometry::identity(),
        &mesh2,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(result.is_collide);
    assert!((toc - 0.4).abs() < 1.0e-4);
    assert!(toc >= 0.0 && toc <= 1.0);
}

#[test]
fn polynomial_leaves_meshes_unchanged() {
    let mesh1 = unit_cube_mesh(MeshBvKind::Obb);
    let mesh2 = unit_cube_mesh(MeshBvKind::Obb);
    let before1 = mesh1.vertices().to_vec();

    let request = translating_cubes_request(CcdSolverType::Polynomial);
    let mut result = ContinuousCollisionResult::default();
    let _ = query::continuous_collide(
        &mesh1,
        &Isometry::identity(),
        &Isometry::identity(),
        &mesh2,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert_eq!(mesh1.vertices(), &before1[..]);
    assert!(mesh1.prev_vertices().is_none());
}

#[test]
fn polynomial_mismatched_bv_kinds_is_unsupported() {
    let mesh1 = unit_cube_mesh(MeshBvKind::Aabb);
    let mesh2 = unit_cube_mesh(MeshBvKind::Rss);
    let request = translating_cubes_request(CcdSolverType::Polynomial);
    let mut result = ContinuousCollisionResult::default();

    let toc = query::continuous_collide(
        &mesh1,
        &Isometry::identity(),
        &Isometry::identity(),
        &mesh2,
        &Isometry::translation(3.0, 0.0, 0.0),
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert_eq!(toc, -1.0);
    assert!(!result.is_collide);
}

#[test]
fn continuous_objects_with_attached_motions() {
    let start2 = Isometry::translation(3.0, 0.0, 0.0);
    let end2 = Isometry::translation(-2.0, 0.0, 0.0);

    let o1 = ContinuousCollisionObject::new(
        SharedShape::cuboid(0.5, 0.5, 0.5),
        Motion::from_transforms(
            CcdMotionType::Translation,
            Isometry::identity(),
            Isometry::identity(),
        ),
    );
    let o2 = ContinuousCollisionObject::new(
        SharedShape::cuboid(0.5, 0.5, 0.5),
        Motion::from_transforms(CcdMotionType::Translation, start2, end2),
    );

    let request = translating_cubes_request(CcdSolverType::ConservativeAdvancement);
    let mut result = ContinuousCollisionResult::default();
    let toc = query::collide_continuous_objects(&o1, &o2, &request, &mut result);

    assert!(result.is_collide);
    assert!((toc - 0.4).abs() < request.toc_err);
}

#[test]
fn toc_always_within_unit_interval_on_hit() {
    let ball = Ball::new(0.5);

    for solver in [CcdSolverType::Naive, CcdSolverType::ConservativeAdvancement] {
        for motion in [
            CcdMotionType::Translation,
            CcdMotionType::Interp,
            CcdMotionType::Screw,
            CcdMotionType::Spline,
        ] {
            let request = ContinuousCollisionRequest {
                ccd_solver_type: solver,
                ccd_motion_type: motion,
                num_max_iterations: 100,
                toc_err: 1.0e-3,
                ..Default::default()
            };
            let mut result = ContinuousCollisionResult::default();

            let toc = query::continuous_collide(
                &ball,
                &Isometry::identity(),
                &Isometry::identity(),
                &ball,
                &Isometry::translation(2.0, 0.0, 0.0),
                &Isometry::translation(-2.0, 0.0, 0.0),
                &request,
                &mut result,
            );

            assert!(result.is_collide, "{:?}/{:?}", solver, motion);
            assert!(
                (0.0..=1.0).contains(&toc),
                "{:?}/{:?}: {}",
                solver,
                motion,
                toc
            );
        }
    }
}

#[test]
fn continuous_collide_objects_uses_current_transform_as_begin() {
    let cube = SharedShape::cuboid(0.5, 0.5, 0.5);
    let o1 = collide3d::object::CollisionObject::new(cube.clone(), Isometry::identity());
    let o2 = collide3d::object::CollisionObject::new(cube, Isometry::translation(3.0, 0.0, 0.0));

    let request = translating_cubes_request(CcdSolverType::ConservativeAdvancement);
    let mut result = ContinuousCollisionResult::default();
    let toc = query::continuous_collide_objects(
        &o1,
        &Isometry::identity(),
        &o2,
        &Isometry::translation(-2.0, 0.0, 0.0),
        &request,
        &mut result,
    );

    assert!(result.is_collide);
    assert!((toc - 0.4).abs() < request.toc_err);
}

#[test]
fn naive_single_sample_edge_case() {
    // With toc_err = 1 the sampling grid degenerates to the single sample t = 0.
    let cube = unit_cube();
    let request = ContinuousCollisionRequest {
        ccd_solver_type: CcdSolverType::Naive,
        num_max_iterations: 100,
        toc_err: 1.0,
        ..Default::default()
    };

    // Overlapping at t = 0: reported immediately.
    let mut result = ContinuousCollisionResult::default();
    let toc = query::continuous_collide(
        &cube,
        &Isometry::identity(),
        &Isometry::identity(),
        &cube,
        &Isometry::translation(0.25, 0.0, 0.0),
        &Isometry::translation(5.0, 0.0, 0.0),
        &request,
        &mut result,
    );
    assert!(result.is_collide);
    assert_eq!(toc, 0.0);
}
