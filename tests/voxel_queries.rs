use collide3d::bounding_volume::Aabb;
use collide3d::broad_phase::DynamicAabbTreeManager;
use collide3d::math::{Isometry, Point, Real, Vector};
use collide3d::object::CollisionObject;
use collide3d::shape::{Octree, OctreeNode, SharedShape, ShapeType};

// An occupancy tree over [0, 4]³ with a single occupied octant: [0, 2]³.
fn octant_octree() -> Octree {
    let mut children: [Option<Box<OctreeNode>>; 8] = Default::default();
    children[0] = Some(Box::new(OctreeNode::leaf(0.9)));
    // The remaining octants are explicitly free.
    for child in children.iter_mut().skip(1) {
        *child = Some(Box::new(OctreeNode::leaf(0.0)));
    }

    Octree::new(
        Aabb::new(Point::origin(), Point::new(4.0, 4.0, 4.0)),
        Some(OctreeNode::internal(children)),
    )
}

fn unit_box_at(x: Real, y: Real, z: Real) -> CollisionObject {
    CollisionObject::new(
        SharedShape::cuboid(0.5, 0.5, 0.5),
        Isometry::translation(x, y, z),
    )
}

#[test]
fn octree_cross_collision_translation_only() {
    let mut manager = DynamicAabbTreeManager::new();
    manager.octree_as_geometry_collide = false;

    // One box inside the occupied octant, one inside a free octant.
    let _ = manager.register_object(unit_box_at(1.0, 1.0, 1.0));
    let _ = manager.register_object(unit_box_at(3.0, 3.0, 3.0));
    manager.setup();

    let query = CollisionObject::new(SharedShape::new(octant_octree()), Isometry::identity());
    assert_eq!(query.geometry().shape_type(), ShapeType::VoxelOccupancy);

    let mut hits = Vec::new();
    manager.collide_with(&query, |a, b| {
        // The second argument is a transient box covering the occupied cell.
        assert_eq!(b.geometry().shape_type(), ShapeType::Cuboid);
        assert!(b.is_occupied());
        hits.push(a.transform().translation.x);
        false
    });

    assert_eq!(hits, vec![1.0]);
}

#[test]
fn octree_cross_collision_with_rotation() {
    let mut manager = DynamicAabbTreeManager::new();
    manager.octree_as_geometry_collide = false;

    let _ = manager.register_object(unit_box_at(1.0, 1.0, 1.0));
    manager.setup();

    // Rotate the octree about its corner at the origin; the occupied octant still covers
    // the registered box.
    let rot = Isometry::new(Vector::zeros(), Vector::new(0.0, 0.0, 0.1));
    let query = CollisionObject::new(SharedShape::new(octant_octree()), rot);

    let mut hits = 0;
    manager.collide_with(&query, |_, _| {
        hits += 1;
        false
    });
    assert_eq!(hits, 1);
}

#[test]
fn octree_unknown_space_reaches_leaves() {
    let mut manager = DynamicAabbTreeManager::new();
    manager.octree_as_geometry_collide = false;

    let _ = manager.register_object(unit_box_at(1.0, 1.0, 1.0));
    manager.setup();

    // A tree with no root at all: everything is unknown space.
    let unknown = Octree::new(
        Aabb::new(Point::origin(), Point::new(4.0, 4.0, 4.0)),
        None,
    );
    let query = CollisionObject::new(SharedShape::new(unknown), Isometry::identity());

    let mut observed_unknown = 0;
    manager.collide_with(&query, |_, b| {
        // Unknown cells carry the default occupancy: neither free nor occupied.
        assert!(!b.is_free());
        assert!(!b.is_occupied());
        observed_unknown += 1;
        false
    });
    assert_eq!(observed_unknown, 1);
}

#[test]
fn octree_cross_distance() {
    let mut manager = DynamicAabbTreeManager::new();
    manager.octree_as_geometry_distance = false;

    // A box 3 units to the right of the occupied octant [0,2]³.
    let _ = manager.register_object(unit_box_at(5.5, 1.0, 1.0));
    manager.setup();

    let query = CollisionObject::new(SharedShape::new(octant_octree()), Isometry::identity());

    let mut min_dist = Real::MAX;
    manager.distance_with(&query, |a, b, dist| {
        let d = a.aabb().distance_to_aabb(b.aabb());
        if d < *dist {
            *dist = d;
        }
        min_dist = *dist;
        false
    });

    // Box spans [5, 6]; the occupied cell spans [0, 2].
    assert!((min_dist - 3.0).abs() < 1.0e-6);
}

#[test]
fn octree_as_geometry_falls_back_to_aabb_query() {
    let mut manager = DynamicAabbTreeManager::new();
    // Default: octree_as_geometry_collide is true, so the octree is treated as one big
    // object whose AABB is its root volume.
    let _ = manager.register_object(unit_box_at(3.0, 3.0, 3.0));
    manager.setup();

    let query = CollisionObject::new(SharedShape::new(octant_octree()), Isometry::identity());

    let mut hits = 0;
    manager.collide_with(&query, |_, b| {
        assert_eq!(b.geometry().shape_type(), ShapeType::VoxelOccupancy);
        hits += 1;
        false
    });
    assert_eq!(hits, 1);
}
