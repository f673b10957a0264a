use collide3d::bounding_volume::BoundingVolume;
use collide3d::broad_phase::DynamicAabbTreeManager;
use collide3d::math::{Isometry, Real};
use collide3d::object::CollisionObject;
use collide3d::shape::SharedShape;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn ball_at(radius: Real, x: Real, y: Real, z: Real) -> CollisionObject {
    CollisionObject::new(SharedShape::ball(radius), Isometry::translation(x, y, z))
}

fn unit_box_at(x: Real, y: Real, z: Real) -> CollisionObject {
    CollisionObject::new(
        SharedShape::cuboid(0.5, 0.5, 0.5),
        Isometry::translation(x, y, z),
    )
}

#[test]
fn empty_manager_is_a_no_op() {
    let mut manager = DynamicAabbTreeManager::new();
    manager.setup();
    assert_eq!(manager.size(), 0);
    assert!(manager.is_empty());

    let mut called = false;
    manager.collide(|_, _| {
        called = true;
        false
    });
    assert!(!called);

    manager.distance(|_, _, _| {
        called = true;
        false
    });
    assert!(!called);

    // Query against one external object is a no-op too.
    manager.collide_with(&ball_at(1.0, 0.0, 0.0, 0.0), |_, _| {
        called = true;
        false
    });
    assert!(!called);
}

#[test]
fn two_disjoint_spheres() {
    // Two spheres with AABBs [(0,0,0), (1,1,1)] and [(2,2,2), (3,3,3)].
    let mut manager = DynamicAabbTreeManager::new();
    let _ = manager.register_object(ball_at(0.5, 0.5, 0.5, 0.5));
    let _ = manager.register_object(ball_at(0.5, 2.5, 2.5, 2.5));
    manager.setup();

    let mut pairs = 0;
    manager.collide(|_, _| {
        pairs += 1;
        false
    });
    assert_eq!(pairs, 0);

    // The AABB distance between the two boxes is the diagonal gap.
    let mut min_dist = Real::MAX;
    manager.distance(|a, b, dist| {
        let d = a.aabb().distance_to_aabb(b.aabb());
        if d < *dist {
            *dist = d;
        }
        min_dist = *dist;
        false
    });
    assert!((min_dist - (3.0 as Real).sqrt()).abs() < 1.0e-6);
}

#[test]
fn bijection_between_objects_and_leaves() {
    let mut manager = DynamicAabbTreeManager::new();
    let mut handles = Vec::new();
    for i in 0..100 {
        handles.push(manager.register_object(unit_box_at(i as Real * 3.0, 0.0, 0.0)));
    }
    assert_eq!(manager.size(), 100);
    assert_eq!(manager.objects().count(), 100);
    manager.tree().assert_consistent();

    for handle in handles.iter().take(50) {
        assert!(manager.unregister_object(*handle).is_some());
    }
    assert_eq!(manager.size(), 50);
    assert_eq!(manager.objects().count(), 50);
    manager.tree().assert_consistent();

    // Unknown handles are a silent no-op.
    assert!(manager.unregister_object(handles[0]).is_none());
    assert_eq!(manager.size(), 50);
}

#[test]
fn single_object_query_is_complete() {
    let mut manager = DynamicAabbTreeManager::new();
    for i in 0..10 {
        for j in 0..10 {
            let _ = manager.register_object(unit_box_at(i as Real * 2.0, j as Real * 2.0, 0.0));
        }
    }
    manager.setup();

    // A query box covering the low corner overlaps exactly the four boxes around it.
    let query = CollisionObject::new(
        SharedShape::cuboid(1.0, 1.0, 1.0),
        Isometry::translation(1.0, 1.0, 0.0),
    );

    let mut hits = 0;
    manager.collide_with(&query, |a, b| {
        assert!(a.aabb().intersects(b.aabb()));
        hits += 1;
        false
    });
    assert_eq!(hits, 4);

    // Early exit reports a single pair.
    let mut first_hits = 0;
    manager.collide_with(&query, |_, _| {
        first_hits += 1;
        true
    });
    assert_eq!(first_hits, 1);
}

#[test]
fn self_collision_reports_each_pair_once() {
    let mut manager = DynamicAabbTreeManager::new();
    // Three boxes overlapping in a row: (0) ∩ (1), (1) ∩ (2).
    let ha = manager.register_object(unit_box_at(0.0, 0.0, 0.0));
    let hb = manager.register_object(unit_box_at(0.8, 0.0, 0.0));
    let hc = manager.register_object(unit_box_at(1.6, 0.0, 0.0));
    manager.setup();

    let mut pairs = Vec::new();
    manager.collide(|a, b| {
        let pa = a.transform().translation.x;
        let pb = b.transform().translation.x;
        pairs.push(if pa < pb { (pa, pb) } else { (pb, pa) });
        false
    });

    pairs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0], (0.0, 0.8));
    assert_eq!(pairs[1], (0.8, 1.6));

    let _ = (ha, hb, hc);
}

#[test]
fn register_update_query() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut manager = DynamicAabbTreeManager::new();

    let objects: Vec<_> = (0..1000)
        .map(|_| {
            unit_box_at(
                rng.gen_range(0.0..100.0),
                rng.gen_range(0.0..100.0),
                rng.gen_range(0.0..100.0),
            )
        })
        .collect();
    let handles = manager.register_objects(objects);
    assert_eq!(manager.size(), 1000);
    manager.setup();
    manager.tree().assert_consistent();

    // Move one box far away from the cloud, then update it.
    let moved = handles[123];
    manager
        .object_mut(moved)
        .unwrap()
        .set_transform(Isometry::translation(1.0e4, 1.0e4, 1.0e4));
    manager.update_object(moved);
    manager.tree().assert_consistent();

    let query = manager.object(moved).unwrap().clone();
    let mut hits = 0;
    manager.collide_with(&query, |a, _| {
        // Only the moved box itself overlaps the query volume.
        assert_eq!(a.transform().translation.x, 1.0e4);
        hits += 1;
        false
    });
    assert_eq!(hits, 1);
}

#[test]
fn bulk_update_is_equivalent_to_fresh_queries() {
    let mut manager = DynamicAabbTreeManager::new();
    let handles: Vec<_> = (0..20)
        .map(|i| manager.register_object(unit_box_at(i as Real * 3.0, 0.0, 0.0)))
        .collect();
    manager.setup();

    let count_pairs = |manager: &DynamicAabbTreeManager| {
        let mut pairs = 0;
        manager.collide(|_, _| {
            pairs += 1;
            false
        });
        pairs
    };

    assert_eq!(count_pairs(&manager), 0);

    // Pack every box at the origin and update in bulk: all pairs overlap.
    for handle in &handles {
        manager
            .object_mut(*handle)
            .unwrap()
            .set_transform(Isometry::identity());
    }
    manager.update();
    manager.tree().assert_consistent();
    assert_eq!(count_pairs(&manager), 20 * 19 / 2);

    // An update with unchanged AABBs must not change any result.
    manager.update();
    assert_eq!(count_pairs(&manager), 20 * 19 / 2);

    // setup() twice in a row is the same as once.
    manager.setup();
    manager.setup();
    assert_eq!(count_pairs(&manager), 20 * 19 / 2);
}

#[test]
fn manager_vs_manager_queries() {
    let mut m1 = DynamicAabbTreeManager::new();
    let mut m2 = DynamicAabbTreeManager::new();

    for i in 0..10 {
        let _ = m1.register_object(unit_box_at(i as Real * 5.0, 0.0, 0.0));
        let _ = m2.register_object(unit_box_at(i as Real * 5.0, 10.0, 0.0));
    }
    m1.setup();
    m2.setup();

    let mut pairs = 0;
    m1.collide_other(&m2, |_, _| {
        pairs += 1;
        false
    });
    assert_eq!(pairs, 0);

    let mut min_dist = Real::MAX;
    m1.distance_other(&m2, |a, b, dist| {
        let d = a.aabb().distance_to_aabb(b.aabb());
        if d < *dist {
            *dist = d;
        }
        min_dist = *dist;
        false
    });
    // Rows are 10 apart, boxes extend 0.5 toward each other.
    assert!((min_dist - 9.0).abs() < 1.0e-6);
}

#[test]
fn distance_query_prunes_but_stays_sound() {
    let mut manager = DynamicAabbTreeManager::new();
    for i in 0..50 {
        let _ = manager.register_object(unit_box_at(i as Real * 4.0, 0.0, 0.0));
    }
    manager.setup();

    let query = unit_box_at(-10.0, 0.0, 0.0);
    let mut min_dist = Real::MAX;
    let mut evaluated = 0;
    manager.distance_with(&query, |a, b, dist| {
        evaluated += 1;
        let d = a.aabb().distance_to_aabb(b.aabb());
        if d < *dist {
            *dist = d;
        }
        min_dist = *dist;
        false
    });

    // Closest box sits at x = 0: gap is 10 - 0.5 - 0.5.
    assert!((min_dist - 9.0).abs() < 1.0e-6);
    // Pruning must have skipped most of the 50 leaves.
    assert!(evaluated < 50);
}
