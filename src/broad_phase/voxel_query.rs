//! Dual recursions between the manager's tree and a voxelized occupancy tree.
//!
//! Occupancy-tree cells reaching a callback are materialized as transient box objects
//! living only for the duration of that callback invocation. Absent octree children are
//! still descended against the manager tree, so leaves get to observe unknown space.

use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Real, Translation, Vector, DEFAULT_EPSILON};
use crate::object::{CollisionObject, Occupancy};
use crate::partitioning::NodeIndex;
use crate::shape::{Cuboid, Octree, OctreeNode, SharedShape};
use crate::utils::Obb;

use super::DynamicAabbTreeManager;

// Materializes the box covering an octree cell under the octree's transform.
fn voxel_object(cell_bv: &Aabb, tf2: &Isometry<Real>, density: Real, tree: &Octree) -> CollisionObject {
    let cuboid = Cuboid::new(cell_bv.half_extents());
    let box_tf = tf2 * Translation::from(cell_bv.center().coords);
    let mut obj = CollisionObject::new(SharedShape::new(cuboid), box_tf);
    obj.occupancy = Occupancy {
        density,
        occupied_threshold: tree.occupied_threshold(),
        free_threshold: tree.free_threshold(),
    };
    obj
}

fn obb_overlap(bv1: &Aabb, bv2: &Aabb, tf2: &Isometry<Real>) -> bool {
    let obb1 = Obb::from_aabb(bv1, &Isometry::identity());
    let obb2 = Obb::from_aabb(bv2, tf2);
    obb1.intersects(&obb2)
}

/// Collision recursion between the manager tree and an occupancy tree.
///
/// Rotation-free octree transforms take a translation-only specialization that skips the
/// oriented-box conversions.
pub(super) fn collision_recurse<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: Option<&OctreeNode>,
    root2_bv: &Aabb,
    tf2: &Isometry<Real>,
    callback: &mut F,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject) -> bool,
{
    if tf2.rotation.angle() <= DEFAULT_EPSILON.sqrt() {
        collision_recurse_translation(
            mgr,
            root1,
            tree2,
            root2,
            root2_bv,
            &tf2.translation.vector,
            callback,
        )
    } else {
        collision_recurse_general(mgr, root1, tree2, root2, root2_bv, tf2, callback)
    }
}

fn collision_recurse_general<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: Option<&OctreeNode>,
    root2_bv: &Aabb,
    tf2: &Isometry<Real>,
    callback: &mut F,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject) -> bool,
{
    let node1 = mgr.tree_node(root1);

    let Some(root2) = root2 else {
        // Unknown region: descend the manager tree and report it to the leaves.
        if node1.is_leaf() {
            let obj1 = mgr.object_of(node1.data);
            if !obj1.is_free() && obb_overlap(&node1.bv, root2_bv, tf2) {
                let obj2 = voxel_object(root2_bv, tf2, tree2.default_occupancy(), tree2);
                return callback(obj1, &obj2);
            }
            return false;
        }

        return collision_recurse_general(
            mgr, node1.children[0], tree2, None, root2_bv, tf2, callback,
        ) || collision_recurse_general(
            mgr, node1.children[1], tree2, None, root2_bv, tf2, callback,
        );
    };

    if node1.is_leaf() && !root2.has_children() {
        let obj1 = mgr.object_of(node1.data);
        if !tree2.is_node_free(root2)
            && !obj1.is_free()
            && obb_overlap(&node1.bv, root2_bv, tf2)
        {
            let obj2 = voxel_object(root2_bv, tf2, root2.occupancy(), tree2);
            return callback(obj1, &obj2);
        }
        return false;
    }

    if tree2.is_node_free(root2) || !obb_overlap(&node1.bv, root2_bv, tf2) {
        return false;
    }

    if !root2.has_children()
        || (!node1.is_leaf() && node1.bv.size() > root2_bv.size())
    {
        for child in node1.children {
            if collision_recurse_general(mgr, child, tree2, Some(root2), root2_bv, tf2, callback) {
                return true;
            }
        }
    } else {
        for i in 0..8 {
            let child_bv = Octree::child_aabb(root2_bv, i);
            if collision_recurse_general(
                mgr,
                root1,
                tree2,
                root2.child(i),
                &child_bv,
                tf2,
                callback,
            ) {
                return true;
            }
        }
    }

    false
}

fn collision_recurse_translation<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: Option<&OctreeNode>,
    root2_bv: &Aabb,
    translation2: &Vector<Real>,
    callback: &mut F,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject) -> bool,
{
    let node1 = mgr.tree_node(root1);
    let tf2 = Isometry::translation(translation2.x, translation2.y, translation2.z);

    let Some(root2) = root2 else {
        if node1.is_leaf() {
            let obj1 = mgr.object_of(node1.data);
            if !obj1.is_free() && node1.bv.intersects(&root2_bv.translated(translation2)) {
                let obj2 = voxel_object(root2_bv, &tf2, tree2.default_occupancy(), tree2);
                return callback(obj1, &obj2);
            }
            return false;
        }

        return collision_recurse_translation(
            mgr, node1.children[0], tree2, None, root2_bv, translation2, callback,
        ) || collision_recurse_translation(
            mgr, node1.children[1], tree2, None, root2_bv, translation2, callback,
        );
    };

    if node1.is_leaf() && !root2.has_children() {
        let obj1 = mgr.object_of(node1.data);
        if !tree2.is_node_free(root2)
            && !obj1.is_free()
            && node1.bv.intersects(&root2_bv.translated(translation2))
        {
            let obj2 = voxel_object(root2_bv, &tf2, root2.occupancy(), tree2);
            return callback(obj1, &obj2);
        }
        return false;
    }

    if tree2.is_node_free(root2) || !node1.bv.intersects(&root2_bv.translated(translation2)) {
        return false;
    }

    if !root2.has_children()
        || (!node1.is_leaf() && node1.bv.size() > root2_bv.size())
    {
        for child in node1.children {
            if collision_recurse_translation(
                mgr,
                child,
                tree2,
                Some(root2),
                root2_bv,
                translation2,
                callback,
            ) {
                return true;
            }
        }
    } else {
        for i in 0..8 {
            let child_bv = Octree::child_aabb(root2_bv, i);
            if collision_recurse_translation(
                mgr,
                root1,
                tree2,
                root2.child(i),
                &child_bv,
                translation2,
                callback,
            ) {
                return true;
            }
        }
    }

    false
}

/// Distance recursion between the manager tree and an occupancy tree.
///
/// Only occupied cells participate; unknown and free space is skipped. Rotation-free
/// octree transforms take a translation-only specialization.
pub(super) fn distance_recurse<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: &OctreeNode,
    root2_bv: &Aabb,
    tf2: &Isometry<Real>,
    callback: &mut F,
    min_dist: &mut Real,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
{
    if tf2.rotation.angle() <= DEFAULT_EPSILON.sqrt() {
        distance_recurse_translation(
            mgr,
            root1,
            tree2,
            root2,
            root2_bv,
            &tf2.translation.vector,
            callback,
            min_dist,
        )
    } else {
        distance_recurse_general(mgr, root1, tree2, root2, root2_bv, tf2, callback, min_dist)
    }
}

fn distance_recurse_general<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: &OctreeNode,
    root2_bv: &Aabb,
    tf2: &Isometry<Real>,
    callback: &mut F,
    min_dist: &mut Real,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
{
    let node1 = mgr.tree_node(root1);

    if node1.is_leaf() && !root2.has_children() {
        if tree2.is_node_occupied(root2) {
            let obj2 = voxel_object(root2_bv, tf2, root2.occupancy(), tree2);
            return callback(mgr.object_of(node1.data), &obj2, min_dist);
        }
        return false;
    }

    if !tree2.is_node_occupied(root2) {
        return false;
    }

    if !root2.has_children()
        || (!node1.is_leaf() && node1.bv.size() > root2_bv.size())
    {
        let aabb2 = root2_bv.transform_by(tf2);
        let children = node1.children;
        let d1 = aabb2.distance_to_aabb(&mgr.tree_node(children[0]).bv);
        let d2 = aabb2.distance_to_aabb(&mgr.tree_node(children[1]).bv);
        let order = if d2 < d1 { [(d2, 1), (d1, 0)] } else { [(d1, 0), (d2, 1)] };

        for (d, i) in order {
            if d < *min_dist
                && distance_recurse_general(
                    mgr,
                    children[i],
                    tree2,
                    root2,
                    root2_bv,
                    tf2,
                    callback,
                    min_dist,
                )
            {
                return true;
            }
        }
    } else {
        for i in 0..8 {
            if let Some(child) = root2.child(i) {
                let child_bv = Octree::child_aabb(root2_bv, i);
                let aabb2 = child_bv.transform_by(tf2);
                let d = node1.bv.distance_to_aabb(&aabb2);

                if d < *min_dist
                    && distance_recurse_general(
                        mgr, root1, tree2, child, &child_bv, tf2, callback, min_dist,
                    )
                {
                    return true;
                }
            }
        }
    }

    false
}

fn distance_recurse_translation<F>(
    mgr: &DynamicAabbTreeManager,
    root1: NodeIndex,
    tree2: &Octree,
    root2: &OctreeNode,
    root2_bv: &Aabb,
    translation2: &Vector<Real>,
    callback: &mut F,
    min_dist: &mut Real,
) -> bool
where
    F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
{
    let node1 = mgr.tree_node(root1);

    if node1.is_leaf() && !root2.has_children() {
        if tree2.is_node_occupied(root2) {
            let tf2 = Isometry::translation(translation2.x, translation2.y, translation2.z);
            let obj2 = voxel_object(root2_bv, &tf2, root2.occupancy(), tree2);
            return callback(mgr.object_of(node1.data), &obj2, min_dist);
        }
        return false;
    }

    if !tree2.is_node_occupied(root2) {
        return false;
    }

    if !root2.has_children()
        || (!node1.is_leaf() && node1.bv.size() > root2_bv.size())
    {
        let aabb2 = root2_bv.translated(translation2);
        let children = node1.children;
        let d1 = aabb2.distance_to_aabb(&mgr.tree_node(children[0]).bv);
        let d2 = aabb2.distance_to_aabb(&mgr.tree_node(children[1]).bv);
        let order = if d2 < d1 { [(d2, 1), (d1, 0)] } else { [(d1, 0), (d2, 1)] };

        for (d, i) in order {
            if d < *min_dist
                && distance_recurse_translation(
                    mgr,
                    children[i],
                    tree2,
                    root2,
                    root2_bv,
                    translation2,
                    callback,
                    min_dist,
                )
            {
                return true;
            }
        }
    } else {
        for i in 0..8 {
            if let Some(child) = root2.child(i) {
                let child_bv = Octree::child_aabb(root2_bv, i);
                let aabb2 = child_bv.translated(translation2);
                let d = node1.bv.distance_to_aabb(&aabb2);

                if d < *min_dist
                    && distance_recurse_translation(
                        mgr,
                        root1,
                        tree2,
                        child,
                        &child_bv,
                        translation2,
                        callback,
                        min_dist,
                    )
                {
                    return true;
                }
            }
        }
    }

    false
}
