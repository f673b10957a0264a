use crate::bounding_volume::BoundingVolume;
use crate::math::Real;
use crate::object::{CollisionObject, CollisionObjectHandle};
use crate::partitioning::{select, HierarchyTree, NodeIndex};
use crate::shape::{Octree, ShapeType};
use std::collections::HashMap;

use super::voxel_query;

/// A broad-phase manager backed by a dynamic AABB tree.
///
/// The manager owns the registered collision objects and issues a
/// [`CollisionObjectHandle`] for each of them. Every query takes a callback invoked on
/// candidate pairs; returning `true` from the callback terminates the query early.
///
/// [`DynamicAabbTreeManager::setup`] only rebalances the tree: queries are correct without
/// it, just potentially slower. It is idempotent and invoked automatically by the update
/// operations and the bulk registration fast path.
pub struct DynamicAabbTreeManager {
    dtree: HierarchyTree<CollisionObjectHandle>,
    table: HashMap<CollisionObjectHandle, NodeIndex>,
    objects: HashMap<CollisionObjectHandle, CollisionObject>,
    next_handle: u64,
    is_setup: bool,

    /// The maximum acceptable difference between the tree height and the height of a
    /// perfectly balanced tree before [`Self::setup`] resorts to a full top-down rebuild.
    pub max_tree_nonbalanced_level: usize,
    /// The number of improvement passes performed by an incremental rebalance.
    pub tree_incremental_balance_pass: usize,
    /// The split rule used by the bulk-registration build.
    pub tree_init_level: usize,
    /// Treat occupancy-tree query objects as plain geometries during collision queries.
    pub octree_as_geometry_collide: bool,
    /// Treat occupancy-tree query objects as plain geometries during distance queries.
    pub octree_as_geometry_distance: bool,
}

impl Default for DynamicAabbTreeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicAabbTreeManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        let mut dtree = HierarchyTree::new();
        dtree.bu_threshold = 2;
        dtree.topdown_level = 0;

        Self {
            dtree,
            table: HashMap::new(),
            objects: HashMap::new(),
            next_handle: 0,
            is_setup: false,
            max_tree_nonbalanced_level: 10,
            tree_incremental_balance_pass: 10,
            tree_init_level: 0,
            octree_as_geometry_collide: true,
            octree_as_geometry_distance: false,
        }
    }

    /// The number of leaves a subtree may have before the top-down rebuild switches to
    /// bottom-up pair merging.
    pub fn tree_topdown_balance_threshold(&self) -> usize {
        self.dtree.bu_threshold
    }

    /// Sets the bottom-up switch-over threshold of the top-down rebuild.
    pub fn set_tree_topdown_balance_threshold(&mut self, threshold: usize) {
        self.dtree.bu_threshold = threshold;
    }

    /// The split rule used by top-down rebuilds.
    pub fn tree_topdown_level(&self) -> usize {
        self.dtree.topdown_level
    }

    /// Sets the split rule used by top-down rebuilds.
    pub fn set_tree_topdown_level(&mut self, level: usize) {
        self.dtree.topdown_level = level;
    }

    fn issue_handle(&mut self) -> CollisionObjectHandle {
        let handle = CollisionObjectHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Adds an object to the manager, returning the handle identifying it.
    pub fn register_object(&mut self, obj: CollisionObject) -> CollisionObjectHandle {
        let handle = self.issue_handle();
        let node = self.dtree.insert(*obj.aabb(), handle);
        let _ = self.table.insert(handle, node);
        let _ = self.objects.insert(handle, obj);
        handle
    }

    /// Adds a batch of objects to the manager.
    ///
    /// When the manager is empty this builds the tree in one shot, which is faster than
    /// inserting the objects one by one.
    pub fn register_objects(&mut self, objs: Vec<CollisionObject>) -> Vec<CollisionObjectHandle> {
        if objs.is_empty() {
            return Vec::new();
        }

        if self.size() > 0 {
            return objs.into_iter().map(|obj| self.register_object(obj)).collect();
        }

        let mut handles = Vec::with_capacity(objs.len());
        let mut leaves = Vec::with_capacity(objs.len());
        for obj in objs {
            let handle = self.issue_handle();
            let node = self.dtree.new_leaf(*obj.aabb(), handle);
            let _ = self.table.insert(handle, node);
            let _ = self.objects.insert(handle, obj);
            handles.push(handle);
            leaves.push(node);
        }

        self.dtree.init(leaves, self.tree_init_level);
        self.is_setup = true;
        handles
    }

    /// Removes an object from the manager, handing it back to the caller.
    ///
    /// Unknown handles are a no-op returning `None`.
    pub fn unregister_object(&mut self, handle: CollisionObjectHandle) -> Option<CollisionObject> {
        let node = self.table.remove(&handle)?;
        self.dtree.remove(node);
        self.objects.remove(&handle)
    }

    /// Rebalances the tree if needed. Idempotent; safe to call any number of times.
    pub fn setup(&mut self) {
        if !self.is_setup {
            let num = self.dtree.size();
            if num == 0 {
                self.is_setup = true;
                return;
            }

            let height = self.dtree.max_height();

            if (height as Real) - (num as Real).log2()
                < self.max_tree_nonbalanced_level as Real
            {
                self.dtree.balance_incremental(self.tree_incremental_balance_pass);
            } else {
                self.dtree.balance_topdown();
            }

            self.is_setup = true;
        }
    }

    /// Rewrites every leaf volume from its object's current AABB, then refits and
    /// rebalances the tree.
    pub fn update(&mut self) {
        for (handle, node) in self.table.iter() {
            self.dtree.node_mut(*node).bv = *self.objects[handle].aabb();
        }

        self.dtree.refit();
        self.is_setup = false;
        self.setup();
    }

    fn update_(&mut self, handle: CollisionObjectHandle) {
        if let (Some(node), Some(obj)) = (self.table.get(&handle), self.objects.get(&handle)) {
            let aabb = *obj.aabb();
            if self.dtree.node(*node).bv != aabb {
                self.dtree.update(*node, aabb);
            }
        }
        self.is_setup = false;
    }

    /// Updates the tree for the given object, whose transform may have changed.
    ///
    /// Unknown handles are a no-op.
    pub fn update_object(&mut self, handle: CollisionObjectHandle) {
        self.update_(handle);
        self.setup();
    }

    /// Updates the tree for the given objects.
    pub fn update_objects(&mut self, handles: &[CollisionObjectHandle]) {
        for handle in handles {
            self.update_(*handle);
        }
        self.setup();
    }

    /// Removes every object from the manager.
    pub fn clear(&mut self) {
        self.dtree.clear();
        self.table.clear();
        self.objects.clear();
    }

    /// The number of objects managed by this manager.
    #[inline]
    pub fn size(&self) -> usize {
        self.dtree.size()
    }

    /// Is this manager empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dtree.is_empty()
    }

    /// Iterates over the objects managed by this manager.
    pub fn objects(
        &self,
    ) -> impl Iterator<Item = (CollisionObjectHandle, &CollisionObject)> + '_ {
        self.objects.iter().map(|(handle, obj)| (*handle, obj))
    }

    /// The object registered under the given handle.
    pub fn object(&self, handle: CollisionObjectHandle) -> Option<&CollisionObject> {
        self.objects.get(&handle)
    }

    /// Mutable access to the object registered under the given handle.
    ///
    /// After mutating a transform, call [`Self::update_object`] so the tree reflects the
    /// new AABB.
    pub fn object_mut(&mut self, handle: CollisionObjectHandle) -> Option<&mut CollisionObject> {
        self.objects.get_mut(&handle)
    }

    /// The underlying tree of this manager.
    pub fn tree(&self) -> &HierarchyTree<CollisionObjectHandle> {
        &self.dtree
    }

    #[inline]
    pub(super) fn object_of(&self, handle: CollisionObjectHandle) -> &CollisionObject {
        &self.objects[&handle]
    }

    /*
     * Queries.
     */

    /// Collision test between one object and all the objects of this manager.
    pub fn collide_with<F>(&self, obj: &CollisionObject, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        if self.size() == 0 {
            return;
        }

        if obj.geometry().shape_type() == ShapeType::VoxelOccupancy
            && !self.octree_as_geometry_collide
        {
            if let Some(octree) = obj.geometry().as_ref().downcast_ref::<Octree>() {
                let _ = voxel_query::collision_recurse(
                    self,
                    self.dtree.root(),
                    octree,
                    octree.root(),
                    &octree.root_aabb(),
                    obj.transform(),
                    &mut callback,
                );
                return;
            }
        }

        let _ = self.collide_node_obj(self.dtree.root(), obj, &mut callback);
    }

    /// Distance computation between one object and all the objects of this manager.
    pub fn distance_with<F>(&self, obj: &CollisionObject, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        if self.size() == 0 {
            return;
        }

        let mut min_dist = Real::MAX;

        if obj.geometry().shape_type() == ShapeType::VoxelOccupancy
            && !self.octree_as_geometry_distance
        {
            if let Some(octree) = obj.geometry().as_ref().downcast_ref::<Octree>() {
                if let Some(root2) = octree.root() {
                    let _ = voxel_query::distance_recurse(
                        self,
                        self.dtree.root(),
                        octree,
                        root2,
                        &octree.root_aabb(),
                        obj.transform(),
                        &mut callback,
                        &mut min_dist,
                    );
                }
                return;
            }
        }

        let _ = self.distance_node_obj(self.dtree.root(), obj, &mut callback, &mut min_dist);
    }

    /// Collision test between all the object pairs of this manager.
    pub fn collide<F>(&self, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        if self.size() == 0 {
            return;
        }
        let _ = self.self_collide_rec(self.dtree.root(), &mut callback);
    }

    /// Distance computation between all the object pairs of this manager.
    pub fn distance<F>(&self, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        if self.size() == 0 {
            return;
        }
        let mut min_dist = Real::MAX;
        let _ = self.self_distance_rec(self.dtree.root(), &mut callback, &mut min_dist);
    }

    /// Collision test against all the objects of another manager.
    pub fn collide_other<F>(&self, other: &DynamicAabbTreeManager, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        if self.size() == 0 || other.size() == 0 {
            return;
        }
        let _ = self.collide_nodes(self.dtree.root(), other, other.dtree.root(), &mut callback);
    }

    /// Distance computation against all the objects of another manager.
    pub fn distance_other<F>(&self, other: &DynamicAabbTreeManager, mut callback: F)
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        if self.size() == 0 || other.size() == 0 {
            return;
        }
        let mut min_dist = Real::MAX;
        let _ = self.distance_nodes(
            self.dtree.root(),
            other,
            other.dtree.root(),
            &mut callback,
            &mut min_dist,
        );
    }

    /*
     * Recursions.
     */

    pub(super) fn tree_node(&self, index: NodeIndex) -> &crate::partitioning::Node<CollisionObjectHandle> {
        self.dtree.node(index)
    }

    fn collide_node_obj<F>(&self, index: NodeIndex, obj: &CollisionObject, callback: &mut F) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        let node = self.dtree.node(index);
        if !node.bv.intersects(obj.aabb()) {
            return false;
        }

        if node.is_leaf() {
            return callback(self.object_of(node.data), obj);
        }

        let children = node.children;
        let chosen = select(
            obj.aabb(),
            &self.dtree.node(children[0]).bv,
            &self.dtree.node(children[1]).bv,
        );

        self.collide_node_obj(children[chosen], obj, callback)
            || self.collide_node_obj(children[1 - chosen], obj, callback)
    }

    fn distance_node_obj<F>(
        &self,
        index: NodeIndex,
        obj: &CollisionObject,
        callback: &mut F,
        min_dist: &mut Real,
    ) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        let node = self.dtree.node(index);
        if node.is_leaf() {
            return callback(self.object_of(node.data), obj, min_dist);
        }

        let children = node.children;
        let d1 = obj.aabb().distance_to_aabb(&self.dtree.node(children[0]).bv);
        let d2 = obj.aabb().distance_to_aabb(&self.dtree.node(children[1]).bv);
        let order = if d2 < d1 { [(d2, 1), (d1, 0)] } else { [(d1, 0), (d2, 1)] };

        for (d, i) in order {
            if d < *min_dist && self.distance_node_obj(children[i], obj, callback, min_dist) {
                return true;
            }
        }

        false
    }

    fn self_collide_rec<F>(&self, index: NodeIndex, callback: &mut F) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        let node = self.dtree.node(index);
        if node.is_leaf() {
            return false;
        }

        let children = node.children;
        self.self_collide_rec(children[0], callback)
            || self.self_collide_rec(children[1], callback)
            || self.collide_nodes(children[0], self, children[1], callback)
    }

    fn self_distance_rec<F>(&self, index: NodeIndex, callback: &mut F, min_dist: &mut Real) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        let node = self.dtree.node(index);
        if node.is_leaf() {
            return false;
        }

        let children = node.children;
        self.self_distance_rec(children[0], callback, min_dist)
            || self.self_distance_rec(children[1], callback, min_dist)
            || self.distance_nodes(children[0], self, children[1], callback, min_dist)
    }

    fn collide_nodes<F>(
        &self,
        n1: NodeIndex,
        other: &DynamicAabbTreeManager,
        n2: NodeIndex,
        callback: &mut F,
    ) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject) -> bool,
    {
        let node1 = self.dtree.node(n1);
        let node2 = other.dtree.node(n2);

        if !node1.bv.intersects(&node2.bv) {
            return false;
        }

        if node1.is_leaf() && node2.is_leaf() {
            return callback(self.object_of(node1.data), other.object_of(node2.data));
        }

        if node2.is_leaf() || (!node1.is_leaf() && node1.bv.size() > node2.bv.size()) {
            let children = node1.children;
            self.collide_nodes(children[0], other, n2, callback)
                || self.collide_nodes(children[1], other, n2, callback)
        } else {
            let children = node2.children;
            self.collide_nodes(n1, other, children[0], callback)
                || self.collide_nodes(n1, other, children[1], callback)
        }
    }

    fn distance_nodes<F>(
        &self,
        n1: NodeIndex,
        other: &DynamicAabbTreeManager,
        n2: NodeIndex,
        callback: &mut F,
        min_dist: &mut Real,
    ) -> bool
    where
        F: FnMut(&CollisionObject, &CollisionObject, &mut Real) -> bool,
    {
        let node1 = self.dtree.node(n1);
        let node2 = other.dtree.node(n2);

        if node1.is_leaf() && node2.is_leaf() {
            return callback(
                self.object_of(node1.data),
                other.object_of(node2.data),
                min_dist,
            );
        }

        if node2.is_leaf() || (!node1.is_leaf() && node1.bv.size() > node2.bv.size()) {
            let children = node1.children;
            let d1 = node2.bv.distance_to_aabb(&self.dtree.node(children[0]).bv);
            let d2 = node2.bv.distance_to_aabb(&self.dtree.node(children[1]).bv);
            let order = if d2 < d1 { [(d2, 1), (d1, 0)] } else { [(d1, 0), (d2, 1)] };

            for (d, i) in order {
                if d < *min_dist
                    && self.distance_nodes(children[i], other, n2, callback, min_dist)
                {
                    return true;
                }
            }
        } else {
            let children = node2.children;
            let d1 = node1.bv.distance_to_aabb(&other.dtree.node(children[0]).bv);
            let d2 = node1.bv.distance_to_aabb(&other.dtree.node(children[1]).bv);
            let order = if d2 < d1 { [(d2, 1), (d1, 0)] } else { [(d1, 0), (d2, 1)] };

            for (d, i) in order {
                if d < *min_dist
                    && self.distance_nodes(n1, other, children[i], callback, min_dist)
                {
                    return true;
                }
            }
        }

        false
    }
}
