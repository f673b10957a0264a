//! A dynamic bounding-volume tree over axis-aligned bounding boxes.

use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;

/// An index identifying a single node of a [`HierarchyTree`].
///
/// Node indices are stable: a node keeps its index for its whole lifetime, including across
/// rebalancing. Freed slots are reused by later insertions.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// The index of a non-existent node.
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    /// Is this the index of a non-existent node?
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    fn id(self) -> usize {
        self.0 as usize
    }
}

/// A node of a [`HierarchyTree`].
///
/// A node is a leaf if and only if `children[1] == NodeIndex::NONE`.
#[derive(Copy, Clone, Debug)]
pub struct Node<D> {
    /// The bounding volume of this node. For an internal node this encloses both children.
    pub bv: Aabb,
    /// The parent of this node, or `NodeIndex::NONE` for the root.
    pub parent: NodeIndex,
    /// The two children of this node. Both are `NodeIndex::NONE` for a leaf.
    pub children: [NodeIndex; 2],
    /// The user data attached to this node. Only meaningful for leaves.
    pub data: D,
}

impl<D> Node<D> {
    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children[1].is_none()
    }
}

/// Chooses which of `node1`/`node2` is the closest to `query`, in Manhattan distance
/// between centers.
///
/// Returns `0` when `node1` is closest, `1` otherwise. This drives both the sibling
/// selection during insertion and the child visit order of point queries.
#[inline]
pub fn select(query: &Aabb, node1: &Aabb, node2: &Aabb) -> usize {
    let c = query.center();
    let d1 = (c - node1.center()).abs().sum();
    let d2 = (c - node2.center()).abs().sum();
    usize::from(d2 < d1)
}

/// A binary tree of axis-aligned bounding boxes supporting incremental updates.
///
/// Leaves map 1-1 to user proxies; every internal node's bounding volume encloses its whole
/// subtree. The tree is backed by an arena, so node indices handed out by [`Self::insert`]
/// remain valid until the node is removed, even across rebalancing.
#[derive(Clone)]
pub struct HierarchyTree<D> {
    nodes: Vec<Node<D>>,
    free: Vec<u32>,
    root: NodeIndex,
    n_leaves: usize,
    opath: u32,
    /// Subtrees with at most this many leaves are rebuilt bottom-up during a top-down
    /// rebalance.
    pub bu_threshold: usize,
    /// The top-down rebuild strategy: `0` splits at the median along the longest axis,
    /// any other value splits at the mean.
    pub topdown_level: usize,
}

impl<D: Copy + Default> Default for HierarchyTree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Copy + Default> HierarchyTree<D> {
    /// An empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeIndex::NONE,
            n_leaves: 0,
            opath: 0,
            bu_threshold: 16,
            topdown_level: 0,
        }
    }

    /// The root of this tree, or `NodeIndex::NONE` if the tree is empty.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// The number of leaves of this tree.
    #[inline]
    pub fn size(&self) -> usize {
        self.n_leaves
    }

    /// Does this tree contain no leaf?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_leaves == 0
    }

    /// Reference to the node identified by `index`.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node<D> {
        &self.nodes[index.id()]
    }

    /// Mutable reference to the node identified by `index`.
    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node<D> {
        &mut self.nodes[index.id()]
    }

    /// Removes every node from this tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NodeIndex::NONE;
        self.n_leaves = 0;
    }

    /// The height of this tree. An empty tree and a single-leaf tree both have height 0.
    pub fn max_height(&self) -> usize {
        if self.root.is_none() {
            0
        } else {
            self.height_of(self.root)
        }
    }

    fn height_of(&self, index: NodeIndex) -> usize {
        let node = self.node(index);
        if node.is_leaf() {
            0
        } else {
            1 + self
                .height_of(node.children[0])
                .max(self.height_of(node.children[1]))
        }
    }

    fn alloc(&mut self, node: Node<D>) -> NodeIndex {
        if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = node;
            NodeIndex(id)
        } else {
            self.nodes.push(node);
            NodeIndex(self.nodes.len() as u32 - 1)
        }
    }

    #[inline]
    fn dealloc(&mut self, index: NodeIndex) {
        self.free.push(index.0);
    }

    /// Allocates a new leaf without linking it into the tree.
    ///
    /// The caller is expected to follow with [`Self::init`] to build the tree structure over
    /// all allocated leaves. The returned index is stable, so it can be recorded in lookup
    /// tables before the tree is even built.
    pub fn new_leaf(&mut self, bv: Aabb, data: D) -> NodeIndex {
        self.alloc(Node {
            bv,
            parent: NodeIndex::NONE,
            children: [NodeIndex::NONE; 2],
            data,
        })
    }

    /// Creates a new leaf and inserts it into the tree.
    ///
    /// The sibling of the new leaf is chosen by descending toward the closest node at each
    /// level; the bounding volumes of all its ancestors are enlarged accordingly.
    pub fn insert(&mut self, bv: Aabb, data: D) -> NodeIndex {
        let leaf = self.new_leaf(bv, data);
        self.insert_leaf(leaf);
        self.n_leaves += 1;
        leaf
    }

    /// Removes a leaf from the tree and frees its slot.
    ///
    /// `node` must identify a live leaf of this tree.
    pub fn remove(&mut self, node: NodeIndex) {
        self.remove_leaf(node);
        self.dealloc(node);
        self.n_leaves -= 1;
    }

    /// Moves a leaf to a new bounding volume.
    ///
    /// The leaf keeps its index. If the new volume equals the stored one this is a no-op.
    pub fn update(&mut self, node: NodeIndex, bv: Aabb) {
        if self.node(node).bv == bv {
            return;
        }

        self.remove_leaf(node);
        self.node_mut(node).bv = bv;
        self.insert_leaf(node);
    }

    /// Builds the tree in one shot over a set of leaves previously allocated with
    /// [`Self::new_leaf`].
    ///
    /// `level` selects the split rule: `0` splits at the median along the longest axis,
    /// any other value splits at the mean. All previously linked nodes are discarded.
    pub fn init(&mut self, mut leaves: Vec<NodeIndex>, level: usize) {
        self.n_leaves = leaves.len();
        match leaves.len() {
            0 => self.root = NodeIndex::NONE,
            _ => {
                let root = self.topdown(&mut leaves, level);
                self.node_mut(root).parent = NodeIndex::NONE;
                self.root = root;
            }
        }
    }

    /// Recomputes the bounding volume of every internal node, bottom-up.
    pub fn refit(&mut self) {
        if !self.root.is_none() {
            self.refit_rec(self.root);
        }
    }

    fn refit_rec(&mut self, index: NodeIndex) -> Aabb {
        let node = self.node(index);
        if node.is_leaf() {
            node.bv
        } else {
            let children = node.children;
            let bv = self
                .refit_rec(children[0])
                .merged(&self.refit_rec(children[1]));
            self.node_mut(index).bv = bv;
            bv
        }
    }

    /// Performs a bounded number of local improvement passes.
    ///
    /// Each pass walks from the root along a rotating bit path, then removes and re-inserts
    /// the reached leaf. Cheap, and incrementally reduces the imbalance accumulated by
    /// updates.
    pub fn balance_incremental(&mut self, passes: usize) {
        if self.root.is_none() {
            return;
        }

        for _ in 0..passes {
            let mut node = self.root;
            let mut bit = 0;
            while !self.node(node).is_leaf() {
                node = self.node(node).children[((self.opath >> bit) & 1) as usize];
                bit = (bit + 1) % 32;
            }
            self.remove_leaf(node);
            self.insert_leaf(node);
            self.opath = self.opath.wrapping_add(1);
        }
    }

    /// Rebuilds the whole tree top-down, preserving leaf indices.
    pub fn balance_topdown(&mut self) {
        if self.root.is_none() {
            return;
        }

        let mut leaves = Vec::with_capacity(self.n_leaves);
        self.extract_leaves(self.root, &mut leaves);
        let level = self.topdown_level;
        let root = self.topdown(&mut leaves, level);
        self.node_mut(root).parent = NodeIndex::NONE;
        self.root = root;
    }

    fn extract_leaves(&mut self, index: NodeIndex, out: &mut Vec<NodeIndex>) {
        let node = *self.node(index);
        if node.is_leaf() {
            out.push(index);
        } else {
            self.extract_leaves(node.children[0], out);
            self.extract_leaves(node.children[1], out);
            self.dealloc(index);
        }
    }

    fn topdown(&mut self, leaves: &mut [NodeIndex], level: usize) -> NodeIndex {
        if leaves.len() == 1 {
            return leaves[0];
        }

        if leaves.len() <= self.bu_threshold {
            return self.bottomup(leaves);
        }

        let mut centers_bv = Aabb::new_invalid();
        for leaf in leaves.iter() {
            centers_bv.take_point(self.node(*leaf).bv.center());
        }
        let extents = centers_bv.extents();
        let axis = if extents.x >= extents.y && extents.x >= extents.z {
            0
        } else if extents.y >= extents.z {
            1
        } else {
            2
        };

        let split = if level == 0 {
            // Median split.
            leaves.sort_by(|a, b| {
                let ca = self.node(*a).bv.center()[axis];
                let cb = self.node(*b).bv.center()[axis];
                ca.partial_cmp(&cb).unwrap_or(core::cmp::Ordering::Equal)
            });
            leaves.len() / 2
        } else {
            // Mean split.
            let mean = centers_bv.center()[axis];
            let mut split = 0;
            for i in 0..leaves.len() {
                if self.node(leaves[i]).bv.center()[axis] < mean {
                    leaves.swap(i, split);
                    split += 1;
                }
            }
            // Degenerate distributions fall back to a halving split.
            if split == 0 || split == leaves.len() {
                leaves.len() / 2
            } else {
                split
            }
        };

        let (left_leaves, right_leaves) = leaves.split_at_mut(split);
        let left = self.topdown(left_leaves, level);
        let right = self.topdown(right_leaves, level);
        self.make_parent(left, right)
    }

    // Merges small leaf sets pairwise, always joining the pair whose merged volume is the
    // smallest.
    fn bottomup(&mut self, leaves: &[NodeIndex]) -> NodeIndex {
        let mut roots = leaves.to_vec();

        while roots.len() > 1 {
            let mut best = (0, 1);
            let mut best_size = Real::MAX;
            for i in 0..roots.len() {
                for j in i + 1..roots.len() {
                    let merged = self.node(roots[i]).bv.merged(&self.node(roots[j]).bv);
                    if merged.size() < best_size {
                        best_size = merged.size();
                        best = (i, j);
                    }
                }
            }

            let parent = self.make_parent(roots[best.0], roots[best.1]);
            roots[best.0] = parent;
            let _ = roots.swap_remove(best.1);
        }

        roots[0]
    }

    fn make_parent(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let bv = self.node(left).bv.merged(&self.node(right).bv);
        let parent = self.alloc(Node {
            bv,
            parent: NodeIndex::NONE,
            children: [left, right],
            data: D::default(),
        });
        self.node_mut(left).parent = parent;
        self.node_mut(right).parent = parent;
        parent
    }

    // Links an allocated leaf into the tree, enlarging ancestor volumes as needed.
    fn insert_leaf(&mut self, leaf: NodeIndex) {
        if self.root.is_none() {
            self.root = leaf;
            self.node_mut(leaf).parent = NodeIndex::NONE;
            return;
        }

        let leaf_bv = self.node(leaf).bv;
        let mut sibling = self.root;
        while !self.node(sibling).is_leaf() {
            let children = self.node(sibling).children;
            let chosen = select(
                &leaf_bv,
                &self.node(children[0]).bv,
                &self.node(children[1]).bv,
            );
            sibling = children[chosen];
        }

        let old_parent = self.node(sibling).parent;
        let new_parent = self.alloc(Node {
            bv: leaf_bv.merged(&self.node(sibling).bv),
            parent: old_parent,
            children: [sibling, leaf],
            data: D::default(),
        });
        self.node_mut(sibling).parent = new_parent;
        self.node_mut(leaf).parent = new_parent;

        if old_parent.is_none() {
            self.root = new_parent;
        } else {
            let old_parent_node = self.node_mut(old_parent);
            if old_parent_node.children[0] == sibling {
                old_parent_node.children[0] = new_parent;
            } else {
                old_parent_node.children[1] = new_parent;
            }
            self.refit_ancestors(new_parent);
        }
    }

    // Unlinks a leaf; its parent slot is freed and the sibling takes the parent's place.
    // The leaf's own slot is left untouched so it can be re-linked or freed by the caller.
    fn remove_leaf(&mut self, leaf: NodeIndex) {
        if leaf == self.root {
            self.root = NodeIndex::NONE;
            return;
        }

        let parent = self.node(leaf).parent;
        let parent_node = *self.node(parent);
        let sibling = if parent_node.children[0] == leaf {
            parent_node.children[1]
        } else {
            parent_node.children[0]
        };
        let grandparent = parent_node.parent;

        self.node_mut(sibling).parent = grandparent;
        if grandparent.is_none() {
            self.root = sibling;
        } else {
            let grandparent_node = self.node_mut(grandparent);
            if grandparent_node.children[0] == parent {
                grandparent_node.children[0] = sibling;
            } else {
                grandparent_node.children[1] = sibling;
            }
            self.refit_ancestors(grandparent);
        }

        self.dealloc(parent);
    }

    // Recomputes the volumes of `node` and all its ancestors from their children.
    fn refit_ancestors(&mut self, mut node: NodeIndex) {
        while !node.is_none() {
            let children = self.node(node).children;
            if !children[1].is_none() {
                self.node_mut(node).bv = self
                    .node(children[0])
                    .bv
                    .merged(&self.node(children[1]).bv);
            }
            node = self.node(node).parent;
        }
    }

    /// Panics if the tree structure is inconsistent.
    ///
    /// Checks parent/child pointers, the leaf count, and that every internal volume contains
    /// both of its children.
    pub fn assert_consistent(&self) {
        if self.root.is_none() {
            assert_eq!(self.n_leaves, 0);
            return;
        }

        assert!(self.node(self.root).parent.is_none());
        let mut leaf_count = 0;
        self.assert_consistent_rec(self.root, &mut leaf_count);
        assert_eq!(leaf_count, self.n_leaves);
    }

    fn assert_consistent_rec(&self, index: NodeIndex, leaf_count: &mut usize) {
        let node = self.node(index);
        if node.is_leaf() {
            *leaf_count += 1;
        } else {
            let bv = node.bv;
            for child in node.children {
                assert!(!child.is_none());
                assert_eq!(self.node(child).parent, index);
                assert!(bv.contains(&self.node(child).bv));
                self.assert_consistent_rec(child, leaf_count);
            }
        }
    }
}
