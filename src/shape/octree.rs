use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::shape::{Shape, ShapeClass, ShapeType};

/// A node of an [`Octree`].
///
/// Each node carries an occupancy probability; absent children denote unknown space.
#[derive(Clone, Debug)]
pub struct OctreeNode {
    occupancy: Real,
    children: [Option<Box<OctreeNode>>; 8],
}

impl OctreeNode {
    /// A childless node with the given occupancy probability.
    pub fn leaf(occupancy: Real) -> Self {
        Self {
            occupancy,
            children: Default::default(),
        }
    }

    /// An internal node; its occupancy is the maximum of its children's.
    pub fn internal(children: [Option<Box<OctreeNode>>; 8]) -> Self {
        let occupancy = children
            .iter()
            .flatten()
            .fold(0.0, |max: Real, child| max.max(child.occupancy));
        Self {
            occupancy,
            children,
        }
    }

    /// The occupancy probability of this node.
    #[inline]
    pub fn occupancy(&self) -> Real {
        self.occupancy
    }

    /// Does this node have at least one child?
    #[inline]
    pub fn has_children(&self) -> bool {
        self.children.iter().any(|child| child.is_some())
    }

    /// The `i`-th child of this node, if present. `i` must be in `[0, 8)`.
    #[inline]
    pub fn child(&self, i: usize) -> Option<&OctreeNode> {
        self.children[i].as_deref()
    }
}

/// A voxelized occupancy tree: a cube recursively subdivided in 8 octants, each octant
/// carrying the probability that it is occupied by matter.
///
/// Probabilities at or above the occupied threshold mean matter, at or below the free
/// threshold mean empty space, and anything in between (including absent nodes) means
/// unknown space.
#[derive(Clone)]
pub struct Octree {
    root: Option<OctreeNode>,
    root_aabb: Aabb,
    occupied_threshold: Real,
    free_threshold: Real,
}

impl Octree {
    /// Creates an occupancy tree covering `root_aabb` with the given root node.
    pub fn new(root_aabb: Aabb, root: Option<OctreeNode>) -> Self {
        Self {
            root,
            root_aabb,
            occupied_threshold: 0.5,
            free_threshold: 0.2,
        }
    }

    /// The root node of this tree, if any.
    #[inline]
    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_ref()
    }

    /// The AABB covered by the root of this tree, in the tree's local-space.
    #[inline]
    pub fn root_aabb(&self) -> Aabb {
        self.root_aabb
    }

    /// The occupancy probability at or above which a node counts as occupied.
    #[inline]
    pub fn occupied_threshold(&self) -> Real {
        self.occupied_threshold
    }

    /// The occupancy probability at or below which a node counts as free.
    #[inline]
    pub fn free_threshold(&self) -> Real {
        self.free_threshold
    }

    /// The occupancy reported for unknown space (absent nodes).
    ///
    /// Sits strictly between the two thresholds, so unknown space counts as neither free
    /// nor occupied.
    #[inline]
    pub fn default_occupancy(&self) -> Real {
        (self.occupied_threshold + self.free_threshold) / 2.0
    }

    /// Is this node free space?
    #[inline]
    pub fn is_node_free(&self, node: &OctreeNode) -> bool {
        node.occupancy() <= self.free_threshold
    }

    /// Is this node occupied?
    #[inline]
    pub fn is_node_occupied(&self, node: &OctreeNode) -> bool {
        node.occupancy() >= self.occupied_threshold
    }

    /// The AABB covered by the `i`-th octant of a node covering `aabb`.
    ///
    /// Bit 0 of `i` selects the upper `x` half, bit 1 the upper `y` half, bit 2 the
    /// upper `z` half.
    pub fn child_aabb(aabb: &Aabb, i: usize) -> Aabb {
        let center = aabb.center();
        let mut mins = aabb.mins;
        let mut maxs = center;
        for k in 0..3 {
            if i & (1 << k) != 0 {
                mins[k] = center[k];
                maxs[k] = aabb.maxs[k];
            }
        }
        Aabb::new(mins, maxs)
    }
}

impl Shape for Octree {
    fn compute_local_aabb(&self) -> Aabb {
        self.root_aabb
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::VoxelOccupancy
    }

    fn shape_class(&self) -> ShapeClass {
        ShapeClass::VoxelGrid
    }

    fn angular_motion_disc(&self) -> Real {
        self.root_aabb.mins.coords.norm().max(self.root_aabb.maxs.coords.norm())
    }
}
